//! User directory built from configuration

use std::collections::HashMap;

use async_trait::async_trait;
use ks_shared::config::{AuthConfig, UserCredential};

use crate::errors::DomainError;

use super::r#trait::UserDirectory;

/// Fixed set of accounts loaded at startup
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<String, String>,
}

impl InMemoryUserDirectory {
    pub fn new(users: impl IntoIterator<Item = UserCredential>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.username, user.password_hash))
                .collect(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.users.iter().cloned())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_password_hash(&self, username: &str) -> Result<Option<String>, DomainError> {
        Ok(self.users.get(username).cloned())
    }
}
