//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{body::MessageBody, dev::ServiceResponse, test};
use ks_api::AppFactory;
use ks_core::repositories::{InMemoryUserDirectory, MemoryCacheStore};
use ks_core::services::{AuthService, TokenPairManager, TokenServiceConfig};
use ks_shared::config::{AppConfig, JwtConfig, OldAccessTokenPolicy, UserCredential};
use ks_shared::ErrorCatalog;
use serde_json::Value;

pub const PASSWORD: &str = "correct horse battery";

pub type TestFactory = AppFactory<InMemoryUserDirectory, MemoryCacheStore>;
pub type TestManager = TokenPairManager<MemoryCacheStore>;

pub fn test_config(policy: OldAccessTokenPolicy) -> AppConfig {
    let mut jwt = JwtConfig::new("integration_access_secret", "integration_refresh_secret")
        .with_access_validity_minutes(10)
        .with_refresh_delay_minutes(5);
    jwt.application_name = "keystone-it".to_string();
    jwt.old_access_token_policy = policy;

    let mut config = AppConfig::default();
    config.jwt = jwt;
    config.auth.users = vec![UserCredential {
        username: "alice".to_string(),
        password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
    }];
    config.system.enable_gzip = false;
    config
}

/// Application factory over an in-memory store, plus the manager behind it
pub fn build(config: &AppConfig, catalog: ErrorCatalog) -> (TestFactory, Arc<TestManager>) {
    let tokens = Arc::new(TokenPairManager::new(
        MemoryCacheStore::new(),
        TokenServiceConfig::from(&config.jwt),
    ));
    let users = InMemoryUserDirectory::from_config(&config.auth);
    let auth_service =
        Arc::new(AuthService::new(users, Arc::clone(&tokens)).with_decoy_cost(4));

    (AppFactory::new(auth_service, catalog, config), tokens)
}

pub fn default_factory() -> (TestFactory, Arc<TestManager>) {
    build(
        &test_config(OldAccessTokenPolicy::KeepUntilExpiry),
        ErrorCatalog::default(),
    )
}

pub async fn json_body<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    test::read_body_json(resp).await
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
