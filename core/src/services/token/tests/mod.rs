mod service_tests;

use std::sync::Arc;

use ks_shared::config::OldAccessTokenPolicy;

use crate::repositories::CacheStore;
use crate::services::token::{TokenPairManager, TokenServiceConfig};

pub(crate) const ACCESS_SECRET: &str = "test-access-secret";
pub(crate) const REFRESH_SECRET: &str = "test-refresh-secret";

pub(crate) fn test_config(policy: OldAccessTokenPolicy) -> TokenServiceConfig {
    TokenServiceConfig {
        access_secret: ACCESS_SECRET.to_string(),
        refresh_secret: REFRESH_SECRET.to_string(),
        refresh_delay_minutes: 5,
        access_validity_minutes: 10,
        application_name: "keystone-test".to_string(),
        old_access_token_policy: policy,
    }
}

pub(crate) fn manager_with<C: CacheStore>(
    cache: Arc<C>,
    policy: OldAccessTokenPolicy,
) -> TokenPairManager<Arc<C>> {
    TokenPairManager::new(cache, test_config(policy))
}
