//! BYOK Key Vault
//!
//! Envelope-encryption engine for user-supplied third-party API credentials:
//! - At-rest encryption with per-value data keys wrapped by a PBKDF2-derived
//!   master key
//! - Per-service credential validation with a pluggable live hook
//! - Rate-limited re-validation, rotation, and an append-only audit trail
//!
//! The crate is called in-process by a higher-level API boundary; it defines
//! no network protocol of its own.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::VaultConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use infrastructure::api_key::{
    InMemoryApiKeyRepository, InMemoryRateLimiter, KeyLifecycleService, RateLimitPolicy,
};
use infrastructure::crypto::{EnvelopeCipher, MasterKey};
use infrastructure::validation::ValidationEngine;

/// Wire a lifecycle service from configuration, backed by in-memory storage
///
/// The master key is derived once here; an empty `master_secret` fails fast.
/// Deployments with external persistence construct [`KeyLifecycleService`]
/// directly with their own repository implementations.
pub fn create_key_vault(
    config: &VaultConfig,
) -> anyhow::Result<KeyLifecycleService<InMemoryApiKeyRepository>> {
    let master_key = MasterKey::derive(&config.encryption.master_secret)
        .context("failed to derive the master key from the configured secret")?;
    let cipher = Arc::new(EnvelopeCipher::new(master_key));

    let engine = Arc::new(
        ValidationEngine::new()
            .with_probe_timeout(Duration::from_secs(config.validation.probe_timeout_seconds)),
    );

    let rate_limiter = Arc::new(InMemoryRateLimiter::new(RateLimitPolicy::new(
        config.rate_limit.max_attempts,
        Duration::from_secs(config.rate_limit.window_seconds),
    )));

    let repository = Arc::new(InMemoryApiKeyRepository::new());

    Ok(
        KeyLifecycleService::new(repository.clone(), repository, cipher)
            .with_validation_engine(engine)
            .with_rate_limiter(rate_limiter),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::Service;
    use crate::infrastructure::api_key::CreateKeyRequest;

    fn test_config() -> VaultConfig {
        let mut config = VaultConfig::default();
        config.encryption.master_secret = "test-operator-secret".to_string();
        config
    }

    #[tokio::test]
    async fn test_create_key_vault_end_to_end() {
        let vault = create_key_vault(&test_config()).unwrap();

        let record = vault
            .create(CreateKeyRequest::new(
                "u1",
                "My Key",
                Service::OpenAi,
                "sk-test1234567890",
            ))
            .await
            .unwrap();
        assert!(record.is_valid());

        let retrieved = vault
            .get_for_service("u1", &Service::OpenAi)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.api_key, "sk-test1234567890");
    }

    #[test]
    fn test_create_key_vault_rejects_missing_secret() {
        let config = VaultConfig::default();
        assert!(create_key_vault(&config).is_err());
    }
}
