//! API key record repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use uuid::Uuid;

use super::entity::{ApiKeyRecord, Service};
use crate::domain::DomainError;

/// Repository trait for API key record storage
///
/// Every lookup that takes a `user_id` is scoped to that user: a record owned
/// by another user is indistinguishable from a missing one.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Persist a new record
    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError>;

    /// List all records owned by a user
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ApiKeyRecord>, DomainError>;

    /// Find a user's record for a given service
    async fn get_by_service(
        &self,
        user_id: &str,
        service: &Service,
    ) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Get a record by id, scoped to its owner
    async fn get_by_id(
        &self,
        key_id: Uuid,
        user_id: &str,
    ) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Replace an existing record
    async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError>;

    /// Bump last_used / usage_count for a record
    async fn touch_last_used(&self, key_id: Uuid) -> Result<(), DomainError>;

    /// Store the outcome of a validation pass
    async fn update_validation(
        &self,
        key_id: Uuid,
        is_valid: bool,
        validated_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Delete a record, scoped to its owner; returns whether anything was removed
    async fn delete(&self, key_id: Uuid, user_id: &str) -> Result<bool, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock repository whose operations can be made to fail
    #[derive(Debug, Default)]
    pub struct MockApiKeyRepository {
        records: Arc<RwLock<HashMap<Uuid, ApiKeyRecord>>>,
        should_fail: Arc<RwLock<bool>>,
    }

    impl MockApiKeyRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ApiKeyRepository for MockApiKeyRepository {
        async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
            self.check_should_fail().await?;
            let mut records = self.records.write().await;
            records.insert(record.id(), record.clone());
            Ok(record)
        }

        async fn list_by_user(&self, user_id: &str) -> Result<Vec<ApiKeyRecord>, DomainError> {
            self.check_should_fail().await?;
            let records = self.records.read().await;
            Ok(records
                .values()
                .filter(|r| r.user_id() == user_id)
                .cloned()
                .collect())
        }

        async fn get_by_service(
            &self,
            user_id: &str,
            service: &Service,
        ) -> Result<Option<ApiKeyRecord>, DomainError> {
            self.check_should_fail().await?;
            let records = self.records.read().await;
            Ok(records
                .values()
                .find(|r| r.user_id() == user_id && r.service() == service)
                .cloned())
        }

        async fn get_by_id(
            &self,
            key_id: Uuid,
            user_id: &str,
        ) -> Result<Option<ApiKeyRecord>, DomainError> {
            self.check_should_fail().await?;
            let records = self.records.read().await;
            Ok(records
                .get(&key_id)
                .filter(|r| r.user_id() == user_id)
                .cloned())
        }

        async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
            self.check_should_fail().await?;
            let mut records = self.records.write().await;
            if !records.contains_key(&record.id()) {
                return Err(DomainError::not_found(format!(
                    "API key '{}' not found",
                    record.id()
                )));
            }
            records.insert(record.id(), record.clone());
            Ok(record.clone())
        }

        async fn touch_last_used(&self, key_id: Uuid) -> Result<(), DomainError> {
            self.check_should_fail().await?;
            let mut records = self.records.write().await;
            if let Some(record) = records.get_mut(&key_id) {
                record.record_usage();
            }
            Ok(())
        }

        async fn update_validation(
            &self,
            key_id: Uuid,
            is_valid: bool,
            validated_at: DateTime<Utc>,
        ) -> Result<(), DomainError> {
            self.check_should_fail().await?;
            let mut records = self.records.write().await;
            if let Some(record) = records.get_mut(&key_id) {
                record.mark_validated(is_valid, validated_at);
            }
            Ok(())
        }

        async fn delete(&self, key_id: Uuid, user_id: &str) -> Result<bool, DomainError> {
            self.check_should_fail().await?;
            let mut records = self.records.write().await;
            let owned = records
                .get(&key_id)
                .map(|r| r.user_id() == user_id)
                .unwrap_or(false);

            if owned {
                records.remove(&key_id);
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }
}
