//! In-memory repository implementation
//!
//! Single-process backing store for key records and the audit trail; the
//! production deployment swaps in a database-backed implementation of the
//! same traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository, Service};
use crate::domain::audit::{AuditLogRepository, UsageLogEntry};
use crate::domain::DomainError;

/// In-memory implementation of [`ApiKeyRepository`] and [`AuditLogRepository`]
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    records: Arc<RwLock<HashMap<Uuid, ApiKeyRecord>>>,
    audit_log: Arc<RwLock<Vec<UsageLogEntry>>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.id()) {
            return Err(DomainError::storage(format!(
                "API key '{}' already exists",
                record.id()
            )));
        }

        records.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ApiKeyRecord>, DomainError> {
        let records = self.records.read().await;

        let mut result: Vec<ApiKeyRecord> = records
            .values()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| r.created_at());

        Ok(result)
    }

    async fn get_by_service(
        &self,
        user_id: &str,
        service: &Service,
    ) -> Result<Option<ApiKeyRecord>, DomainError> {
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
        let records = self.records.read().await;
        Ok(records
            .get(&key_id)
            .filter(|r| r.user_id() == user_id)
            .cloned())
    }

    async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
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
        let mut records = self.records.write().await;

        match records.get_mut(&key_id) {
            Some(record) => {
                record.record_usage();
                Ok(())
            }
            None => Err(DomainError::not_found(format!(
                "API key '{}' not found",
                key_id
            ))),
        }
    }

    async fn update_validation(
        &self,
        key_id: Uuid,
        is_valid: bool,
        validated_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut records = self.records.write().await;

        match records.get_mut(&key_id) {
            Some(record) => {
                record.mark_validated(is_valid, validated_at);
                Ok(())
            }
            None => Err(DomainError::not_found(format!(
                "API key '{}' not found",
                key_id
            ))),
        }
    }

    async fn delete(&self, key_id: Uuid, user_id: &str) -> Result<bool, DomainError> {
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

#[async_trait]
impl AuditLogRepository for InMemoryApiKeyRepository {
    async fn append(&self, entry: UsageLogEntry) -> Result<(), DomainError> {
        let mut log = self.audit_log.write().await;
        log.push(entry);
        Ok(())
    }

    async fn list_for_key(&self, key_id: Uuid) -> Result<Vec<UsageLogEntry>, DomainError> {
        let log = self.audit_log.read().await;
        Ok(log.iter().filter(|e| e.key_id == key_id).cloned().collect())
    }
}
