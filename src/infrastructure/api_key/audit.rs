//! Best-effort audit logger
//!
//! Wraps the audit repository so that a failing audit store can never fail a
//! primary key operation: append errors are logged and swallowed.

use std::sync::Arc;

use tracing::warn;

use crate::domain::audit::{AuditLogRepository, UsageLogEntry};

/// Audit logger over an [`AuditLogRepository`]
#[derive(Debug)]
pub struct AuditLogger {
    repository: Arc<dyn AuditLogRepository>,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn AuditLogRepository>) -> Self {
        Self { repository }
    }

    /// Record one lifecycle entry; never propagates failure
    pub async fn record(&self, entry: UsageLogEntry) {
        if let Err(e) = self.repository.append(entry).await {
            warn!(error = %e, "Failed to append audit log entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::Service;
    use crate::domain::audit::KeyOperation;
    use crate::domain::DomainError;
    use async_trait::async_trait;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    #[derive(Debug, Default)]
    struct FlakyAuditRepository {
        fail: RwLock<bool>,
        entries: RwLock<Vec<UsageLogEntry>>,
    }

    #[async_trait]
    impl AuditLogRepository for FlakyAuditRepository {
        async fn append(&self, entry: UsageLogEntry) -> Result<(), DomainError> {
            if *self.fail.read().await {
                return Err(DomainError::storage("audit store unavailable"));
            }
            self.entries.write().await.push(entry);
            Ok(())
        }

        async fn list_for_key(&self, key_id: Uuid) -> Result<Vec<UsageLogEntry>, DomainError> {
            Ok(self
                .entries
                .read()
                .await
                .iter()
                .filter(|e| e.key_id == key_id)
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn test_records_entries() {
        let repo = Arc::new(FlakyAuditRepository::default());
        let logger = AuditLogger::new(repo.clone());
        let key_id = Uuid::new_v4();

        logger
            .record(UsageLogEntry::success(
                key_id,
                "u1",
                Service::OpenAi,
                KeyOperation::Create,
            ))
            .await;

        let entries = repo.list_for_key(key_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].success);
    }

    #[tokio::test]
    async fn test_swallows_store_failures() {
        let repo = Arc::new(FlakyAuditRepository::default());
        *repo.fail.write().await = true;

        let logger = AuditLogger::new(repo.clone());

        // Must not panic or error even though the store fails
        logger
            .record(UsageLogEntry::success(
                Uuid::new_v4(),
                "u1",
                Service::OpenAi,
                KeyOperation::Delete,
            ))
            .await;
    }
}
