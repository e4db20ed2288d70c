//! Audit log repository trait

use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

use super::entity::UsageLogEntry;
use crate::domain::DomainError;

/// Repository trait for the append-only audit trail
#[async_trait]
pub trait AuditLogRepository: Send + Sync + Debug {
    /// Append one entry to the trail
    async fn append(&self, entry: UsageLogEntry) -> Result<(), DomainError>;

    /// Read back the trail for a single key, oldest first
    async fn list_for_key(&self, key_id: Uuid) -> Result<Vec<UsageLogEntry>, DomainError>;
}
