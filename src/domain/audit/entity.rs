//! Audit trail entry for key lifecycle operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::api_key::Service;

/// Lifecycle operation recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOperation {
    Create,
    Retrieve,
    Validate,
    Rotate,
    Delete,
}

impl std::fmt::Display for KeyOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Retrieve => write!(f, "retrieve"),
            Self::Validate => write!(f, "validate"),
            Self::Rotate => write!(f, "rotate"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// One append-only audit entry per lifecycle call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLogEntry {
    pub key_id: Uuid,
    pub user_id: String,
    pub service: Service,
    pub operation: KeyOperation,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UsageLogEntry {
    pub fn success(
        key_id: Uuid,
        user_id: impl Into<String>,
        service: Service,
        operation: KeyOperation,
    ) -> Self {
        Self {
            key_id,
            user_id: user_id.into(),
            service,
            operation,
            timestamp: Utc::now(),
            success: true,
            error_message: None,
        }
    }

    pub fn failure(
        key_id: Uuid,
        user_id: impl Into<String>,
        service: Service,
        operation: KeyOperation,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            key_id,
            user_id: user_id.into(),
            service,
            operation,
            timestamp: Utc::now(),
            success: false,
            error_message: Some(error_message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(KeyOperation::Create.to_string(), "create");
        assert_eq!(KeyOperation::Rotate.to_string(), "rotate");
    }

    #[test]
    fn test_success_entry() {
        let entry = UsageLogEntry::success(
            Uuid::new_v4(),
            "u1",
            Service::OpenAi,
            KeyOperation::Create,
        );

        assert!(entry.success);
        assert!(entry.error_message.is_none());
    }

    #[test]
    fn test_failure_entry() {
        let entry = UsageLogEntry::failure(
            Uuid::new_v4(),
            "u1",
            Service::OpenAi,
            KeyOperation::Validate,
            "credential failed format check",
        );

        assert!(!entry.success);
        assert_eq!(
            entry.error_message.as_deref(),
            Some("credential failed format check")
        );
    }
}
