//! Domain layer - Core entities and contracts

pub mod api_key;
pub mod audit;
pub mod error;

pub use api_key::{
    validate_key_input, validate_key_name, ApiKeyRecord, ApiKeyRepository, KeyInputError,
    Service, ValidationResult,
};
pub use audit::{AuditLogRepository, KeyOperation, UsageLogEntry};
pub use error::DomainError;
