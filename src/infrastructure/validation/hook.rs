//! Pluggable live validation hook

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::api_key::{Service, ValidationResult};
use crate::domain::DomainError;

/// External check that actually calls the provider
///
/// The engine bounds every probe with a timeout; implementations should still
/// keep their own I/O short-lived. The probed credential must never appear in
/// returned messages or errors.
#[async_trait]
pub trait LiveValidationHook: Send + Sync + Debug {
    async fn probe(
        &self,
        service: &Service,
        key_value: &str,
    ) -> Result<ValidationResult, DomainError>;
}
