//! API key domain
//!
//! Domain types and traits for stored third-party credentials: the encrypted
//! key record, its repository contract, and input validation.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKeyRecord, Service, ValidationResult};
pub use repository::ApiKeyRepository;
pub use validation::{validate_key_input, validate_key_name, KeyInputError};

#[cfg(test)]
pub use repository::mock::MockApiKeyRepository;
