//! Infrastructure layer - Concrete implementations of the domain contracts

pub mod api_key;
pub mod crypto;
pub mod logging;
pub mod validation;
