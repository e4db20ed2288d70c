use thiserror::Error;

/// Core domain errors
///
/// Callers branch on the variant: `NotFound`, `RateLimited` and `Validation`
/// are recoverable by the caller, while `Crypto`, `Storage` and `Internal`
/// are opaque internal failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Crypto error: {message}")]
    Crypto { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller can recover from this error by changing its request
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::RateLimited { .. } | Self::Validation { .. }
        )
    }
}
