//! API key infrastructure
//!
//! Lifecycle service, rate limiting, audit logging and the in-memory
//! repository backing them.

mod audit;
mod rate_limiter;
mod repository;
mod service;

pub use audit::AuditLogger;
pub use rate_limiter::{InMemoryRateLimiter, RateLimitPolicy, RateLimitStore};
pub use repository::InMemoryApiKeyRepository;
pub use service::{CreateKeyRequest, KeyLifecycleService, RetrievedKey};
