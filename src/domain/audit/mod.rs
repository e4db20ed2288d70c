//! Audit domain
//!
//! Append-only usage log entries for every key lifecycle operation.

mod entity;
mod repository;

pub use entity::{KeyOperation, UsageLogEntry};
pub use repository::AuditLogRepository;
