//! Key lifecycle service
//!
//! Orchestrates create / list / get / validate / rotate / delete over the
//! validation engine, envelope cipher, rate limiter, repository and audit
//! logger. Component failures are normalized into [`DomainError`] here;
//! nothing below this boundary reaches callers verbatim, and no error or log
//! line ever carries the plaintext credential.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::api_key::{
    validate_key_input, validate_key_name, ApiKeyRecord, ApiKeyRepository, Service,
    ValidationResult,
};
use crate::domain::audit::{AuditLogRepository, KeyOperation, UsageLogEntry};
use crate::domain::DomainError;
use crate::infrastructure::validation::ValidationEngine;
use crate::infrastructure::crypto::EnvelopeCipher;

use super::audit::AuditLogger;
use super::rate_limiter::{InMemoryRateLimiter, RateLimitStore};

/// Request to store a new credential
#[derive(Debug, Clone)]
pub struct CreateKeyRequest {
    pub user_id: String,
    pub name: String,
    pub service: Service,
    pub key_value: String,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateKeyRequest {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        service: Service,
        key_value: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            service,
            key_value: key_value.into(),
            description: None,
            expires_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// A decrypted credential handed to a trusted in-process caller
pub struct RetrievedKey {
    pub record: ApiKeyRecord,
    pub api_key: String,
}

impl std::fmt::Debug for RetrievedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The plaintext must not leak through debug output
        f.debug_struct("RetrievedKey")
            .field("record", &self.record)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Lifecycle manager for stored credentials
#[derive(Debug)]
pub struct KeyLifecycleService<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
    audit_repository: Arc<dyn AuditLogRepository>,
    cipher: Arc<EnvelopeCipher>,
    engine: Arc<ValidationEngine>,
    rate_limiter: Arc<dyn RateLimitStore>,
    audit: AuditLogger,
}

impl<R: ApiKeyRepository> KeyLifecycleService<R> {
    /// Create a new lifecycle service with default validation and rate limiting
    pub fn new(
        repository: Arc<R>,
        audit_repository: Arc<dyn AuditLogRepository>,
        cipher: Arc<EnvelopeCipher>,
    ) -> Self {
        let audit = AuditLogger::new(audit_repository.clone());

        Self {
            repository,
            audit_repository,
            cipher,
            engine: Arc::new(ValidationEngine::new()),
            rate_limiter: Arc::new(InMemoryRateLimiter::default()),
            audit,
        }
    }

    /// Replace the validation engine
    pub fn with_validation_engine(mut self, engine: Arc<ValidationEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the rate-limit store
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimitStore>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Store a new credential
    ///
    /// Validates the value for its service, encrypts it, persists the record
    /// and logs the creation. The returned record never exposes the
    /// ciphertext when serialized.
    pub async fn create(&self, request: CreateKeyRequest) -> Result<ApiKeyRecord, DomainError> {
        validate_key_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_key_input(&request.user_id, &request.key_value)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        info!(user_id = %request.user_id, service = %request.service, "Creating API key record");

        let validation = self.engine.validate(&request.service, &request.key_value).await;

        let encrypted = match self.cipher.encrypt(&request.key_value) {
            Ok(blob) => blob,
            Err(e) => {
                // No record id exists before persistence; audit with the nil id
                self.audit
                    .record(UsageLogEntry::failure(
                        Uuid::nil(),
                        &request.user_id,
                        request.service.clone(),
                        KeyOperation::Create,
                        "encryption failed",
                    ))
                    .await;
                return Err(e);
            }
        };

        let mut record = ApiKeyRecord::new(
            &request.user_id,
            &request.name,
            request.service.clone(),
            encrypted,
        )
        .with_validity(validation.is_valid);

        if let Some(description) = request.description {
            record = record.with_description(description);
        }
        if let Some(expires_at) = request.expires_at {
            record = record.with_expiration(expires_at);
        }

        let created = match self.repository.create(record).await {
            Ok(created) => created,
            Err(e) => {
                self.audit
                    .record(UsageLogEntry::failure(
                        Uuid::nil(),
                        &request.user_id,
                        request.service.clone(),
                        KeyOperation::Create,
                        "persistence failed",
                    ))
                    .await;
                return Err(normalize_storage(e));
            }
        };

        self.audit
            .record(UsageLogEntry::success(
                created.id(),
                created.user_id(),
                created.service().clone(),
                KeyOperation::Create,
            ))
            .await;

        info!(key_id = %created.id(), "API key record created");
        Ok(created)
    }

    /// List a user's key records
    pub async fn list(&self, user_id: &str) -> Result<Vec<ApiKeyRecord>, DomainError> {
        self.repository
            .list_by_user(user_id)
            .await
            .map_err(normalize_storage)
    }

    /// Get one key record by id
    ///
    /// A record owned by another user is reported as not found, so key
    /// existence never leaks across users.
    pub async fn get(&self, user_id: &str, key_id: Uuid) -> Result<ApiKeyRecord, DomainError> {
        self.repository
            .get_by_id(key_id, user_id)
            .await
            .map_err(normalize_storage)?
            .ok_or_else(|| DomainError::not_found(format!("API key '{}' not found", key_id)))
    }

    /// Decrypt a user's credential for a service
    ///
    /// Expired records are treated as absent even though their ciphertext
    /// would still decrypt. A successful retrieval bumps usage bookkeeping
    /// and is audited.
    pub async fn get_for_service(
        &self,
        user_id: &str,
        service: &Service,
    ) -> Result<Option<RetrievedKey>, DomainError> {
        let record = match self
            .repository
            .get_by_service(user_id, service)
            .await
            .map_err(normalize_storage)?
        {
            Some(record) => record,
            None => return Ok(None),
        };

        if record.is_expired() {
            debug!(key_id = %record.id(), "Stored key has expired; treating as absent");
            return Ok(None);
        }

        let api_key = match self.cipher.decrypt(record.encrypted_key()) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                self.audit
                    .record(UsageLogEntry::failure(
                        record.id(),
                        user_id,
                        record.service().clone(),
                        KeyOperation::Retrieve,
                        "decryption failed",
                    ))
                    .await;
                return Err(e);
            }
        };

        if let Err(e) = self.repository.touch_last_used(record.id()).await {
            self.audit
                .record(UsageLogEntry::failure(
                    record.id(),
                    user_id,
                    record.service().clone(),
                    KeyOperation::Retrieve,
                    "persistence failed",
                ))
                .await;
            return Err(normalize_storage(e));
        }

        self.audit
            .record(UsageLogEntry::success(
                record.id(),
                user_id,
                record.service().clone(),
                KeyOperation::Retrieve,
            ))
            .await;

        let mut record = record;
        record.record_usage();

        Ok(Some(RetrievedKey { record, api_key }))
    }

    /// Re-validate a stored credential
    ///
    /// Gated by the rate limiter: an exhausted window is a `RateLimited`
    /// error and emits no audit entry.
    pub async fn validate(
        &self,
        key_id: Uuid,
        user_id: &str,
    ) -> Result<ValidationResult, DomainError> {
        if !self
            .rate_limiter
            .check_and_record(&key_id.to_string())
            .await
        {
            return Err(DomainError::rate_limited(format!(
                "too many validation attempts for key '{}'",
                key_id
            )));
        }

        let record = self.get(user_id, key_id).await?;

        let key_value = match self.cipher.decrypt(record.encrypted_key()) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                self.audit
                    .record(UsageLogEntry::failure(
                        key_id,
                        user_id,
                        record.service().clone(),
                        KeyOperation::Validate,
                        "decryption failed",
                    ))
                    .await;
                return Err(e);
            }
        };

        let result = self.engine.validate(record.service(), &key_value).await;

        if let Err(e) = self
            .repository
            .update_validation(key_id, result.is_valid, result.validated_at)
            .await
        {
            self.audit
                .record(UsageLogEntry::failure(
                    key_id,
                    user_id,
                    record.service().clone(),
                    KeyOperation::Validate,
                    "persistence failed",
                ))
                .await;
            return Err(normalize_storage(e));
        }

        let entry = if result.is_valid {
            UsageLogEntry::success(
                key_id,
                user_id,
                record.service().clone(),
                KeyOperation::Validate,
            )
        } else {
            UsageLogEntry::failure(
                key_id,
                user_id,
                record.service().clone(),
                KeyOperation::Validate,
                result.message.clone(),
            )
        };
        self.audit.record(entry).await;

        info!(key_id = %key_id, is_valid = result.is_valid, "API key re-validated");
        Ok(result)
    }

    /// Replace a stored credential with a new value
    pub async fn rotate(
        &self,
        key_id: Uuid,
        user_id: &str,
        new_key_value: &str,
    ) -> Result<ApiKeyRecord, DomainError> {
        validate_key_input(user_id, new_key_value)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let mut record = self.get(user_id, key_id).await?;

        info!(key_id = %key_id, service = %record.service(), "Rotating API key");

        let validation = self.engine.validate(record.service(), new_key_value).await;

        let encrypted = match self.cipher.encrypt(new_key_value) {
            Ok(blob) => blob,
            Err(e) => {
                self.audit
                    .record(UsageLogEntry::failure(
                        key_id,
                        user_id,
                        record.service().clone(),
                        KeyOperation::Rotate,
                        "encryption failed",
                    ))
                    .await;
                return Err(e);
            }
        };

        record.replace_encrypted_key(encrypted, validation.is_valid);

        let updated = match self.repository.update(&record).await {
            Ok(updated) => updated,
            Err(e) => {
                self.audit
                    .record(UsageLogEntry::failure(
                        key_id,
                        user_id,
                        record.service().clone(),
                        KeyOperation::Rotate,
                        "persistence failed",
                    ))
                    .await;
                return Err(normalize_storage(e));
            }
        };

        self.audit
            .record(UsageLogEntry::success(
                key_id,
                user_id,
                updated.service().clone(),
                KeyOperation::Rotate,
            ))
            .await;

        Ok(updated)
    }

    /// Delete a key record
    ///
    /// A missing record and one owned by another user are both `NotFound`;
    /// the delete never silently succeeds.
    pub async fn delete(&self, key_id: Uuid, user_id: &str) -> Result<(), DomainError> {
        let record = self.get(user_id, key_id).await?;

        let deleted = match self.repository.delete(key_id, user_id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.audit
                    .record(UsageLogEntry::failure(
                        key_id,
                        user_id,
                        record.service().clone(),
                        KeyOperation::Delete,
                        "persistence failed",
                    ))
                    .await;
                return Err(normalize_storage(e));
            }
        };

        if !deleted {
            return Err(DomainError::not_found(format!(
                "API key '{}' not found",
                key_id
            )));
        }

        self.audit
            .record(UsageLogEntry::success(
                key_id,
                user_id,
                record.service().clone(),
                KeyOperation::Delete,
            ))
            .await;

        info!(key_id = %key_id, "API key record deleted");
        Ok(())
    }

    /// Read back the audit trail for one key
    pub async fn audit_trail(&self, key_id: Uuid) -> Result<Vec<UsageLogEntry>, DomainError> {
        self.audit_repository
            .list_for_key(key_id)
            .await
            .map_err(normalize_storage)
    }
}

/// Collapse repository errors into the storage kind unless they already carry
/// a caller-facing meaning
fn normalize_storage(error: DomainError) -> DomainError {
    match error {
        e @ (DomainError::NotFound { .. }
        | DomainError::RateLimited { .. }
        | DomainError::Validation { .. }
        | DomainError::Storage { .. }) => e,
        DomainError::Crypto { message } | DomainError::Internal { message } => {
            DomainError::Storage { message }
        }
    }
}
