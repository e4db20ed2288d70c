//! API key record entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// External service a stored credential belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Service {
    OpenAi,
    Anthropic,
    OpenWeather,
    GoogleMaps,
    Amadeus,
    /// Any service without a dedicated validator
    Custom(String),
}

impl Service {
    /// Canonical service name used for dispatch and persistence
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::OpenWeather => "openweather",
            Self::GoogleMaps => "google_maps",
            Self::Amadeus => "amadeus",
            Self::Custom(name) => name,
        }
    }

    /// Parse a service name; unknown names become `Custom`
    pub fn parse(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "openai" => Self::OpenAi,
            "anthropic" => Self::Anthropic,
            "openweather" => Self::OpenWeather,
            "google_maps" => Self::GoogleMaps,
            "amadeus" => Self::Amadeus,
            _ => Self::Custom(name),
        }
    }
}

impl From<String> for Service {
    fn from(value: String) -> Self {
        Self::parse(value)
    }
}

impl From<Service> for String {
    fn from(service: Service) -> Self {
        service.as_str().to_string()
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of validating a credential against its service
///
/// Immutable value object, produced fresh by every validation call. The
/// message never contains the credential itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub service: Service,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub validated_at: DateTime<Utc>,
}

impl ValidationResult {
    pub fn valid(service: Service, message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            service,
            message: message.into(),
            details: None,
            validated_at: Utc::now(),
        }
    }

    pub fn invalid(service: Service, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            service,
            message: message.into(),
            details: None,
            validated_at: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Stored API key record
///
/// The plaintext credential is never stored; `encrypted_key` is produced by
/// the envelope cipher at creation/rotation and consumed by it on retrieval.
/// The ciphertext is skipped when the record is serialized so it never leaks
/// through an outward-facing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    id: Uuid,
    user_id: String,
    name: String,
    service: Service,
    #[serde(skip_serializing, default)]
    encrypted_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    is_valid: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_used: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_validated: Option<DateTime<Utc>>,
    usage_count: u64,
}

impl ApiKeyRecord {
    /// Create a new record around an already-encrypted credential
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        service: Service,
        encrypted_key: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            service,
            encrypted_key: encrypted_key.into(),
            description: None,
            is_valid: false,
            created_at: now,
            updated_at: now,
            expires_at: None,
            last_used: None,
            last_validated: None,
            usage_count: 0,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set expiration
    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set initial validity (from the creation-time validation pass)
    pub fn with_validity(mut self, is_valid: bool) -> Self {
        self.is_valid = is_valid;
        self.last_validated = Some(Utc::now());
        self
    }

    // Getters

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Opaque ciphertext blob; only the envelope cipher interprets this
    pub fn encrypted_key(&self) -> &str {
        &self.encrypted_key
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn last_used(&self) -> Option<DateTime<Utc>> {
        self.last_used
    }

    pub fn last_validated(&self) -> Option<DateTime<Utc>> {
        self.last_validated
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    /// Check if the record has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() >= expires_at
        } else {
            false
        }
    }

    // Mutators

    /// Record the outcome of a re-validation pass
    pub fn mark_validated(&mut self, is_valid: bool, validated_at: DateTime<Utc>) {
        self.is_valid = is_valid;
        self.last_validated = Some(validated_at);
        self.touch();
    }

    /// Replace the ciphertext after a rotation
    pub fn replace_encrypted_key(&mut self, encrypted_key: impl Into<String>, is_valid: bool) {
        self.encrypted_key = encrypted_key.into();
        self.is_valid = is_valid;
        self.last_validated = Some(Utc::now());
        self.touch();
    }

    /// Record a plaintext retrieval
    pub fn record_usage(&mut self) {
        self.last_used = Some(Utc::now());
        self.usage_count += 1;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record() -> ApiKeyRecord {
        ApiKeyRecord::new("u1", "My Key", Service::OpenAi, "opaque-blob")
    }

    #[test]
    fn test_service_parse_known() {
        assert_eq!(Service::parse("openai"), Service::OpenAi);
        assert_eq!(Service::parse("anthropic"), Service::Anthropic);
        assert_eq!(Service::parse("google_maps"), Service::GoogleMaps);
    }

    #[test]
    fn test_service_parse_unknown() {
        let service = Service::parse("flight_tracker");
        assert_eq!(service, Service::Custom("flight_tracker".to_string()));
        assert_eq!(service.as_str(), "flight_tracker");
    }

    #[test]
    fn test_record_creation() {
        let record = create_test_record()
            .with_description("Primary key")
            .with_validity(true);

        assert_eq!(record.user_id(), "u1");
        assert_eq!(record.name(), "My Key");
        assert_eq!(record.service(), &Service::OpenAi);
        assert!(record.is_valid());
        assert!(record.last_validated().is_some());
        assert_eq!(record.usage_count(), 0);
        assert!(!record.is_expired());
    }

    #[test]
    fn test_record_expiration() {
        let past = Utc::now() - chrono::Duration::hours(1);
        let record = create_test_record().with_expiration(past);

        assert!(record.is_expired());
    }

    #[test]
    fn test_record_usage_tracking() {
        let mut record = create_test_record();

        assert!(record.last_used().is_none());

        record.record_usage();
        record.record_usage();

        assert!(record.last_used().is_some());
        assert_eq!(record.usage_count(), 2);
    }

    #[test]
    fn test_replace_encrypted_key() {
        let mut record = create_test_record().with_validity(true);
        let before = record.updated_at();

        record.replace_encrypted_key("new-blob", true);

        assert_eq!(record.encrypted_key(), "new-blob");
        assert!(record.updated_at() >= before);
    }

    #[test]
    fn test_ciphertext_not_serialized() {
        let record = create_test_record();
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("encrypted_key").is_none());
        assert!(json.get("name").is_some());
    }

    #[test]
    fn test_validation_result() {
        let result = ValidationResult::valid(Service::OpenAi, "Key format is valid")
            .with_details(serde_json::json!({ "checked": "prefix" }));

        assert!(result.is_valid);
        assert!(result.details.is_some());
    }
}
