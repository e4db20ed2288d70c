//! Per-service credential format validators
//!
//! These are offline plausibility checks (prefix/length/charset); a live
//! probe against the provider is the job of the pluggable hook.

use std::fmt::Debug;

use crate::domain::api_key::{Service, ValidationResult};

/// Format validator for one service
pub trait ServiceValidator: Send + Sync + Debug {
    /// Service this validator is registered for
    fn service(&self) -> Service;

    /// Check a credential's plausibility; never sees the network
    fn validate(&self, key_value: &str) -> ValidationResult;
}

/// OpenAI keys: `sk-` prefix, reasonable length
#[derive(Debug, Default)]
pub struct OpenAiValidator;

impl ServiceValidator for OpenAiValidator {
    fn service(&self) -> Service {
        Service::OpenAi
    }

    fn validate(&self, key_value: &str) -> ValidationResult {
        if key_value.starts_with("sk-") && key_value.len() >= 20 {
            ValidationResult::valid(Service::OpenAi, "Key matches the OpenAI key format")
        } else {
            ValidationResult::invalid(
                Service::OpenAi,
                "OpenAI keys start with 'sk-' and are at least 20 characters",
            )
        }
    }
}

/// Anthropic keys: `sk-ant-` prefix
#[derive(Debug, Default)]
pub struct AnthropicValidator;

impl ServiceValidator for AnthropicValidator {
    fn service(&self) -> Service {
        Service::Anthropic
    }

    fn validate(&self, key_value: &str) -> ValidationResult {
        if key_value.starts_with("sk-ant-") && key_value.len() >= 20 {
            ValidationResult::valid(Service::Anthropic, "Key matches the Anthropic key format")
        } else {
            ValidationResult::invalid(
                Service::Anthropic,
                "Anthropic keys start with 'sk-ant-' and are at least 20 characters",
            )
        }
    }
}

/// OpenWeather keys: 32 hex characters
#[derive(Debug, Default)]
pub struct OpenWeatherValidator;

impl ServiceValidator for OpenWeatherValidator {
    fn service(&self) -> Service {
        Service::OpenWeather
    }

    fn validate(&self, key_value: &str) -> ValidationResult {
        let hex = key_value.len() == 32 && key_value.chars().all(|c| c.is_ascii_hexdigit());

        if hex {
            ValidationResult::valid(Service::OpenWeather, "Key matches the OpenWeather key format")
        } else {
            ValidationResult::invalid(
                Service::OpenWeather,
                "OpenWeather keys are 32 hexadecimal characters",
            )
        }
    }
}

/// Google Maps keys: `AIza` prefix
#[derive(Debug, Default)]
pub struct GoogleMapsValidator;

impl ServiceValidator for GoogleMapsValidator {
    fn service(&self) -> Service {
        Service::GoogleMaps
    }

    fn validate(&self, key_value: &str) -> ValidationResult {
        if key_value.starts_with("AIza") && key_value.len() >= 30 {
            ValidationResult::valid(Service::GoogleMaps, "Key matches the Google Maps key format")
        } else {
            ValidationResult::invalid(
                Service::GoogleMaps,
                "Google Maps keys start with 'AIza' and are at least 30 characters",
            )
        }
    }
}

/// Amadeus keys: alphanumeric, minimum length
#[derive(Debug, Default)]
pub struct AmadeusValidator;

impl ServiceValidator for AmadeusValidator {
    fn service(&self) -> Service {
        Service::Amadeus
    }

    fn validate(&self, key_value: &str) -> ValidationResult {
        let plausible =
            key_value.len() >= 16 && key_value.chars().all(|c| c.is_ascii_alphanumeric());

        if plausible {
            ValidationResult::valid(Service::Amadeus, "Key matches the Amadeus key format")
        } else {
            ValidationResult::invalid(
                Service::Amadeus,
                "Amadeus keys are alphanumeric and at least 16 characters",
            )
        }
    }
}

/// Fallback for services without a registered validator
#[derive(Debug)]
pub struct GenericValidator {
    min_length: usize,
}

impl GenericValidator {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for GenericValidator {
    fn default() -> Self {
        Self { min_length: 16 }
    }
}

impl GenericValidator {
    /// Validate for an arbitrary service; the message makes it explicit that
    /// only generic validation was applied.
    pub fn validate_for(&self, service: Service, key_value: &str) -> ValidationResult {
        if key_value.len() >= self.min_length {
            ValidationResult::valid(
                service,
                format!(
                    "Key passed generic validation (no service-specific validator registered, minimum length {})",
                    self.min_length
                ),
            )
        } else {
            ValidationResult::invalid(
                service,
                format!(
                    "Key failed generic validation: shorter than {} characters",
                    self.min_length
                ),
            )
        }
    }
}
