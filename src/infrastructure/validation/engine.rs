//! Validation engine
//!
//! Dispatches a credential check to the validator registered for its service,
//! falling back to generic validation for unregistered services. When a live
//! hook is configured it takes precedence over the offline heuristics and is
//! bounded by a timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::hook::LiveValidationHook;
use super::validators::{
    AmadeusValidator, AnthropicValidator, GenericValidator, GoogleMapsValidator, OpenAiValidator,
    OpenWeatherValidator, ServiceValidator,
};
use crate::domain::api_key::{Service, ValidationResult};

/// Default bound on a live validation probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry-based validation engine
///
/// `validate` never fails: internal problems surface as an invalid result
/// whose message describes the failure class and never the credential.
#[derive(Debug)]
pub struct ValidationEngine {
    validators: HashMap<Service, Arc<dyn ServiceValidator>>,
    fallback: GenericValidator,
    hook: Option<Arc<dyn LiveValidationHook>>,
    probe_timeout: Duration,
}

impl ValidationEngine {
    /// Engine with the built-in validators registered
    pub fn new() -> Self {
        let mut engine = Self {
            validators: HashMap::new(),
            fallback: GenericValidator::default(),
            hook: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        };

        engine.register(Arc::new(OpenAiValidator));
        engine.register(Arc::new(AnthropicValidator));
        engine.register(Arc::new(OpenWeatherValidator));
        engine.register(Arc::new(GoogleMapsValidator));
        engine.register(Arc::new(AmadeusValidator));

        engine
    }

    /// Engine with no validators registered (everything falls back to generic)
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
            fallback: GenericValidator::default(),
            hook: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Register (or replace) a validator for its service
    pub fn register(&mut self, validator: Arc<dyn ServiceValidator>) {
        self.validators.insert(validator.service(), validator);
    }

    /// Attach a live validation hook
    pub fn with_hook(mut self, hook: Arc<dyn LiveValidationHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Override the probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Validate a credential for a service
    pub async fn validate(&self, service: &Service, key_value: &str) -> ValidationResult {
        if let Some(hook) = &self.hook {
            return self.probe(hook, service, key_value).await;
        }

        match self.validators.get(service) {
            Some(validator) => {
                debug!(service = %service, "Running service validator");
                validator.validate(key_value)
            }
            None => {
                debug!(service = %service, "No validator registered, using generic validation");
                self.fallback.validate_for(service.clone(), key_value)
            }
        }
    }

    async fn probe(
        &self,
        hook: &Arc<dyn LiveValidationHook>,
        service: &Service,
        key_value: &str,
    ) -> ValidationResult {
        match tokio::time::timeout(self.probe_timeout, hook.probe(service, key_value)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(service = %service, error = %e, "Live validation probe failed");
                ValidationResult::invalid(
                    service.clone(),
                    "Live validation failed; the service could not be reached or rejected the request",
                )
            }
            Err(_) => {
                warn!(service = %service, timeout = ?self.probe_timeout, "Live validation probe timed out");
                ValidationResult::invalid(service.clone(), "Live validation timed out")
            }
        }
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use async_trait::async_trait;

    #[tokio::test]
    async fn test_openai_heuristics() {
        let engine = ValidationEngine::new();

        let key = format!("sk-{}", "x".repeat(20));
        let result = engine.validate(&Service::OpenAi, &key).await;
        assert!(result.is_valid);

        let result = engine.validate(&Service::OpenAi, "bad").await;
        assert!(!result.is_valid);
    }

    #[tokio::test]
    async fn test_unknown_service_falls_back_to_generic() {
        let engine = ValidationEngine::new();
        let service = Service::parse("unknown_service");

        let result = engine.validate(&service, &"x".repeat(20)).await;
        assert!(result.is_valid);
        assert!(result.message.contains("generic validation"));

        let result = engine.validate(&service, "short").await;
        assert!(!result.is_valid);
    }

    #[tokio::test]
    async fn test_message_never_contains_the_key() {
        let engine = ValidationEngine::new();
        let key = format!("sk-{}", "supersecretvalue1234");

        let result = engine.validate(&Service::OpenAi, &key).await;
        assert!(!result.message.contains("supersecretvalue"));
    }

    #[derive(Debug)]
    struct StaticHook {
        valid: bool,
    }

    #[async_trait]
    impl LiveValidationHook for StaticHook {
        async fn probe(
            &self,
            service: &Service,
            _key_value: &str,
        ) -> Result<ValidationResult, DomainError> {
            if self.valid {
                Ok(ValidationResult::valid(service.clone(), "Probe succeeded"))
            } else {
                Ok(ValidationResult::invalid(service.clone(), "Probe rejected"))
            }
        }
    }

    #[derive(Debug)]
    struct FailingHook;

    #[async_trait]
    impl LiveValidationHook for FailingHook {
        async fn probe(
            &self,
            _service: &Service,
            _key_value: &str,
        ) -> Result<ValidationResult, DomainError> {
            Err(DomainError::internal("connection refused"))
        }
    }

    #[derive(Debug)]
    struct HangingHook;

    #[async_trait]
    impl LiveValidationHook for HangingHook {
        async fn probe(
            &self,
            service: &Service,
            _key_value: &str,
        ) -> Result<ValidationResult, DomainError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ValidationResult::valid(service.clone(), "unreachable"))
        }
    }

    #[tokio::test]
    async fn test_hook_takes_precedence_over_heuristics() {
        let engine = ValidationEngine::new().with_hook(Arc::new(StaticHook { valid: false }));

        // Format-valid key rejected by the live probe
        let key = format!("sk-{}", "x".repeat(20));
        let result = engine.validate(&Service::OpenAi, &key).await;
        assert!(!result.is_valid);
    }

    #[tokio::test]
    async fn test_hook_failure_is_an_invalid_result() {
        let engine = ValidationEngine::new().with_hook(Arc::new(FailingHook));

        let result = engine.validate(&Service::OpenAi, "sk-anything12345678901").await;
        assert!(!result.is_valid);
        assert!(result.message.contains("Live validation failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hook_timeout_is_an_invalid_result() {
        let engine = ValidationEngine::new()
            .with_hook(Arc::new(HangingHook))
            .with_probe_timeout(Duration::from_millis(100));

        let result = engine.validate(&Service::OpenAi, "sk-anything12345678901").await;
        assert!(!result.is_valid);
        assert!(result.message.contains("timed out"));
    }
}
