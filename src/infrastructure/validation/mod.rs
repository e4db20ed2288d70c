//! Credential validation: registry engine, per-service validators, live hook

mod engine;
mod hook;
mod validators;

pub use engine::{ValidationEngine, DEFAULT_PROBE_TIMEOUT};
pub use hook::LiveValidationHook;
pub use validators::{
    AmadeusValidator, AnthropicValidator, GenericValidator, GoogleMapsValidator, OpenAiValidator,
    OpenWeatherValidator, ServiceValidator,
};
