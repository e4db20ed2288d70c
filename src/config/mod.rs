mod app_config;

pub use app_config::{
    EncryptionConfig, LogFormat, LoggingConfig, RateLimitSettings, ValidationConfig, VaultConfig,
};
