use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    pub encryption: EncryptionConfig,
    pub validation: ValidationConfig,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingConfig,
}

/// Master key material configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EncryptionConfig {
    /// Operator secret the master key is derived from; set via
    /// `VAULT__ENCRYPTION__MASTER_SECRET` in deployments
    pub master_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Timeout for a live validation probe, in seconds
    pub probe_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Validation attempts permitted per key within the window
    pub max_attempts: usize,
    /// Trailing window length in seconds
    pub window_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            encryption: EncryptionConfig::default(),
            validation: ValidationConfig::default(),
            rate_limit: RateLimitSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            master_secret: String::new(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            probe_timeout_seconds: 30,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window_seconds: 3600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl VaultConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("VAULT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let config = VaultConfig::default();

        assert_eq!(config.rate_limit.max_attempts, 3);
        assert_eq!(config.rate_limit.window_seconds, 3600);
        assert_eq!(config.validation.probe_timeout_seconds, 30);
    }
}
