use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Failed to apply parameter override: {0}")]
    OverrideError(#[from] serde_json::Error),

    #[error("Failed to initialise logging: {0}")]
    LoggingError(String),
}
