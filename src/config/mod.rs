//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PERPLEXITY_CHAT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use perplexity_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Completions at {}", config.completion.completions_url());
//! ```

mod completion;
mod error;
mod logging;
mod secrets;

pub use completion::CompletionConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use secrets::SecretsConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable config.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Completion endpoint and orchestration settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// API key storage
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PERPLEXITY_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PERPLEXITY_CHAT__COMPLETION__DEFAULT_MODEL=sonar-pro` -> `completion.default_model`
    /// - `PERPLEXITY_CHAT__SECRETS__PATH=/tmp/secrets.json` -> `secrets.path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PERPLEXITY_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.completion.validate()?;
        self.secrets.validate()?;
        Ok(())
    }
}
