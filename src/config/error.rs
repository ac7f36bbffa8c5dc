//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Base URL must use http or https")]
    InvalidBaseUrl,

    #[error("Context must keep at least one turn")]
    InvalidContextTurns,

    #[error("Parse error limit must be at least 1")]
    InvalidParseErrorLimit,

    #[error("Invalid connect timeout")]
    InvalidTimeout,
}
