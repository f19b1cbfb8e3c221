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
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid model request timeout")]
    InvalidTimeout,

    #[error("Model retries exceed maximum allowed (10)")]
    TooManyRetries,

    #[error("Invalid provider base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Risk alert threshold must be a finite number")]
    InvalidRiskThreshold,

    #[error("Checkpoint run limit must be at least 1")]
    InvalidCheckpointLimit,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
