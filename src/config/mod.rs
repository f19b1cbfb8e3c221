//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `THERAPY_AGENT` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use therapy_workflows::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Calling model {}", config.ai.model);
//! ```

mod ai;
mod error;
mod logging;
mod workflow;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use workflow::WorkflowConfig;

use serde::Deserialize;

/// Root configuration for the workflow worker.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Model provider (Groq or OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Risk threshold and checkpoint storage
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads variables with the
    /// `THERAPY_AGENT` prefix:
    ///
    /// - `THERAPY_AGENT__AI__API_KEY=gsk_...` -> `ai.api_key`
    /// - `THERAPY_AGENT__WORKFLOW__RISK_ALERT_THRESHOLD=5` -> `workflow.risk_alert_threshold`
    /// - `THERAPY_AGENT__LOGGING__FORMAT=json` -> `logging.format`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("THERAPY_AGENT")
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
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.workflow.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
