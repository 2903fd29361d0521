//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub qa_model: String,
    pub insight_model: String,
    pub feedback_model: String,
    pub announcement_model: String,
    pub log_summary_model: String,
    pub help_chat_model: String,
    /// Populate the in-memory store with the demo dataset at startup.
    pub seed_demo_data: bool,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Assistant Model Settings ---
        let qa_model = std::env::var("QA_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let insight_model =
            std::env::var("INSIGHT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let feedback_model =
            std::env::var("FEEDBACK_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let announcement_model =
            std::env::var("ANNOUNCEMENT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let log_summary_model =
            std::env::var("LOG_SUMMARY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let help_chat_model =
            std::env::var("HELP_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        // --- Load Portal Settings ---
        let seed_demo_data = std::env::var("SEED_DEMO_DATA")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            qa_model,
            insight_model,
            feedback_model,
            announcement_model,
            log_summary_model,
            help_chat_model,
            seed_demo_data,
            cors_origin,
        })
    }
}
