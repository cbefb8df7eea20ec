//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
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
    /// When absent the LLM pipeline is disabled and schedule generation runs
    /// on the heuristic analyzer only.
    pub openai_api_key: Option<String>,
    pub extraction_model: String,
    pub analysis_model: String,
    /// Per-call budget for the external LLM; on expiry the pipeline falls
    /// back to the heuristic analyzer.
    pub llm_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure
    /// tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        let extraction_model =
            std::env::var("EXTRACTION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let analysis_model =
            std::env::var("ANALYSIS_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        let llm_timeout_str =
            std::env::var("LLM_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string());
        let llm_timeout_secs = llm_timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("LLM_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let max_upload_mb_str =
            std::env::var("MAX_UPLOAD_MB").unwrap_or_else(|_| "50".to_string());
        let max_upload_mb = max_upload_mb_str.parse::<usize>().map_err(|e| {
            ConfigError::InvalidValue("MAX_UPLOAD_MB".to_string(), e.to_string())
        })?;

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            extraction_model,
            analysis_model,
            llm_timeout: Duration::from_secs(llm_timeout_secs),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}
