use std::time::Duration;

use serde::Deserialize;

use crate::services::attempt::RetryPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Gemini API key
    #[serde(default)]
    pub gemini_api_key: String,

    /// Gemini REST base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Model used for both generation and verification
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Upper bound for a single generation call
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Upper bound for a single verification call
    #[serde(default = "default_validation_timeout_secs")]
    pub validation_timeout_secs: u64,

    /// Retry when fewer than this many candidates survive validation
    #[serde(default = "default_retry_min_filtered")]
    pub retry_min_filtered: usize,

    /// ...and the raw response had more than this many candidates
    #[serde(default = "default_retry_min_raw")]
    pub retry_min_raw: usize,
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_attempt_timeout_secs() -> u64 {
    45
}

fn default_validation_timeout_secs() -> u64 {
    20
}

fn default_retry_min_filtered() -> usize {
    2
}

fn default_retry_min_raw() -> usize {
    3
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            min_filtered: self.retry_min_filtered,
            min_raw_for_retry: self.retry_min_raw,
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }
}
