// src/config.rs
use std::time::Duration;

use crate::errors::{CoachError, Result};

/// Configuration for the Gemini gateway.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    /// Candidate models, tried in priority order. Each model has its own
    /// provider-side quota, so exhausting one shifts load to the next.
    pub models: Vec<String>,
    pub attempts_per_model: usize,
    /// Backoff schedule for rate-limited retries, indexed by attempt number.
    pub backoff: Vec<Duration>,
    pub request_timeout: Duration,
}

impl GeminiConfig {
    /// Load the gateway configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| CoachError::Config("GEMINI_API_KEY must be set".to_string()))?;

        let api_base = std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1beta/models".to_string()
        });

        let models_str = std::env::var("GEMINI_MODELS").unwrap_or_else(|_| {
            "gemini-2.5-flash,gemini-2.0-flash,gemini-2.0-flash-lite".to_string()
        });
        let models = parse_model_list(&models_str);
        if models.is_empty() {
            return Err(CoachError::Config(
                "GEMINI_MODELS must name at least one model".to_string(),
            ));
        }

        Ok(GeminiConfig {
            api_base,
            api_key,
            models,
            attempts_per_model: 3,
            backoff: vec![
                Duration::from_secs(10),
                Duration::from_secs(30),
                Duration::from_secs(60),
            ],
            request_timeout: Duration::from_secs(60),
        })
    }

    /// Backoff duration for a retry attempt. The last schedule entry repeats
    /// for attempts past the end of the schedule.
    pub fn backoff_for_attempt(&self, attempt: usize) -> Duration {
        let idx = attempt.min(self.backoff.len().saturating_sub(1));
        self.backoff.get(idx).copied().unwrap_or(Duration::ZERO)
    }
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub bind_addr: String,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let gemini = GeminiConfig::from_env()?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Ok(AppConfig {
            gemini,
            bind_addr: "0.0.0.0".to_string(),
            port,
        })
    }
}

/// Split a comma-separated model list, trimming surrounding whitespace.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
