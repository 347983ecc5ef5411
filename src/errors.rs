// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error("Received empty text response from model")]
    EmptyResponse,

    #[error("Model '{0}' rate limited")]
    RateLimited(String),

    #[error("All candidate models exhausted: {source}")]
    AllModelsExhausted {
        #[source]
        source: Box<CoachError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Script {0} not found")]
    ScriptNotFound(i64),
}

pub type Result<T> = std::result::Result<T, CoachError>;
