// src/gateway.rs

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::config::GeminiConfig;
use crate::errors::{CoachError, Result};

/// Outcome of a single generateContent attempt against one model.
enum Attempt {
    /// The model produced text; stop all iteration.
    Success(String),
    /// HTTP 429; retry the same model after backoff.
    RateLimited,
    /// Any other failure; advance to the next candidate model.
    Failed(CoachError),
}

/// Fallback/retry wrapper around the Gemini generateContent endpoint.
///
/// Iterates the configured candidate models in priority order, retrying
/// rate-limited calls against the same model and advancing past any other
/// failure. The first successful response wins.
pub struct GeminiGateway {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGateway {
    /// Creates a new `GeminiGateway`.
    pub fn new(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// Sends a prompt and returns the first candidate's response text.
    ///
    /// Fails with [`CoachError::AllModelsExhausted`], carrying the last
    /// observed error, only when every candidate model has been tried.
    pub async fn call_model(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "maxOutputTokens": max_tokens,
                "temperature": temperature,
            },
        });

        let mut last_error: Option<CoachError> = None;

        for model in &self.config.models {
            for attempt in 0..self.config.attempts_per_model {
                match self.attempt_generate(model, &body).await {
                    Attempt::Success(text) => return Ok(text),
                    Attempt::RateLimited => {
                        let wait = self.config.backoff_for_attempt(attempt);
                        log::warn!(
                            "⏳ Rate limited on {} (attempt {}), retrying in {}s",
                            model,
                            attempt + 1,
                            wait.as_secs()
                        );
                        tokio::time::sleep(wait).await;
                        last_error = Some(CoachError::RateLimited(model.clone()));
                    }
                    Attempt::Failed(err) => {
                        log::warn!("Model {} failed, trying next candidate: {}", model, err);
                        last_error = Some(err);
                        break;
                    }
                }
            }
        }

        Err(CoachError::AllModelsExhausted {
            source: Box::new(last_error.unwrap_or_else(|| {
                CoachError::Config("no candidate models configured".to_string())
            })),
        })
    }

    /// One POST to `{base}/{model}:generateContent?key={api_key}`.
    async fn attempt_generate(&self, model: &str, body: &Value) -> Attempt {
        let url = format!(
            "{}/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        );

        log::info!("📡 Calling Gemini: {} with model: {}", url, model);

        let resp = match self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return Attempt::Failed(CoachError::Request(e)),
        };

        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::RateLimited;
        }

        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Attempt::Failed(CoachError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => return Attempt::Failed(CoachError::Request(e)),
        };

        let output = response_json
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str());

        match output {
            Some(text) if !text.is_empty() => Attempt::Success(text.to_string()),
            Some(_) => Attempt::Failed(CoachError::EmptyResponse),
            None => Attempt::Failed(CoachError::UnexpectedResponse(response_json.to_string())),
        }
    }
}
