// src/api/state.rs
use std::sync::Arc;

use reqwest::Client;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::gateway::GeminiGateway;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Arc<GeminiGateway>,
    pub db_pool: SqlitePool,
}

impl AppState {
    pub fn new(config: AppConfig, db_pool: SqlitePool) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.gemini.request_timeout)
            .build()?;
        let gateway = GeminiGateway::new(client, config.gemini.clone());

        Ok(Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            db_pool,
        })
    }
}
