//! API server configuration, resolved once at startup from the environment.

use crate::inference::ModelConfig;

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// PostgreSQL connection URL. None selects the in-memory store.
    pub database_url: Option<String>,
    /// Model-tier settings for the intent parser.
    pub model: ModelConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl ApiConfig {
    /// Load config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| default_host()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_port),
            database_url: std::env::var("DATABASE_URL").ok(),
            model: ModelConfig::from_env(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            model: ModelConfig::default(),
        }
    }
}
