//! Client configuration from environment variables

use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the trainer service
    pub api_base_url: String,

    /// User the sessions and learned flags belong to
    pub user_id: i64,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl ClientConfig {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unparsable numbers fall back
    /// to their defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_base_url: var("TRAINER_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            user_id: var("TRAINER_USER_ID")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            timeout_secs: var("TRAINER_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            user_agent: var("TRAINER_USER_AGENT")
                .unwrap_or_else(|| "OpeningTrainer/1.0".to_string()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a URL for an API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}
