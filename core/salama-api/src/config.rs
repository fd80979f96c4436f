//! API client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the license API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the license API (e.g. `https://portal.salamaguard.app/api`).
    pub base_url: String,
    /// Static service credential sent in the `Authorization` header.
    pub api_token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://portal.salamaguard.app/api".to_string(),
            api_token: String::new(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Returns the request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
