//! REST endpoint and session configuration.

use serde::{Deserialize, Serialize};

/// Notification API endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the `/notifications` routes hang off, e.g. `https://site/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// TCP/TLS connect timeout in seconds. Requests themselves have no timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

/// Identity supplied by the external session provider.
///
/// Without a `user_id` the client stays idle: no stream is opened and no
/// mutation is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Signed-in user id.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Bearer token forwarded on every request.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}
