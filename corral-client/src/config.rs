//! Client configuration.

use std::path::PathBuf;

/// Configuration for the Corral client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `http://localhost:3001`.
    pub api_base_url: String,

    /// Fixed client-wide request timeout in milliseconds. A timeout
    /// surfaces as a generic request failure; there is no differentiated
    /// error kind and no retry.
    pub request_timeout_ms: u64,

    /// Where the file-backed token store keeps its token, if used.
    pub token_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            request_timeout_ms: 10_000,
            token_path: None,
        }
    }
}
