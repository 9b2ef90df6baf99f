//! Error types for the client.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Token storage error: {0}")]
    TokenStore(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl ClientError {
    /// The string surfaced to the UI for this failure: the server-provided
    /// message when there is one, a generic fallback otherwise. The error
    /// taxonomy is deliberately flat; callers do not branch on kinds.
    pub fn ui_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            _ => "Request failed".to_string(),
        }
    }

    /// HTTP status of the failure, when the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
