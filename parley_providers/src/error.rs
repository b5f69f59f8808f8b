use thiserror::Error;

/// Transport-level failures from a chat completions endpoint.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("401 Unauthorized: check the provider API key")]
    Unauthorized,

    #[error("HTTP {status} error: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    Decode(#[source] serde_json::Error),
}
