use thiserror::Error;

/// Errors that can occur during conversation management.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("LLM provider error: {0}")]
    LLMError(#[from] anyhow::Error),

    #[error("Empty response from LLM")]
    EmptyResponse,
}
