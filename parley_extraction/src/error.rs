use thiserror::Error;

/// Fatal extraction failures.
///
/// Parse and validation problems are not errors; they are reported in the
/// extraction outcome.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("LLM provider error: {0}")]
    Provider(#[from] anyhow::Error),

    #[error("Record store error: {0}")]
    Storage(#[source] anyhow::Error),
}
