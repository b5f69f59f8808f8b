//! Extraction pipeline: prompt, parse, validate, and at most one retry.
//!
//! ```text
//! Initial -> Parsed -> Validated -> (RetryParsed -> RetryValidated)? -> Done
//! ```
//!
//! The retry happens only when the first validation flagged
//! `age invalid int`. Email and phone failures are reported, never retried.

use parley_core::{ChatMessage, ChatRequest, LLMProvider, RecordStore, UserRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::parse::parse_function_call_response;
use crate::schema::extract_function;
use crate::validator::{Validation, ValidationIssue, validate_extraction};

pub const EXTRACTION_INSTRUCTION: &str = "Extract JSON info.";
pub const AGE_RETRY_INSTRUCTION: &str = "Ensure age is returned as an integer only.";

/// Configuration for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Model override; the provider's default model when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Output token bound per call
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 200,
            temperature: 0.0,
        }
    }
}

/// States the pipeline passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Initial,
    Parsed,
    Validated,
    RetryParsed,
    RetryValidated,
    Done,
}

/// Final result of one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub record: UserRecord,
    /// Issues that survived the last validation pass.
    pub errors: Vec<ValidationIssue>,
    /// Model calls made: 1, or 2 when the age retry ran.
    pub attempts: u8,
    /// States visited, in order.
    pub stages: Vec<ExtractionStage>,
}

impl ExtractionOutcome {
    #[must_use]
    pub fn error_tags(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.as_str()).collect()
    }

    #[must_use]
    pub fn retried(&self) -> bool {
        self.attempts > 1
    }
}

pub struct ExtractionPipeline<P> {
    provider: P,
    model: String,
    config: ExtractionConfig,
}

impl<P> ExtractionPipeline<P>
where
    P: LLMProvider,
{
    pub fn new(provider: P, config: ExtractionConfig) -> Self {
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| provider.get_default_model().to_string());
        Self {
            provider,
            model,
            config,
        }
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The two-message extraction prompt for `chat_text`.
    #[must_use]
    pub fn build_messages(chat_text: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(EXTRACTION_INSTRUCTION),
            ChatMessage::user(chat_text),
        ]
    }

    /// Extract user info from `chat_text`, retrying once for a bad age.
    ///
    /// Only transport failures abort; parse and validation problems come back
    /// inside the outcome.
    pub async fn extract_with_retry(
        &self,
        chat_text: &str,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let mut stages = vec![ExtractionStage::Initial];
        let messages = Self::build_messages(chat_text);

        let mut validation = self.attempt(messages.clone()).await?;
        stages.extend([ExtractionStage::Parsed, ExtractionStage::Validated]);
        let mut attempts = 1;

        if validation.has(ValidationIssue::AgeInvalidInt) {
            warn!(
                "Extraction returned a non-integer age, retrying once (errors: {:?})",
                validation.error_tags()
            );
            let mut retry_messages = messages;
            retry_messages.push(ChatMessage::system(AGE_RETRY_INSTRUCTION));

            validation = self.attempt(retry_messages).await?;
            stages.extend([ExtractionStage::RetryParsed, ExtractionStage::RetryValidated]);
            attempts += 1;
        }

        stages.push(ExtractionStage::Done);
        info!(
            "Extraction done after {attempts} call(s): errors={:?}",
            validation.error_tags()
        );

        Ok(ExtractionOutcome {
            record: validation.normalized,
            errors: validation.errors,
            attempts,
            stages,
        })
    }

    /// Extract, then hand the normalized record to `store`.
    ///
    /// The record is stored even when validation errors remain.
    pub async fn extract_and_store(
        &self,
        chat_text: &str,
        store: &dyn RecordStore,
    ) -> Result<(ExtractionOutcome, i64), ExtractionError> {
        let outcome = self.extract_with_retry(chat_text).await?;
        let id = store
            .save(&outcome.record)
            .await
            .map_err(ExtractionError::Storage)?;
        debug!("Stored extracted record with id {id}");
        Ok((outcome, id))
    }

    async fn attempt(&self, messages: Vec<ChatMessage>) -> Result<Validation, ExtractionError> {
        let request = ChatRequest::new(self.model.clone(), messages)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
            .with_forced_function(extract_function());

        let response = self.provider.chat(&request).await?;
        let fields = parse_function_call_response(&response);
        debug!("Parsed {} raw field(s)", fields.len());

        Ok(validate_extraction(&fields))
    }
}
