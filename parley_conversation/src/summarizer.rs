//! History summarization.
//!
//! The summarizer renders the full history as one transcript, asks the model
//! for a summary and, when requested, collapses the history into that single
//! summary. History is only rewritten after the model call succeeded.

use parley_core::{ChatCompletion, ChatMessage, ChatRequest, LLMProvider};
use tracing::{debug, info};

use crate::error::ConversationError;
use crate::history::HistoryStore;

pub const SUMMARIZER_PERSONA: &str = "You are a concise summarizer.";

/// Instructions used by an explicit `summarize_history` call.
pub const DEFAULT_SUMMARY_INSTRUCTIONS: &str =
    "Provide a concise summary + 3 bullets + 1 line summary.";

/// Instructions used by the periodic check.
pub const DEFAULT_PERIODIC_INSTRUCTIONS: &str = "Concise summary.";

/// Whether a periodic summarization is due after an append.
///
/// Fires when `k` is positive and the post-append counter is a multiple of it.
#[must_use]
pub fn should_fire(run_counter: u64, k: i64) -> bool {
    match u64::try_from(k) {
        Ok(k) if k > 0 => run_counter % k == 0,
        _ => false,
    }
}

/// Result of a summarization attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    /// Summary text; empty when history was empty or the model returned nothing.
    pub summary: String,
    /// The model response, `None` when no call was made.
    pub raw_response: Option<ChatCompletion>,
}

impl SummaryOutcome {
    const fn empty() -> Self {
        Self {
            summary: String::new(),
            raw_response: None,
        }
    }
}

/// Model settings for summarization calls.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

pub struct Summarizer<P> {
    provider: P,
    settings: SummarizerSettings,
}

impl<P> Summarizer<P>
where
    P: LLMProvider,
{
    pub const fn new(provider: P, settings: SummarizerSettings) -> Self {
        Self { provider, settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &SummarizerSettings {
        &self.settings
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Summarize `history`, optionally replacing it with the summary.
    ///
    /// Empty history short-circuits: no model call, no mutation.
    pub async fn summarize(
        &self,
        history: &mut HistoryStore,
        instructions: &str,
        replace: bool,
    ) -> Result<SummaryOutcome, ConversationError> {
        if history.is_empty() {
            debug!("History is empty, skipping summarization");
            return Ok(SummaryOutcome::empty());
        }

        let request = ChatRequest::new(
            self.settings.model.clone(),
            build_prompt(history, instructions),
        )
        .with_max_tokens(self.settings.max_tokens)
        .with_temperature(self.settings.temperature);

        info!("Summarizing {} messages", history.len());
        let response = self.provider.chat(&request).await?;

        let summary = response.first_content().to_string();
        if replace {
            history.replace_with_summary(summary.clone());
            info!(
                "Replaced history with summary ({} chars)",
                summary.chars().count()
            );
        }

        Ok(SummaryOutcome {
            summary,
            raw_response: Some(response),
        })
    }
}

/// Render every message as `ROLE: content`, separated by blank lines.
#[must_use]
pub fn render_transcript(history: &HistoryStore) -> String {
    history
        .messages()
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The two-message summarization prompt.
#[must_use]
pub fn build_prompt(history: &HistoryStore, instructions: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SUMMARIZER_PERSONA),
        ChatMessage::user(format!(
            "Summarize this conversation. {instructions}\n\n{}",
            render_transcript(history)
        )),
    ]
}
