//! Conversation manager for multi-turn dialogue.
//!
//! The `ConversationManager` owns one history and exposes appends, bounded
//! views, explicit summarization and the periodic summarization check.
//! It has no internal locking; callers serialize access to one conversation.

use std::sync::Arc;

use parley_core::{ChatMessage, ChatRequest, LLMProvider, Role, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConversationError;
use crate::history::HistoryStore;
use crate::summarizer::{
    DEFAULT_PERIODIC_INSTRUCTIONS, Summarizer, SummarizerSettings, SummaryOutcome, should_fire,
};
use crate::truncation::{self, TruncationStrategy};

/// Configuration for conversation management.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversationConfig {
    /// Model override; the provider's default model when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// System prompt for `process_turn`
    pub system_prompt: String,
    /// Periodic summarization interval in appends; `<= 0` disables it
    pub summarize_every: i64,
    /// Instructions passed to periodic summarization
    pub summary_instructions: String,
    /// Whether periodic summarization collapses history
    pub replace_on_summary: bool,
    /// Output token bound for summaries
    pub summary_max_tokens: u32,
    /// Sampling temperature for every call
    pub temperature: f32,
    /// Output token bound for replies in `process_turn`
    pub reply_max_tokens: u32,
    /// History window forwarded with each turn
    pub context_window: TruncationStrategy,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            model: None,
            system_prompt: "You are a helpful AI assistant.".to_string(),
            summarize_every: 0,
            summary_instructions: DEFAULT_PERIODIC_INSTRUCTIONS.to_string(),
            replace_on_summary: true,
            summary_max_tokens: 400,
            temperature: 0.0,
            reply_max_tokens: 512,
            context_window: TruncationStrategy::default(),
        }
    }
}

impl ConversationConfig {
    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the periodic summarization interval.
    #[must_use]
    pub const fn with_summarize_every(mut self, k: i64) -> Self {
        self.summarize_every = k;
        self
    }

    /// Set the history window used for replies.
    #[must_use]
    pub const fn with_context_window(mut self, window: TruncationStrategy) -> Self {
        self.context_window = window;
        self
    }
}

/// Result of processing a conversation turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Assistant's response
    pub response: String,
    /// Token usage information
    pub usage: Option<Usage>,
    /// Summaries fired by the two appends of this turn
    pub summaries: Vec<SummaryOutcome>,
}

/// Multi-turn conversation manager.
pub struct ConversationManager<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    history: HistoryStore,
    summarizer: Summarizer<P>,
    config: ConversationConfig,
}

impl<P> ConversationManager<P>
where
    P: LLMProvider + Send + Sync,
{
    /// Create a manager with an empty history.
    pub fn new(provider: P, config: ConversationConfig) -> Self {
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| provider.get_default_model().to_string());
        info!("Creating conversation manager: model={model}");

        let settings = SummarizerSettings {
            model,
            max_tokens: config.summary_max_tokens,
            temperature: config.temperature,
        };

        Self {
            history: HistoryStore::new(),
            summarizer: Summarizer::new(provider, settings),
            config,
        }
    }

    /// Append a message and return the updated run counter.
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) -> u64 {
        self.history.append(role, content)
    }

    /// Full history as `(role, content)` pairs.
    #[must_use]
    pub fn get_messages(&self) -> Vec<ChatMessage> {
        self.history.as_role_content_pairs()
    }

    #[must_use]
    pub fn truncate_by_turns(&self, n: i64) -> Vec<ChatMessage> {
        truncation::by_turns(self.history.messages(), n)
    }

    #[must_use]
    pub fn truncate_by_chars(&self, max_chars: usize) -> Vec<ChatMessage> {
        truncation::by_chars(self.history.messages(), max_chars)
    }

    #[must_use]
    pub fn truncate_by_words(&self, max_words: usize) -> Vec<ChatMessage> {
        truncation::by_words(self.history.messages(), max_words)
    }

    /// History bounded by the configured context window.
    #[must_use]
    pub fn context_window(&self) -> Vec<ChatMessage> {
        self.config.context_window.apply(self.history.messages())
    }

    /// Summarize the whole history now.
    pub async fn summarize_history(
        &mut self,
        instructions: &str,
        replace: bool,
    ) -> Result<SummaryOutcome, ConversationError> {
        self.summarizer
            .summarize(&mut self.history, instructions, replace)
            .await
    }

    /// Summarize if the run counter is a positive multiple of `k`.
    ///
    /// Returns `None` when the trigger did not fire, which is distinct from
    /// `Some` outcome carrying an empty summary.
    pub async fn periodic_summarize_check(
        &mut self,
        k: i64,
        instructions: &str,
        replace: bool,
    ) -> Result<Option<SummaryOutcome>, ConversationError> {
        let run_counter = self.history.run_counter();
        if !should_fire(run_counter, k) {
            return Ok(None);
        }

        info!("Periodic summarization fired at run {run_counter} (every {k})");
        self.summarize_history(instructions, replace).await.map(Some)
    }

    /// Append a message, then run the periodic check with configured settings.
    pub async fn add_message_and_check(
        &mut self,
        role: Role,
        content: impl Into<String>,
    ) -> Result<Option<SummaryOutcome>, ConversationError> {
        self.add_message(role, content);
        let instructions = self.config.summary_instructions.clone();
        self.periodic_summarize_check(
            self.config.summarize_every,
            &instructions,
            self.config.replace_on_summary,
        )
        .await
    }

    /// Process a single conversation turn.
    ///
    /// Appends the user input, asks the model for a reply using the system
    /// prompt plus the configured context window, and appends the reply.
    /// Each append is followed by the periodic check.
    pub async fn process_turn(&mut self, user_input: &str) -> Result<TurnResult, ConversationError> {
        let mut summaries = Vec::new();

        if let Some(outcome) = self.add_message_and_check(Role::User, user_input).await? {
            summaries.push(outcome);
        }

        let mut messages = vec![ChatMessage::system(self.config.system_prompt.clone())];
        messages.extend(self.context_window());

        let request = ChatRequest::new(self.summarizer.settings().model.clone(), messages)
            .with_max_tokens(self.config.reply_max_tokens)
            .with_temperature(self.config.temperature);

        let completion = self.summarizer.provider().chat(&request).await?;
        let response = completion.first_content().to_string();

        if response.trim().is_empty() {
            return Err(ConversationError::EmptyResponse);
        }

        if let Some(outcome) = self
            .add_message_and_check(Role::Assistant, response.clone())
            .await?
        {
            summaries.push(outcome);
        }

        debug!("Turn completed: run_counter={}", self.history.run_counter());

        Ok(TurnResult {
            response,
            usage: completion.usage,
            summaries,
        })
    }

    /// Get the current history.
    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::ChatCompletion;
    use parley_core::testing::ScriptedProvider;

    #[test]
    fn test_config_default() {
        let config = ConversationConfig::default();
        assert_eq!(config.summarize_every, 0);
        assert_eq!(config.summary_max_tokens, 400);
        assert!(config.replace_on_summary);
        assert!(config.model.is_none());
    }

    #[test]
    fn config_fills_missing_fields() {
        let config: ConversationConfig =
            serde_json::from_str(r#"{"summarize_every": 3, "context_window": {"strategy": "chars", "limit": 50}}"#)
                .unwrap();
        assert_eq!(config.summarize_every, 3);
        assert_eq!(config.context_window, TruncationStrategy::Chars(50));
        assert_eq!(config.summary_instructions, DEFAULT_PERIODIC_INSTRUCTIONS);
    }

    #[test]
    fn model_falls_back_to_provider_default() {
        let manager = ConversationManager::new(ScriptedProvider::new(), ConversationConfig::default());
        assert_eq!(manager.summarizer.settings().model, "scripted-model");

        let config = ConversationConfig::default().with_model("custom".to_string());
        let manager = ConversationManager::new(ScriptedProvider::new(), config);
        assert_eq!(manager.summarizer.settings().model, "custom");
    }

    #[tokio::test]
    async fn periodic_check_never_fires_for_non_positive_k() {
        let mut manager =
            ConversationManager::new(ScriptedProvider::new(), ConversationConfig::default());
        for i in 0..6 {
            manager.add_message(Role::User, format!("m{i}"));
            assert!(manager.periodic_summarize_check(0, "x", true).await.unwrap().is_none());
            assert!(manager.periodic_summarize_check(-2, "x", true).await.unwrap().is_none());
        }
        assert_eq!(manager.history().len(), 6);
    }

    #[tokio::test]
    async fn fired_empty_summary_differs_from_not_fired() {
        let provider = ScriptedProvider::new().then(ChatCompletion::default());
        let mut manager = ConversationManager::new(provider, ConversationConfig::default());

        manager.add_message(Role::User, "a");
        let outcome = manager.periodic_summarize_check(1, "x", false).await.unwrap();

        let outcome = outcome.unwrap();
        assert_eq!(outcome.summary, "");
        assert!(outcome.raw_response.is_some());
    }

    #[tokio::test]
    async fn add_message_and_check_uses_config() {
        let provider = ScriptedProvider::new().then(ChatCompletion::from_text("summary"));
        let config = ConversationConfig::default().with_summarize_every(2);
        let mut manager = ConversationManager::new(provider, config);

        assert!(manager.add_message_and_check(Role::User, "one").await.unwrap().is_none());
        let fired = manager.add_message_and_check(Role::Assistant, "two").await.unwrap();

        assert_eq!(fired.unwrap().summary, "summary");
        assert_eq!(manager.history().len(), 1);
        assert_eq!(manager.history().run_counter(), 2);
        let request = &manager.summarizer.provider().requests()[0];
        assert!(request.messages[1].content.contains(DEFAULT_PERIODIC_INSTRUCTIONS));
    }

    #[tokio::test]
    async fn process_turn_sends_window_and_records_reply() {
        let provider = ScriptedProvider::new().then(ChatCompletion::from_text("Sure."));
        let config = ConversationConfig::default().with_context_window(TruncationStrategy::Turns(2));
        let mut manager = ConversationManager::new(provider, config);
        manager.add_message(Role::User, "old 1");
        manager.add_message(Role::Assistant, "old 2");

        let result = manager.process_turn("Can you help?").await.unwrap();

        assert_eq!(result.response, "Sure.");
        assert!(result.summaries.is_empty());
        assert_eq!(manager.history().len(), 4);

        let request = &manager.summarizer.provider().requests()[0];
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "old 2");
        assert_eq!(request.messages[2].content, "Can you help?");
    }

    #[tokio::test]
    async fn process_turn_rejects_blank_reply() {
        let provider = ScriptedProvider::new().then(ChatCompletion::from_text("   "));
        let mut manager = ConversationManager::new(provider, ConversationConfig::default());

        let err = manager.process_turn("hello").await.unwrap_err();

        assert!(matches!(err, ConversationError::EmptyResponse));
        assert_eq!(manager.history().len(), 1);
    }
}
