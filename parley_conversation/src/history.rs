//! Append-only conversation history.
//!
//! The store keeps every message in conversational order together with a
//! lifetime count of appends. The only way messages leave the store is a
//! wholesale replacement by a summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::{ChatMessage, Role};

/// A single timestamped turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn now(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    /// Drop the timestamp, keeping what the model sees.
    #[must_use]
    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Ordered message history plus a monotonic append counter.
///
/// `run_counter` counts appends over the store's lifetime. It is not the
/// sequence length and summarization never lowers it.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    messages: Vec<Message>,
    run_counter: u64,
}

impl HistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message timestamped now and return the updated counter.
    ///
    /// Empty content is accepted.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> u64 {
        self.messages.push(Message::now(role, content.into()));
        self.run_counter += 1;
        self.run_counter
    }

    /// The history as `(role, content)` pairs in store order.
    #[must_use]
    pub fn as_role_content_pairs(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(Message::to_chat_message).collect()
    }

    /// Replace the whole history with one assistant message holding `summary`.
    pub fn replace_with_summary(&mut self, summary: impl Into<String>) {
        self.messages = vec![Message::now(Role::Assistant, summary.into())];
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub const fn run_counter(&self) -> u64 {
        self.run_counter
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get conversation statistics.
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        let count = |role: Role| self.messages.iter().filter(|m| m.role == role).count();
        let total_chars: usize = self
            .messages
            .iter()
            .map(|m| m.content.chars().count())
            .sum();

        HistoryStats {
            total_messages: self.messages.len(),
            user_messages: count(Role::User),
            assistant_messages: count(Role::Assistant),
            system_messages: count(Role::System),
            total_characters: total_chars,
            estimated_tokens: total_chars / 4, // Rough estimate: 4 chars per token
            run_counter: self.run_counter,
        }
    }
}

/// Statistics about conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub system_messages: usize,
    pub total_characters: usize,
    pub estimated_tokens: usize,
    pub run_counter: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_counts() {
        let mut store = HistoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.run_counter(), 0);

        assert_eq!(store.append(Role::User, "Hello"), 1);
        assert_eq!(store.append(Role::Assistant, "Hi there!"), 2);
        assert_eq!(store.append(Role::User, ""), 3);

        let pairs = store.as_role_content_pairs();
        assert_eq!(
            pairs,
            vec![
                ChatMessage::user("Hello"),
                ChatMessage::assistant("Hi there!"),
                ChatMessage::user(""),
            ]
        );
        assert!(store.messages()[0].timestamp <= store.messages()[2].timestamp);
    }

    #[test]
    fn replace_keeps_run_counter() {
        let mut store = HistoryStore::new();
        for i in 0..4 {
            store.append(Role::User, format!("Message {i}"));
        }

        store.replace_with_summary("short summary");

        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].role, Role::Assistant);
        assert_eq!(store.messages()[0].content, "short summary");
        assert_eq!(store.run_counter(), 4);

        assert_eq!(store.append(Role::User, "next"), 5);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn history_stats() {
        let mut store = HistoryStore::new();
        store.append(Role::System, "be brief");
        store.append(Role::User, "abcd");
        store.append(Role::Assistant, "efgh");
        store.append(Role::User, "ijkl");

        let stats = store.stats();

        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.user_messages, 2);
        assert_eq!(stats.assistant_messages, 1);
        assert_eq!(stats.system_messages, 1);
        assert_eq!(stats.total_characters, 20);
        assert_eq!(stats.estimated_tokens, 5);
        assert_eq!(stats.run_counter, 4);
    }
}
