//! Bounded views over conversation history.
//!
//! Every function here is pure and returns `(role, content)` pairs oldest
//! first. The character and word budgets walk backwards from the newest
//! message and always keep at least that newest message, so a non-empty
//! history never yields an empty context.

use serde::{Deserialize, Serialize};

use parley_core::ChatMessage;

use crate::history::Message;

/// The last `n` messages. `n <= 0` yields nothing.
#[must_use]
pub fn by_turns(messages: &[Message], n: i64) -> Vec<ChatMessage> {
    let n = match usize::try_from(n) {
        Ok(n) if n > 0 => n,
        _ => return Vec::new(),
    };
    let start = messages.len().saturating_sub(n);
    messages[start..].iter().map(Message::to_chat_message).collect()
}

/// Newest messages whose combined character count fits `max_chars`.
#[must_use]
pub fn by_chars(messages: &[Message], max_chars: usize) -> Vec<ChatMessage> {
    keep_newest_within(messages, max_chars, |content| content.chars().count())
}

/// Newest messages whose combined whitespace-delimited word count fits `max_words`.
#[must_use]
pub fn by_words(messages: &[Message], max_words: usize) -> Vec<ChatMessage> {
    keep_newest_within(messages, max_words, |content| {
        content.split_whitespace().count()
    })
}

fn keep_newest_within(
    messages: &[Message],
    budget: usize,
    cost: impl Fn(&str) -> usize,
) -> Vec<ChatMessage> {
    let mut total = 0_usize;
    let mut kept = 0_usize;

    for message in messages.iter().rev() {
        let next = total.saturating_add(cost(&message.content));
        // The newest message is kept even when it alone overflows.
        if kept > 0 && next > budget {
            break;
        }
        total = next;
        kept += 1;
    }

    messages[messages.len() - kept..]
        .iter()
        .map(Message::to_chat_message)
        .collect()
}

/// A truncation policy selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "limit", rename_all = "lowercase")]
pub enum TruncationStrategy {
    /// Keep the last N turns
    Turns(i64),
    /// Keep newest messages within a character budget
    Chars(usize),
    /// Keep newest messages within a word budget
    Words(usize),
}

impl TruncationStrategy {
    #[must_use]
    pub fn apply(self, messages: &[Message]) -> Vec<ChatMessage> {
        match self {
            Self::Turns(n) => by_turns(messages, n),
            Self::Chars(max) => by_chars(messages, max),
            Self::Words(max) => by_words(messages, max),
        }
    }
}

impl Default for TruncationStrategy {
    fn default() -> Self {
        Self::Turns(20)
    }
}
