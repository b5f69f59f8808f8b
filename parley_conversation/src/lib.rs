#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Multi-turn conversation history with bounded views and summarization.
//!
//! # Key Features
//! - Append-only history with a lifetime append counter
//! - Truncation by turn count, character budget or word budget
//! - Periodic summarization every `k` appends
//! - Optional collapse of history into a single summary message

mod error;
mod history;
mod manager;
mod summarizer;
pub mod truncation;

pub use error::ConversationError;
pub use history::{HistoryStats, HistoryStore, Message};
pub use manager::{ConversationConfig, ConversationManager, TurnResult};
pub use summarizer::{
    DEFAULT_PERIODIC_INSTRUCTIONS, DEFAULT_SUMMARY_INSTRUCTIONS, SUMMARIZER_PERSONA, Summarizer,
    SummarizerSettings, SummaryOutcome, build_prompt, render_transcript, should_fire,
};
pub use truncation::TruncationStrategy;
