//! Scripted walk-through of summarization and truncation.

use parley_conversation::{ConversationConfig, ConversationManager, DEFAULT_SUMMARY_INSTRUCTIONS};
use parley_core::Role;

use super::{load_config_and_provider, print_messages};

const BOOKING_DIALOGUE: [(Role, &str); 5] = [
    (Role::User, "Hi, can you help me with my booking?"),
    (Role::Assistant, "Sure, please provide your booking ID."),
    (Role::User, "The ID is 10257."),
    (Role::Assistant, "Thanks. I see your booking for tomorrow at 11 AM."),
    (Role::User, "Can I reschedule it to next Monday?"),
];

const SUMMARIZE_EVERY: i64 = 3;

/// Replays a five-message booking dialogue with a summary every third
/// message, prints three truncated views, then collapses the history into
/// a final summary.
#[derive(Debug, Clone, Copy)]
pub struct SummarizeDemoStrategy;

impl super::CommandStrategy for SummarizeDemoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let (config, provider) = load_config_and_provider()?;

        let demo_config = ConversationConfig {
            model: config.conversation.model.clone(),
            summary_max_tokens: config.conversation.summary_max_tokens,
            temperature: config.conversation.temperature,
            ..ConversationConfig::default()
        };
        let mut manager = ConversationManager::new(provider, demo_config);

        println!("=== Conversation management & summarization ===");
        for (role, content) in BOOKING_DIALOGUE {
            manager.add_message(role, content);
            if let Some(outcome) = manager
                .periodic_summarize_check(SUMMARIZE_EVERY, "Summarize briefly.", false)
                .await?
            {
                println!(
                    "\n[Summary after message {}]:",
                    manager.history().run_counter()
                );
                println!("{}", outcome.summary);
            }
        }

        println!("\nLast 2 turns:");
        print_messages(&manager.truncate_by_turns(2));
        println!("\nTruncate by 50 chars:");
        print_messages(&manager.truncate_by_chars(50));
        println!("\nTruncate by 15 words:");
        print_messages(&manager.truncate_by_words(15));

        let outcome = manager
            .summarize_history(DEFAULT_SUMMARY_INSTRUCTIONS, true)
            .await?;
        println!("\nFinal summary of conversation:");
        println!("{}", outcome.summary);
        println!("\nHistory after replacement:");
        print_messages(&manager.get_messages());

        Ok(())
    }
}
