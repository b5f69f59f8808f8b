//! Interactive multi-turn conversation.

use std::io::Write;

use parley_conversation::{ConversationManager, DEFAULT_SUMMARY_INSTRUCTIONS, SummaryOutcome};
use tracing::info;

use super::{load_config_and_provider, print_messages};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Periodic summarization interval, overriding the config file
    pub summarize_every: Option<i64>,
}

/// Strategy for the interactive chat loop.
///
/// Every user line and every reply goes through the periodic summarization
/// check. `/summary` summarizes on demand without touching history,
/// `/history` prints the stored messages.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let (config, provider) = load_config_and_provider()?;

        let mut conversation_config = config.conversation;
        if let Some(k) = input.summarize_every {
            conversation_config = conversation_config.with_summarize_every(k);
        }
        info!(
            "Starting chat: summarize_every={}, context_window={:?}",
            conversation_config.summarize_every, conversation_config.context_window
        );

        let mut manager = ConversationManager::new(provider, conversation_config);

        println!("parley chat started. Commands: /summary, /history, exit\n");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();

            match line {
                "" => {}
                "exit" => break,
                "/history" => {
                    let stats = manager.history().stats();
                    println!(
                        "\n{} message(s), {} append(s), ~{} tokens",
                        stats.total_messages, stats.run_counter, stats.estimated_tokens
                    );
                    print_messages(&manager.get_messages());
                    println!();
                }
                "/summary" => {
                    match manager
                        .summarize_history(DEFAULT_SUMMARY_INSTRUCTIONS, false)
                        .await
                    {
                        Ok(outcome) => print_summary("Summary", &outcome),
                        Err(e) => eprintln!("Error: {e}"),
                    }
                }
                text => match manager.process_turn(text).await {
                    Ok(result) => {
                        println!("\n{}\n", result.response);
                        for outcome in &result.summaries {
                            print_summary("Periodic summary", outcome);
                        }
                    }
                    Err(e) => eprintln!("Error: {e}"),
                },
            }
        }

        info!(
            "Conversation ended: {} total messages",
            manager.history().len()
        );
        Ok(())
    }
}

fn print_summary(label: &str, outcome: &SummaryOutcome) {
    if outcome.summary.is_empty() {
        println!("\n[{label}]: (nothing to summarize)\n");
    } else {
        println!("\n[{label}]:\n{}\n", outcome.summary);
    }
}
