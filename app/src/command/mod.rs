//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is its own strategy type with its own input type, so
//! dispatch in `main` is monomorphized.

use std::sync::Arc;

use parley_config::Config;
use parley_core::{ChatMessage, LLMProvider};
use tracing::info;

mod chat;
mod demo;
mod extract;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use demo::SummarizeDemoStrategy;
pub use extract::{ExtractInput, ExtractStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Contract shared by all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Load the config file and build the shared provider from it.
fn load_config_and_provider() -> anyhow::Result<(Config, Arc<dyn LLMProvider>)> {
    let config = Config::load()?;
    let provider: Arc<dyn LLMProvider> = Arc::new(config.build_provider()?);
    info!("Using model {}", provider.get_default_model());
    Ok((config, provider))
}

fn print_messages(messages: &[ChatMessage]) {
    if messages.is_empty() {
        println!("  (empty)");
    }
    for message in messages {
        println!("  {}: {}", message.role, message.content);
    }
}
