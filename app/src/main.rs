#![deny(
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

mod command;

use clap::{Parser, Subcommand};
use command::{
    ChatInput, ChatStrategy, CommandStrategy, ExtractInput, ExtractStrategy, InitStrategy,
    SummarizeDemoStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Conversation summarization and user-info extraction over Groq", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Show version
    Version,
    /// Interactive conversation with periodic summarization
    Chat {
        /// Summarize after every k messages (overrides config; 0 disables)
        #[arg(short = 'k', long)]
        summarize_every: Option<i64>,
    },
    /// Replay the booking dialogue: periodic summary, truncations, final summary
    SummarizeDemo,
    /// Extract name, email, phone, location and age from chat text
    Extract {
        /// Chat texts to process (three sample chats when omitted)
        texts: Vec<String>,

        /// Persist each record to the SQLite database
        #[arg(short, long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
        Commands::Chat { summarize_every } => {
            ChatStrategy.execute(ChatInput { summarize_every }).await
        }
        Commands::SummarizeDemo => SummarizeDemoStrategy.execute(()).await,
        Commands::Extract { texts, save } => {
            ExtractStrategy.execute(ExtractInput { texts, save }).await
        }
    }
}
