//! Batch extraction of user info from chat text.

use parley_extraction::ExtractionPipeline;
use parley_storage::SqliteRecordStore;
use tracing::info;

use super::load_config_and_provider;

const SAMPLE_CHATS: [&str; 3] = [
    "Hello, my name is Saket Jadhav. My email is saketjadhav25@gmail.com, phone +91 7020328045. I'm 25 from Pune.",
    "Hey, I'm Rohit. rohit_patel123@gmail.com. I moved to Bangalore. Call me at 9876543210.",
    "This is Priya. Age: 31. Email: priya@example.co.in. Location: Chennai.",
];

#[derive(Debug, Clone)]
pub struct ExtractInput {
    /// Chat texts to process; the sample chats when empty
    pub texts: Vec<String>,
    /// Persist each record
    pub save: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractStrategy;

impl super::CommandStrategy for ExtractStrategy {
    type Input = ExtractInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let (config, provider) = load_config_and_provider()?;
        let pipeline = ExtractionPipeline::new(provider, config.extraction.clone());

        let store = if input.save {
            let db_path = config.database_path()?;
            info!("Database path: {}", db_path.display());
            Some(SqliteRecordStore::open(&db_path).await?)
        } else {
            None
        };

        let texts = if input.texts.is_empty() {
            SAMPLE_CHATS.iter().map(ToString::to_string).collect()
        } else {
            input.texts
        };

        for (i, text) in texts.iter().enumerate() {
            println!("\n=== Chat {} ===", i + 1);

            let (outcome, id) = match &store {
                Some(store) => {
                    let (outcome, id) = pipeline.extract_and_store(text, store).await?;
                    (outcome, Some(id))
                }
                None => (pipeline.extract_with_retry(text).await?, None),
            };

            println!("Extracted: {}", serde_json::to_string(&outcome.record)?);
            println!("Errors: {:?}", outcome.error_tags());
            if outcome.retried() {
                println!("(age retry used)");
            }
            if let Some(id) = id {
                println!("Saved as row {id}");
            }
        }

        if let Some(store) = &store {
            println!(
                "\nData saved to {} (table: users, {} row(s))",
                config.database_path()?.display(),
                store.all().await?.len()
            );
        }

        Ok(())
    }
}
