use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use parley_conversation::ConversationConfig;
use parley_extraction::ExtractionConfig;
use parley_providers::{DEFAULT_BASE_URL, DEFAULT_MODEL, GroqProvider};
use tracing::{debug, info};

/// Environment variable consulted when the configured key is missing.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
/// Key written by `create_config`; treated as unset.
pub const API_KEY_PLACEHOLDER: &str = "your-groq-api-key-here";

const CONFIG_DIR: &str = "parley";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "conversations.db";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub groq: GroqConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GroqConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "GroqConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "GroqConfig::default_model")]
    pub model: String,
    #[serde(default = "GroqConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GroqConfig {
    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    const fn default_timeout_secs() -> u64 {
        60
    }

    /// True when the key is empty or still the template placeholder.
    #[must_use]
    pub fn key_is_unset(&self) -> bool {
        let key = self.api_key.trim();
        key.is_empty() || key == API_KEY_PLACEHOLDER
    }

    /// Replace an unset key with `env_key`, if one is given.
    pub fn apply_env_key(&mut self, env_key: Option<String>) {
        if !self.key_is_unset() {
            return;
        }
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            debug!("Using API key from {API_KEY_ENV}");
            self.api_key = key;
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DatabaseConfig {
    /// SQLite file for extracted records; `~/parley/conversations.db` when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join(CONFIG_FILE);

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'parley init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_json(&content)?;
        config
            .providers
            .groq
            .apply_env_key(std::env::var(API_KEY_ENV).ok());

        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Parse a config document without consulting the environment.
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build the chat-completions client described by `providers.groq`.
    pub fn build_provider(&self) -> anyhow::Result<GroqProvider> {
        let groq = &self.providers.groq;
        if groq.key_is_unset() {
            anyhow::bail!(
                "No Groq API key configured. Set providers.groq.api_key or {API_KEY_ENV}."
            );
        }

        Ok(GroqProvider::new(groq.api_key.clone())
            .with_base_url(groq.base_url.clone())
            .with_model(groq.model.clone())
            .with_timeout(Duration::from_secs(groq.timeout_secs))?)
    }

    /// Location of the record database.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::ensure_config_dir()?.join(DATABASE_FILE)),
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);
        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Groq API key (or export {API_KEY_ENV})");
        println!("   2. Run 'parley summarize-demo' or 'parley extract' to try the pipelines");
        println!("   3. Run 'parley chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - conversation.summarize_every: summarize after every k messages (0 disables)");
        println!("   - conversation.context_window: turns, chars or words kept per reply");
        println!("   - database.path: where 'parley extract --save' stores records");
        println!();
        Ok(())
    }

    /// Write the template to `config_path`, refusing to overwrite.
    pub fn write_template(config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(config_path, CONFIG_TEMPLATE)?;
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "providers": {
    "groq": {
      "api_key": "your-groq-api-key-here",
      "base_url": "https://api.groq.com/openai/v1",
      "model": "llama-3.1-8b-instant",
      "timeout_secs": 60
    }
  },
  "conversation": {
    "system_prompt": "You are a helpful AI assistant.",
    "summarize_every": 3,
    "summary_instructions": "Concise summary.",
    "replace_on_summary": true,
    "summary_max_tokens": 400,
    "temperature": 0.0,
    "reply_max_tokens": 512,
    "context_window": { "strategy": "turns", "limit": 20 }
  },
  "extraction": {
    "max_tokens": 200,
    "temperature": 0.0
  },
  "database": {
    "path": null
  }
}"#;
