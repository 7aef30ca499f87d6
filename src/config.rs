//! Configuration loaded from `~/.echoclaw/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::EngineOptions;

// ── Identity ────────────────────────────────────────────────────

/// Default config directory name under `$HOME`.
pub const APP_DIR_NAME: &str = ".echoclaw";

pub const CONFIG_FILE_NAME: &str = "config.toml";

// ── Sections ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EchoConfig {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BotConfig {
    /// Platform user id of the bot.
    #[serde(default)]
    pub id: String,
    /// Display name; the feature is called "<name> Chat".
    #[serde(default = "default_bot_name")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Holds `corpus.db`, `settings.db` and `audit.jsonl`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ReviewConfig {
    /// Channel the review thread lives under. Unset disables replies.
    #[serde(default)]
    pub parent_channel: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LearningConfig {
    /// Channels tracked for the implicit previous-message prompt.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// How long a previous message stays eligible as a prompt.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: default_bot_name(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "Echo".to_string()
}

fn default_data_dir() -> String {
    format!("~/{APP_DIR_NAME}")
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `~/.echoclaw/config.toml`, or a relative fallback when there is no home.
pub fn default_config_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME))
        .join(CONFIG_FILE_NAME)
}

impl EchoConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path);
        let content = fs::read_to_string(expanded_path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let mut config: EchoConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;

        // Environment fallback for the bot id
        if config.bot.id.is_empty() {
            if let Ok(id) = std::env::var("ECHOCLAW_BOT_ID") {
                config.bot.id = id;
            }
        }

        Ok(config)
    }

    /// Load `path` if given, else the default location if it exists, else
    /// built-in defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        let default_path = default_config_path();
        if default_path.exists() {
            return Self::load_from_file(&default_path.to_string_lossy());
        }

        let mut config = Self::default();
        if let Ok(id) = std::env::var("ECHOCLAW_BOT_ID") {
            config.bot.id = id;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot.id.trim().is_empty() {
            anyhow::bail!("bot.id must be set (or ECHOCLAW_BOT_ID)");
        }

        if self.bot.name.trim().is_empty() {
            anyhow::bail!("bot.name must not be empty");
        }

        if self.learning.cache_capacity == 0 {
            anyhow::bail!("learning.cache_capacity must be greater than zero");
        }

        if let Some(parent) = &self.review.parent_channel {
            if parent.trim().is_empty() {
                anyhow::bail!("review.parent_channel must not be empty when set");
            }
        }

        Ok(())
    }

    pub fn expand_paths(&mut self) -> Result<()> {
        self.storage.data_dir = shellexpand::tilde(&self.storage.data_dir).to_string();
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    pub fn corpus_db_path(&self) -> PathBuf {
        self.data_dir().join("corpus.db")
    }

    pub fn settings_db_path(&self) -> PathBuf {
        self.data_dir().join("settings.db")
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.data_dir().join("audit.jsonl")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.learning.cache_ttl_secs)
    }

    /// Engine settings from the `[bot]` and `[learning]` sections.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            bot_name: self.bot.name.clone(),
            cache_capacity: self.learning.cache_capacity,
            cache_ttl: self.cache_ttl(),
            seed: None,
        }
    }

    /// Channel the review thread is created under; pass to
    /// `ChatEngine::bootstrap_review`.
    pub fn review_parent(&self) -> Option<&str> {
        self.review.parent_channel.as_deref()
    }
}
