//! Administrative subcommands.
//!
//! Provides `echoclaw ask`, `teach`, `import`, `export`, `redact`,
//! `consent`, `stats` and `check`, all operating on the configured data
//! directory without a live chat connection.

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use echo_core::normalize;
use echo_corpus::{CorpusEntry, SqliteCorpusStore};

use crate::audit::JsonlAuditSink;
use crate::config::EchoConfig;
use crate::consent::{self, SqliteSettings};
use crate::error::ChatError;
use crate::message::{ChannelKind, ChannelRef, ChatMessage};
use crate::redactor::Redactor;
use crate::responder;
use crate::review::chat_name;
use crate::traits::SettingsStore;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a prompt through the match cascade and print the reply
    Ask {
        /// Prompt text
        text: String,
        /// User id the reply is addressed to
        #[arg(long = "as", default_value = "1")]
        as_user: String,
    },
    /// Add a pair to the corpus
    Teach {
        /// Prompt (normalized before storing)
        prompt: String,
        /// Response in stored form (`<@0>` = bot, `<@user>` = asker)
        response: String,
    },
    /// Import pairs from a JSON array of `{"prompt", "response"}` objects
    Import {
        /// JSON file to read
        file: PathBuf,
    },
    /// Export every stored pair as a JSON array
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Permanently remove a stored response
    Redact {
        /// Response in stored form
        response: String,
        /// Any non-empty text; redaction is irreversible
        #[arg(long)]
        confirm: String,
        /// User id recorded as the moderator (defaults to the bot)
        #[arg(long)]
        by: Option<String>,
    },
    /// Show or change a user's chat learning consent
    Consent {
        /// User id
        user: String,
        #[arg(value_enum, default_value_t = ConsentAction::Show)]
        action: ConsentAction,
    },
    /// Count stored pairs and redacted responses
    Stats,
    /// Validate the configuration and show resolved paths
    Check,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConsentAction {
    Allow,
    Deny,
    Show,
}

fn open_store(config: &EchoConfig) -> Result<SqliteCorpusStore> {
    let dir = config.data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data dir: {}", dir.display()))?;
    let path = config.corpus_db_path();
    SqliteCorpusStore::open(&path)
        .with_context(|| format!("Failed to open corpus DB: {}", path.display()))
}

fn open_settings(config: &EchoConfig) -> Result<SqliteSettings> {
    let dir = config.data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data dir: {}", dir.display()))?;
    SqliteSettings::open(&config.settings_db_path())
}

pub async fn handle_command(cmd: Commands, config: &EchoConfig) -> Result<()> {
    match cmd {
        Commands::Ask { text, as_user } => {
            let corpus = open_store(config)?.load_corpus()?;
            let message = ChatMessage {
                id: "cli".to_string(),
                channel: ChannelRef::new("cli", ChannelKind::Text),
                author_id: as_user,
                content: text,
                mentions: vec![],
                reply_to: None,
                is_interaction: false,
            };
            let mut rng = rand::thread_rng();
            match responder::respond(&corpus, &message, &config.bot.id, &mut rng) {
                Some(reply) => println!("{reply}"),
                None => println!("(no reply)"),
            }
        }

        Commands::Teach { prompt, response } => {
            match teach(&open_store(config)?, &config.bot.id, &prompt, &response)? {
                Some(entry) => println!("Stored: {:?} -> {:?}", entry.prompt, entry.response),
                None => println!("Not stored: response is empty or was redacted"),
            }
        }

        Commands::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let entries: Vec<CorpusEntry> =
                serde_json::from_str(&content).with_context(|| "Failed to parse corpus JSON")?;
            let (imported, skipped) = import(&open_store(config)?, entries)?;
            println!("Imported {imported} pairs ({skipped} skipped)");
        }

        Commands::Export { output } => {
            let entries = open_store(config)?.load_all()?;
            let json = serde_json::to_string_pretty(&entries)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported {} pairs to {}", entries.len(), path.display());
                }
                None => println!("{json}"),
            }
        }

        Commands::Redact {
            response,
            confirm,
            by,
        } => {
            if confirm.trim().is_empty() {
                return Err(ChatError::Unconfirmed.into());
            }
            let store = Arc::new(open_store(config)?);
            let audit = Arc::new(JsonlAuditSink::open(&config.audit_log_path())?);
            let corpus = RwLock::new(store.load_corpus()?);
            let redactor = Redactor::new(store, audit, chat_name(&config.bot.name));

            let invoker = by.unwrap_or_else(|| config.bot.id.clone());
            let outcome = redactor
                .redact_response(&corpus, &response, &invoker)
                .await?;
            println!("{}", outcome.reply_text());
        }

        Commands::Consent { user, action } => {
            let settings = open_settings(config)?;
            match action {
                ConsentAction::Show => {
                    let allowed = settings.consent(&user).await?;
                    println!(
                        "{user}: {}",
                        if allowed { "messages stored" } else { "messages not stored" }
                    );
                }
                ConsentAction::Allow => {
                    let change = consent::allow(&settings, &user).await?;
                    println!("{}", change.reply_text(&user));
                }
                ConsentAction::Deny => {
                    let change = consent::deny(&settings, &user).await?;
                    println!("{}", change.reply_text(&user));
                }
            }
        }

        Commands::Stats => {
            let store = open_store(config)?;
            println!("Pairs:              {}", store.count()?);
            println!("Redacted responses: {}", store.exclusion_count()?);
        }

        Commands::Check => {
            config.validate()?;
            println!("Configuration OK");
            println!("Bot:       {} ({})", config.bot.name, config.bot.id);
            println!("Corpus:    {}", config.corpus_db_path().display());
            println!("Settings:  {}", config.settings_db_path().display());
            println!("Audit log: {}", config.audit_log_path().display());
            match &config.review.parent_channel {
                Some(parent) => println!("Review:    thread under channel {parent}"),
                None => println!("Review:    disabled (no parent channel)"),
            }
        }
    }

    Ok(())
}

/// Administrative seeding of one pair. `None` if the response is empty or
/// redacted.
pub fn teach(
    store: &SqliteCorpusStore,
    bot_id: &str,
    prompt: &str,
    response: &str,
) -> Result<Option<CorpusEntry>> {
    if response.trim().is_empty() || store.load_exclusions()?.contains(response) {
        return Ok(None);
    }
    let entry = CorpusEntry::new(normalize(prompt, &[bot_id]), response);
    store.append(&entry)?;
    Ok(Some(entry))
}

/// Bulk seeding. Returns `(imported, skipped)`.
pub fn import(store: &SqliteCorpusStore, entries: Vec<CorpusEntry>) -> Result<(usize, usize)> {
    let excluded = store.load_exclusions()?;
    let total = entries.len();
    let keep: Vec<CorpusEntry> = entries
        .into_iter()
        .filter(|e| !e.response.is_empty() && !excluded.contains(&e.response))
        .collect();
    let imported = store.append_batch(&keep)?;
    Ok((imported, total - imported))
}
