//! Moderation audit log.
//!
//! Records are appended to a JSON-lines file and mirrored to `tracing`, so
//! an operator tailing the logs sees the same events the file keeps.

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::traits::AuditSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Alert,
    ImportantUpdate,
    ContentEdit,
}

/// A file attached to an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub content: String,
    pub extension: String,
}

impl Attachment {
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            extension: "md".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

#[derive(Serialize)]
struct AuditLine<'a> {
    at: String,
    #[serde(flatten)]
    record: &'a AuditRecord,
}

/// Append-only JSONL audit file.
pub struct JsonlAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditSink {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create audit dir: {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open audit log: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn log(&self, record: AuditRecord) -> Result<()> {
        tracing::info!(severity = ?record.severity, "audit: {}", record.message);

        let line = serde_json::to_string(&AuditLine {
            at: chrono::Utc::now().to_rfc3339(),
            record: &record,
        })?;

        let mut file = self.file.lock();
        writeln!(file, "{line}")
            .with_context(|| format!("Failed to write audit log: {}", self.path.display()))?;
        Ok(())
    }
}
