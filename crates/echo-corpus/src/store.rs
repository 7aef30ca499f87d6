//! Durable corpus storage in SQLite.
//!
//! Pairs live in `chats`; redacted responses live in `removed_responses`
//! so the exclusion set survives restarts. The connection sits behind a
//! `parking_lot::Mutex` and is never held across an `.await`.

use crate::corpus::Corpus;
use crate::types::{CorpusEntry, ExclusionSet};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Result as SqlResult};
use std::path::Path;

/// SQLite-backed durable store for corpus entries.
pub struct SqliteCorpusStore {
    conn: Mutex<Connection>,
}

impl SqliteCorpusStore {
    /// Open or create a corpus database.
    pub fn open(path: &Path) -> SqlResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prompt TEXT NOT NULL DEFAULT '',
                response TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (unixepoch())
            );
            CREATE INDEX IF NOT EXISTS idx_chats_response ON chats(response);

            CREATE TABLE IF NOT EXISTS removed_responses (
                response TEXT PRIMARY KEY,
                removed_at INTEGER NOT NULL DEFAULT (unixepoch())
            );",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> SqlResult<Self> {
        Self::open(Path::new(":memory:"))
    }

    /// Append one pair.
    pub fn append(&self, entry: &CorpusEntry) -> SqlResult<()> {
        self.conn.lock().execute(
            "INSERT INTO chats (prompt, response) VALUES (?1, ?2)",
            params![entry.prompt, entry.response],
        )?;
        Ok(())
    }

    /// Append many pairs in one transaction (administrative seeding).
    pub fn append_batch(&self, entries: &[CorpusEntry]) -> SqlResult<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO chats (prompt, response) VALUES (?1, ?2)")?;
            for entry in entries {
                stmt.execute(params![entry.prompt, entry.response])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    /// Delete every pair whose response matches exactly. Returns the number deleted.
    pub fn delete_by_response(&self, response: &str) -> SqlResult<usize> {
        self.conn
            .lock()
            .execute("DELETE FROM chats WHERE response = ?1", params![response])
    }

    /// Number of pairs with exactly this response.
    pub fn count_by_response(&self, response: &str) -> SqlResult<usize> {
        self.conn.lock().query_row(
            "SELECT COUNT(*) FROM chats WHERE response = ?1",
            params![response],
            |row| row.get::<_, usize>(0),
        )
    }

    /// All pairs with a non-empty response, in insertion order.
    pub fn load_all(&self) -> SqlResult<Vec<CorpusEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT prompt, response FROM chats WHERE response != '' ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CorpusEntry {
                prompt: row.get(0)?,
                response: row.get(1)?,
            })
        })?;
        rows.collect()
    }

    /// Durably bar a response from future matching and learning.
    pub fn record_exclusion(&self, response: &str) -> SqlResult<()> {
        self.conn.lock().execute(
            "INSERT OR IGNORE INTO removed_responses (response) VALUES (?1)",
            params![response],
        )?;
        Ok(())
    }

    pub fn load_exclusions(&self) -> SqlResult<ExclusionSet> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT response FROM removed_responses")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect()
    }

    /// Hydrate the in-memory working copy.
    pub fn load_corpus(&self) -> SqlResult<Corpus> {
        let excluded = self.load_exclusions()?;
        let entries = self.load_all()?;
        let stored = entries.len();
        let corpus = Corpus::from_parts(entries, excluded);
        tracing::debug!(
            stored,
            skipped = stored - corpus.len(),
            "Hydrated corpus from SQLite"
        );
        Ok(corpus)
    }

    /// Count total pairs.
    pub fn count(&self) -> SqlResult<usize> {
        self.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM chats", [], |row| row.get::<_, usize>(0))
    }

    /// Count durably excluded responses.
    pub fn exclusion_count(&self) -> SqlResult<usize> {
        self.conn.lock().query_row(
            "SELECT COUNT(*) FROM removed_responses",
            [],
            |row| row.get::<_, usize>(0),
        )
    }
}
