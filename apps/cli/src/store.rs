//! Local SQLite word set and catalog for offline drilling.

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use uuid::Uuid;
use vocab_core::{
    BatchLimit, Catalog, LearnerId, Partition, Transition, Word, WordId, WordSet,
};

use crate::error::{ClientError, Result};

/// Complete schema for the local database.
const SCHEMA: &str = r#"
-- Vocabulary catalog
CREATE TABLE IF NOT EXISTS words (
    id TEXT PRIMARY KEY,
    source_text TEXT NOT NULL,
    target_text TEXT NOT NULL,
    topic TEXT NOT NULL DEFAULT '',
    part_of_speech TEXT NOT NULL DEFAULT '',
    UNIQUE (source_text, target_text)
);

-- The single local learner
CREATE TABLE IF NOT EXISTS local_learner (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    learner_id TEXT NOT NULL
);

-- One row per (learner, word): a word sits in exactly one partition
CREATE TABLE IF NOT EXISTS learner_words (
    learner_id TEXT NOT NULL,
    word_id TEXT NOT NULL REFERENCES words(id),
    partition TEXT NOT NULL DEFAULT 'assigned'
        CHECK (partition IN ('assigned', 'in_review', 'mastered')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (learner_id, word_id)
);
"#;

/// Word entry in an import file.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportWord {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub part_of_speech: String,
}

pub struct SqliteStore {
    conn: Connection,
    learner: LearnerId,
}

fn parse_uuid(raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_partition(raw: &str) -> Result<Partition> {
    Partition::from_str(raw)
        .ok_or_else(|| ClientError::Parse(format!("unknown partition in database: {raw}")))
}

impl SqliteStore {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        let existing: Option<String> = conn
            .query_row("SELECT learner_id FROM local_learner WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let learner = match existing {
            Some(raw) => LearnerId(parse_uuid(&raw)?),
            None => {
                let learner = LearnerId::new_v4();
                conn.execute(
                    "INSERT INTO local_learner (id, learner_id) VALUES (1, ?1)",
                    params![learner.to_string()],
                )?;
                learner
            }
        };

        Ok(Self { conn, learner })
    }

    /// The learner every local session drills as.
    pub fn learner(&self) -> LearnerId {
        self.learner
    }

    /// Add words to the catalog and assign any new ones to the local learner.
    ///
    /// Pairs already in the catalog are skipped. Returns the number inserted.
    pub fn import_words(&self, words: &[ImportWord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;

        for word in words {
            let source = word.source.trim();
            let target = word.target.trim();
            if source.is_empty() || target.is_empty() {
                tracing::warn!(source, target, "skipping incomplete word");
                continue;
            }
            inserted += tx.execute(
                "INSERT OR IGNORE INTO words (id, source_text, target_text, topic, part_of_speech) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    source,
                    target,
                    word.topic,
                    word.part_of_speech
                ],
            )?;
        }

        tx.execute(
            "INSERT OR IGNORE INTO learner_words (learner_id, word_id, partition) SELECT ?1, id, 'assigned' FROM words",
            params![self.learner.to_string()],
        )?;
        tx.commit()?;

        tracing::info!(inserted, "imported words");
        Ok(inserted)
    }

    /// Import a JSON array of words from a file.
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let raw = fs::read_to_string(path)?;
        let words: Vec<ImportWord> = serde_json::from_str(&raw)?;
        self.import_words(&words)
    }

    /// Number of words the learner holds in a partition.
    pub fn count(&self, partition: Partition) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM learner_words WHERE learner_id = ?1 AND partition = ?2",
            params![self.learner.to_string(), partition.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn row_to_word(row: &rusqlite::Row) -> rusqlite::Result<Word> {
        let id: String = row.get(0)?;
        Ok(Word {
            id: WordId(parse_uuid(&id)?),
            source: row.get(1)?,
            target: row.get(2)?,
            topic: row.get(3)?,
            part_of_speech: row.get(4)?,
        })
    }

    fn apply_transition(
        &self,
        learner: LearnerId,
        word: WordId,
        transition: Transition,
    ) -> Result<Partition> {
        let tx = self.conn.unchecked_transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT partition FROM learner_words WHERE learner_id = ?1 AND word_id = ?2",
                params![learner.to_string(), word.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let current = current.as_deref().map(parse_partition).transpose()?;
        let target = transition.apply(learner, word, current)?;

        tx.execute(
            "UPDATE learner_words SET partition = ?3, updated_at = datetime('now') WHERE learner_id = ?1 AND word_id = ?2",
            params![learner.to_string(), word.to_string(), target.as_str()],
        )?;
        tx.commit()?;

        Ok(target)
    }

    fn batch(&self, learner: LearnerId, partition: Partition, limit: BatchLimit) -> Result<Vec<Word>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.id, w.source_text, w.target_text, w.topic, w.part_of_speech
             FROM learner_words lw
             JOIN words w ON w.id = lw.word_id
             WHERE lw.learner_id = ?1 AND lw.partition = ?2
             ORDER BY w.rowid
             LIMIT ?3",
        )?;
        let words = stmt
            .query_map(
                params![learner.to_string(), partition.as_str(), i64::from(limit.get())],
                Self::row_to_word,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(words)
    }

    fn current_partition(&self, learner: LearnerId, word: WordId) -> Result<Option<Partition>> {
        let current: Option<String> = self
            .conn
            .query_row(
                "SELECT partition FROM learner_words WHERE learner_id = ?1 AND word_id = ?2",
                params![learner.to_string(), word.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        current.as_deref().map(parse_partition).transpose()
    }

    /// Case-insensitive exact match, falling back to a substring match.
    ///
    /// SQLite's `lower()` only folds ASCII, so matching happens here.
    fn find_by(&self, text: &str, side: fn(&Word) -> &str) -> Result<Vec<Word>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, source_text, target_text, topic, part_of_speech FROM words ORDER BY rowid",
        )?;
        let words = stmt
            .query_map([], Self::row_to_word)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let exact: Vec<Word> = words
            .iter()
            .filter(|w| side(w).to_lowercase() == needle)
            .cloned()
            .collect();
        if !exact.is_empty() {
            return Ok(exact);
        }

        Ok(words
            .into_iter()
            .filter(|w| side(w).to_lowercase().contains(&needle))
            .collect())
    }
}

impl WordSet for SqliteStore {
    fn transition(
        &self,
        learner: LearnerId,
        word: WordId,
        transition: Transition,
    ) -> vocab_core::Result<Partition> {
        Ok(self.apply_transition(learner, word, transition)?)
    }

    fn fetch_batch(
        &self,
        learner: LearnerId,
        partition: Partition,
        limit: BatchLimit,
    ) -> vocab_core::Result<Vec<Word>> {
        Ok(self.batch(learner, partition, limit)?)
    }

    fn partition_of(
        &self,
        learner: LearnerId,
        word: WordId,
    ) -> vocab_core::Result<Option<Partition>> {
        Ok(self.current_partition(learner, word)?)
    }
}

impl Catalog for SqliteStore {
    fn find_by_source_text(&self, text: &str) -> vocab_core::Result<Vec<Word>> {
        Ok(self.find_by(text, |w| &w.source)?)
    }

    fn find_by_target_text(&self, text: &str) -> vocab_core::Result<Vec<Word>> {
        Ok(self.find_by(text, |w| &w.target)?)
    }
}
