//! PostgreSQL database operations

use chrono::{DateTime, Duration, Utc};
use sqlx::{postgres::PgPoolOptions, PgExecutor, PgPool};
use uuid::Uuid;
use vocab_core::{BatchLimit, Transition};

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Catalog column searched by a lookup
#[derive(Debug, Clone, Copy)]
pub enum TextColumn {
    Source,
    Target,
}

impl TextColumn {
    fn name(self) -> &'static str {
        match self {
            Self::Source => "source_text",
            Self::Target => "target_text",
        }
    }
}

fn parse_partition(raw: &str) -> Result<Partition> {
    Partition::from_str(raw)
        .ok_or_else(|| ApiError::Internal(format!("unknown partition in database: {raw}")))
}

/// Unique-constraint violations become `Conflict`; anything else stays a database error.
fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> ApiError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ApiError::Conflict(message())
        }
        _ => ApiError::Database(err),
    }
}

/// Issue a fresh bearer token for a learner.
async fn insert_credential<'e, E>(
    executor: E,
    learner_id: Uuid,
    ttl: Duration,
) -> Result<Credential>
where
    E: PgExecutor<'e>,
{
    let credential = sqlx::query_as::<_, Credential>(
        r#"
        INSERT INTO credentials (token, learner_id, expires_at)
        VALUES ($1, $2, $3)
        RETURNING token, learner_id, expires_at, revoked_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(learner_id)
    .bind(Utc::now() + ttl)
    .fetch_one(executor)
    .await?;

    Ok(credential)
}

/// Escape LIKE wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Learner Repository ===

    /// Register a learner, issue a token and assign every catalog word.
    ///
    /// `password_hash` is stored as given. Returns the learner, the credential
    /// and the number of words assigned. An email that is already registered
    /// is a `Conflict`, including when two registrations race.
    pub async fn create_learner(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        token_ttl: Duration,
    ) -> Result<(Learner, Credential, u64)> {
        let mut tx = self.pool.begin().await?;

        let learner = sqlx::query_as::<_, Learner>(
            r#"
            INSERT INTO learners (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("email {email} is already registered")))?;

        let credential = insert_credential(&mut *tx, learner.id, token_ttl).await?;

        let assigned = sqlx::query(
            r#"
            INSERT INTO learner_words (learner_id, word_id, partition)
            SELECT $1, id, 'assigned' FROM words
            ON CONFLICT (learner_id, word_id) DO NOTHING
            "#,
        )
        .bind(learner.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok((learner, credential, assigned))
    }

    /// Get learner by email
    pub async fn find_learner_by_email(&self, email: &str) -> Result<Option<Learner>> {
        let learner = sqlx::query_as::<_, Learner>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM learners
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(learner)
    }

    /// Issue another token for an existing learner. Earlier tokens stay valid.
    pub async fn issue_credential(
        &self,
        learner_id: Uuid,
        token_ttl: Duration,
    ) -> Result<Credential> {
        insert_credential(&self.pool, learner_id, token_ttl).await
    }

    /// Get credential by token, whether or not it is still active
    pub async fn get_credential(&self, token: &str) -> Result<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT token, learner_id, expires_at, revoked_at
            FROM credentials
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    /// Mark a token revoked. Returns false if it was already revoked or unknown.
    pub async fn revoke_credential(&self, token: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE credentials
            SET revoked_at = $2
            WHERE token = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Word Set Repository ===

    /// Up to `limit` words in one of the learner's partitions, ordered by word id
    pub async fn fetch_batch(
        &self,
        learner: LearnerId,
        partition: Partition,
        limit: BatchLimit,
    ) -> Result<Vec<Word>> {
        let rows = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT w.id, w.source_text, w.target_text, w.topic, w.part_of_speech
            FROM learner_words lw
            JOIN words w ON w.id = lw.word_id
            WHERE lw.learner_id = $1 AND lw.partition = $2
            ORDER BY w.id
            LIMIT $3
            "#,
        )
        .bind(learner.0)
        .bind(partition.as_str())
        .bind(i64::from(limit.get()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbWord::to_core_word).collect())
    }

    /// Move a word between partitions in one transaction.
    ///
    /// The row is locked while the move is checked, so concurrent transitions
    /// of the same word serialize and the loser sees the new partition.
    pub async fn apply_transition(
        &self,
        learner: LearnerId,
        word: WordId,
        transition: Transition,
    ) -> Result<Partition> {
        let mut tx = self.pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            r#"
            SELECT partition
            FROM learner_words
            WHERE learner_id = $1 AND word_id = $2
            FOR UPDATE
            "#,
        )
        .bind(learner.0)
        .bind(word.0)
        .fetch_optional(&mut *tx)
        .await?;

        let current = current.as_deref().map(parse_partition).transpose()?;
        let target = transition.apply(learner, word, current).map_err(|err| {
            tracing::warn!(learner = %learner, word = %word, "rejected transition: {}", err);
            err
        })?;

        sqlx::query(
            r#"
            UPDATE learner_words
            SET partition = $3, updated_at = NOW()
            WHERE learner_id = $1 AND word_id = $2
            "#,
        )
        .bind(learner.0)
        .bind(word.0)
        .bind(target.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            learner = %learner,
            word = %word,
            transition = transition.as_str(),
            partition = target.as_str(),
            "word moved"
        );
        Ok(target)
    }

    /// Partition a word currently occupies for the learner
    pub async fn partition_of(&self, learner: LearnerId, word: WordId) -> Result<Option<Partition>> {
        let current: Option<String> = sqlx::query_scalar(
            r#"
            SELECT partition
            FROM learner_words
            WHERE learner_id = $1 AND word_id = $2
            "#,
        )
        .bind(learner.0)
        .bind(word.0)
        .fetch_optional(&self.pool)
        .await?;

        current.as_deref().map(parse_partition).transpose()
    }

    // === Catalog Repository ===

    /// Case-insensitive exact match on one column, falling back to a substring match
    pub async fn find_by_text(&self, column: TextColumn, text: &str) -> Result<Vec<Word>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let exact = sqlx::query_as::<_, DbWord>(&format!(
            r#"
            SELECT id, source_text, target_text, topic, part_of_speech
            FROM words
            WHERE LOWER({col}) = LOWER($1)
            ORDER BY id
            "#,
            col = column.name()
        ))
        .bind(text)
        .fetch_all(&self.pool)
        .await?;

        if !exact.is_empty() {
            return Ok(exact.iter().map(DbWord::to_core_word).collect());
        }

        let partial = sqlx::query_as::<_, DbWord>(&format!(
            r#"
            SELECT id, source_text, target_text, topic, part_of_speech
            FROM words
            WHERE {col} ILIKE '%' || $1 || '%'
            ORDER BY id
            "#,
            col = column.name()
        ))
        .bind(escape_like(text))
        .fetch_all(&self.pool)
        .await?;

        Ok(partial.iter().map(DbWord::to_core_word).collect())
    }

    /// Insert words into the catalog, skipping pairs that already exist.
    ///
    /// Returns the number of rows inserted.
    pub async fn insert_words(&self, words: &[NewWord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for word in words {
            inserted += sqlx::query(
                r#"
                INSERT INTO words (id, source_text, target_text, topic, part_of_speech)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (source_text, target_text) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(word.source.trim())
            .bind(word.target.trim())
            .bind(&word.topic)
            .bind(&word.part_of_speech)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
