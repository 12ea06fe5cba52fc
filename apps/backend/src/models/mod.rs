//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from vocab-core
pub use vocab_core::types::{LearnerId, Partition, Word, WordId};

// === Database Entity Types ===

/// Catalog word stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWord {
    pub id: Uuid,
    pub source_text: String,
    pub target_text: String,
    pub topic: String,
    pub part_of_speech: String,
}

impl DbWord {
    /// Convert to the shared word type
    pub fn to_core_word(&self) -> Word {
        Word {
            id: WordId(self.id),
            source: self.source_text.clone(),
            target: self.target_text.clone(),
            topic: self.topic.clone(),
            part_of_speech: self.part_of_speech.clone(),
        }
    }
}

/// Registered learner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Learner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Bearer credential issued to a learner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub token: String,
    pub learner_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Usable at `now`: not revoked and not yet expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Word to be inserted into the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWord {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub part_of_speech: String,
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub learner_id: LearnerId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Words placed in `assigned` for the new learner.
    pub assigned: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub learner_id: LearnerId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchQuery {
    pub partition: Partition,
    pub limit: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub words: Vec<Word>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub word_id: WordId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PartitionResponse {
    pub word_id: WordId,
    pub partition: Option<Partition>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextQuery {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationsResponse {
    pub words: Vec<Word>,
}
