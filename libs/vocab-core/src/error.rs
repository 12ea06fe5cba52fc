//! Error types for vocab-core.

use thiserror::Error;

use crate::types::{LearnerId, Partition, WordId};

/// Result type alias using DrillError.
pub type Result<T> = std::result::Result<T, DrillError>;

/// Errors raised by the word-lifecycle engine and its collaborators.
#[derive(Debug, Error)]
pub enum DrillError {
    /// The word is not in a partition the requested operation can move it from.
    #[error("word {word} not found in {expected} for learner {learner}")]
    NotFound {
        learner: LearnerId,
        word: WordId,
        expected: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A persistence or catalog collaborator could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The answer source was closed or failed to read.
    #[error("input error: {0}")]
    Input(String),

    #[error("session deadline exceeded")]
    DeadlineExceeded,
}

impl DrillError {
    /// `NotFound` naming the partitions the word was expected in.
    pub fn not_found(learner: LearnerId, word: WordId, expected: &[Partition]) -> Self {
        let expected = expected
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" or ");
        Self::NotFound {
            learner,
            word,
            expected,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
