//! Partition transition rules and the persistence seam that applies them.
//!
//! A learner's word occupies exactly one [`Partition`]. Words only move
//! through the three [`Transition`]s below; every [`WordSet`]
//! implementation checks the current partition with [`Transition::apply`]
//! and writes the returned target in the same atomic step.

use serde::{Deserialize, Serialize};

use crate::error::{DrillError, Result};
use crate::types::{BatchLimit, LearnerId, Partition, Word, WordId};

/// A move between partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Correct Test answer: `Assigned | InReview -> Mastered`.
    Promote,
    /// Missed Test answer: `Assigned -> InReview`.
    Escalate,
    /// Correct Learn answer: `InReview -> Mastered`.
    Retire,
}

impl Transition {
    pub const ALL: [Transition; 3] = [Self::Promote, Self::Escalate, Self::Retire];

    /// Partitions the word may be moved out of.
    pub fn sources(self) -> &'static [Partition] {
        match self {
            Self::Promote => &[Partition::Assigned, Partition::InReview],
            Self::Escalate => &[Partition::Assigned],
            Self::Retire => &[Partition::InReview],
        }
    }

    pub fn target(self) -> Partition {
        match self {
            Self::Promote | Self::Retire => Partition::Mastered,
            Self::Escalate => Partition::InReview,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promote => "promote",
            Self::Escalate => "escalate",
            Self::Retire => "retire",
        }
    }

    /// Check the word's current partition and return the partition it moves to.
    ///
    /// `current` is `None` when the learner has no entry for the word.
    pub fn apply(
        self,
        learner: LearnerId,
        word: WordId,
        current: Option<Partition>,
    ) -> Result<Partition> {
        match current {
            Some(partition) if self.sources().contains(&partition) => Ok(self.target()),
            _ => Err(DrillError::not_found(learner, word, self.sources())),
        }
    }
}

/// Durable store of a learner's word partitions.
///
/// `transition` must be atomic for one (learner, word) pair: either the word
/// leaves its source partition and lands in the target, or nothing changes.
pub trait WordSet {
    /// Apply a transition and return the partition the word now occupies.
    fn transition(&self, learner: LearnerId, word: WordId, transition: Transition)
        -> Result<Partition>;

    /// Up to `limit` words from a partition, in a stable order for a fixed snapshot.
    fn fetch_batch(
        &self,
        learner: LearnerId,
        partition: Partition,
        limit: BatchLimit,
    ) -> Result<Vec<Word>>;

    /// Current partition of a word, `None` if the learner has no entry for it.
    fn partition_of(&self, learner: LearnerId, word: WordId) -> Result<Option<Partition>>;

    fn promote_to_mastered(&self, learner: LearnerId, word: WordId) -> Result<()> {
        self.transition(learner, word, Transition::Promote).map(|_| ())
    }

    /// Removes the word from `Assigned` before it lands in `InReview`.
    fn escalate_to_review(&self, learner: LearnerId, word: WordId) -> Result<()> {
        self.transition(learner, word, Transition::Escalate).map(|_| ())
    }

    /// Removes the word from `InReview` and files it under `Mastered`.
    fn retire_from_review(&self, learner: LearnerId, word: WordId) -> Result<()> {
        self.transition(learner, word, Transition::Retire).map(|_| ())
    }
}

impl<T: WordSet + ?Sized> WordSet for &T {
    fn transition(
        &self,
        learner: LearnerId,
        word: WordId,
        transition: Transition,
    ) -> Result<Partition> {
        (**self).transition(learner, word, transition)
    }

    fn fetch_batch(
        &self,
        learner: LearnerId,
        partition: Partition,
        limit: BatchLimit,
    ) -> Result<Vec<Word>> {
        (**self).fetch_batch(learner, partition, limit)
    }

    fn partition_of(&self, learner: LearnerId, word: WordId) -> Result<Option<Partition>> {
        (**self).partition_of(learner, word)
    }
}
