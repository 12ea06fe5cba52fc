//! Core types for the vocabulary drilling engine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DrillError, Result};

/// Opaque identifier of a catalog word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(pub Uuid);

/// Opaque identifier of a learner account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearnerId(pub Uuid);

macro_rules! uuid_id {
    ($name:ident, $label:literal) => {
        impl $name {
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse from a string, rejecting malformed identifiers.
            pub fn parse(s: &str) -> Result<Self> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| DrillError::InvalidInput(format!("malformed {} '{}': {}", $label, s, e)))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(WordId, "word id");
uuid_id!(LearnerId, "learner id");

/// A catalog word. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub source: String,
    pub target: String,
    pub topic: String,
    pub part_of_speech: String,
}

/// The partition a learner's word currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Assigned,
    InReview,
    Mastered,
}

impl Default for Partition {
    fn default() -> Self {
        Self::Assigned
    }
}

impl Partition {
    pub const ALL: [Partition; 3] = [Self::Assigned, Self::InReview, Self::Mastered];

    /// Get the partition name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::InReview => "in_review",
            Self::Mastered => "mastered",
        }
    }

    /// Parse from the stored name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "assigned" => Some(Self::Assigned),
            "in_review" => Some(Self::InReview),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drill round mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillMode {
    /// One-shot recall over `Assigned` words.
    Test,
    /// Retention drill over `InReview` words.
    Learn,
}

impl DrillMode {
    /// Partition a round in this mode is fetched from.
    pub fn source_partition(self) -> Partition {
        match self {
            Self::Test => Partition::Assigned,
            Self::Learn => Partition::InReview,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Learn => "learn",
        }
    }
}

/// Top-level session mode selected by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Test,
    Learn,
    Lookup,
}

impl SessionMode {
    /// Drill mode for the drilling session modes, `None` for lookup.
    pub fn drill_mode(self) -> Option<DrillMode> {
        match self {
            Self::Test => Some(DrillMode::Test),
            Self::Learn => Some(DrillMode::Learn),
            Self::Lookup => None,
        }
    }
}

/// Which side of a word is shown and which side is expected back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    SourceToTarget,
    TargetToSource,
}

impl Default for Direction {
    fn default() -> Self {
        Self::SourceToTarget
    }
}

impl Direction {
    pub fn prompt<'a>(&self, word: &'a Word) -> &'a str {
        match self {
            Self::SourceToTarget => &word.source,
            Self::TargetToSource => &word.target,
        }
    }

    pub fn expected<'a>(&self, word: &'a Word) -> &'a str {
        match self {
            Self::SourceToTarget => &word.target,
            Self::TargetToSource => &word.source,
        }
    }
}

/// Validated, strictly positive batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BatchLimit(u32);

impl BatchLimit {
    pub fn new(limit: i64) -> Result<Self> {
        if limit <= 0 {
            return Err(DrillError::InvalidInput(format!(
                "batch limit must be positive, got {limit}"
            )));
        }
        u32::try_from(limit)
            .map(Self)
            .map_err(|_| DrillError::InvalidInput(format!("batch limit {limit} is too large")))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Per-round answer counts. Only tracked for Test rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundTally {
    /// Answered correctly on the first try (exact or close enough).
    pub correct: usize,
    /// Subset of `correct` accepted with a spelling mistake.
    pub spelling_mistakes: usize,
    /// Missed, corrected, and escalated to review.
    pub escalated: usize,
}

/// Result of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub mode: DrillMode,
    pub elapsed: Duration,
    /// Words in the fetched batch.
    pub drilled: usize,
    /// Prompts shown, requeued presentations included.
    pub presentations: usize,
    /// Items dropped because their transition found them in an unexpected partition.
    pub skipped: usize,
    pub tally: Option<RoundTally>,
}

impl SessionSummary {
    /// Summary of a round that found nothing to drill.
    pub fn empty(mode: DrillMode) -> Self {
        Self {
            mode,
            elapsed: Duration::ZERO,
            drilled: 0,
            presentations: 0,
            skipped: 0,
            tally: match mode {
                DrillMode::Test => Some(RoundTally::default()),
                DrillMode::Learn => None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.drilled == 0
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed.as_secs();
        write!(f, "Time: {} minutes {} seconds", secs / 60, secs % 60)?;
        if let Some(tally) = &self.tally {
            write!(f, "\nRight: {} Wrong: {}", tally.correct, tally.escalated)?;
            if tally.spelling_mistakes > 0 {
                write!(f, " (spelling mistakes: {})", tally.spelling_mistakes)?;
            }
        }
        if self.skipped > 0 {
            write!(f, "\nSkipped: {}", self.skipped)?;
        }
        Ok(())
    }
}
