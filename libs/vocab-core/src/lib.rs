//! Core vocabulary drilling library shared by the backend and the console client.
//!
//! Provides:
//! - Answer grading with tolerance for one spelling mistake
//! - Word partition rules (Assigned, InReview, Mastered) and the `WordSet` seam
//! - Drill rounds (Test and Learn) and the session orchestrator
//! - Collaborator traits for the catalog and the console, with in-memory implementations

pub mod catalog;
pub mod console;
pub mod drill;
pub mod error;
pub mod matching;
pub mod memory;
pub mod session;
pub mod types;
pub mod word_set;

pub use catalog::{lookup, Catalog};
pub use console::{Console, Notice};
pub use drill::{DrillQueue, RoundReport, RoundState};
pub use error::{DrillError, Result};
pub use matching::{edit_distance, grade, matches_exactly, normalize, Verdict};
pub use memory::{MemoryCatalog, MemoryWordSet};
pub use session::{SessionConfig, SessionOrchestrator};
pub use types::{
    BatchLimit, Direction, DrillMode, LearnerId, Partition, RoundTally, SessionMode,
    SessionSummary, Word, WordId,
};
pub use word_set::{Transition, WordSet};
