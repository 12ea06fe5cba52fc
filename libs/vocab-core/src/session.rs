//! Session orchestration: pick a mode, fetch a batch, run the round, report.

use std::time::Instant;

use crate::catalog::{self, Catalog};
use crate::console::{Console, Notice};
use crate::drill::DrillQueue;
use crate::error::{DrillError, Result};
use crate::types::{
    BatchLimit, Direction, DrillMode, LearnerId, SessionMode, SessionSummary, Word,
};
use crate::word_set::WordSet;

/// Prompt shown while in lookup mode.
pub const LOOKUP_PROMPT: &str = "Enter a word to translate ('exit' to finish)";

/// Word that ends the lookup loop.
pub const LOOKUP_EXIT: &str = "exit";

/// Per-session options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub direction: Direction,
    /// Rounds still running at this instant are abandoned.
    pub deadline: Option<Instant>,
}

/// Drives one learner's sessions against a word set and catalog.
///
/// Only one session per learner may run at a time; callers serialize.
pub struct SessionOrchestrator<'a, W: ?Sized, C: ?Sized> {
    word_set: &'a W,
    catalog: &'a C,
    config: SessionConfig,
}

impl<'a, W, C> SessionOrchestrator<'a, W, C>
where
    W: WordSet + ?Sized,
    C: Catalog + ?Sized,
{
    pub fn new(word_set: &'a W, catalog: &'a C) -> Self {
        Self {
            word_set,
            catalog,
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Run a session in any mode. Lookup sessions return no summary.
    pub fn run<K: Console + ?Sized>(
        &self,
        console: &mut K,
        learner: LearnerId,
        mode: SessionMode,
        limit: i64,
    ) -> Result<Option<SessionSummary>> {
        match mode.drill_mode() {
            Some(drill_mode) => self
                .run_session(console, learner, drill_mode, limit)
                .map(Some),
            None => self.lookup_loop(console).map(|_| None),
        }
    }

    /// Fetch a batch for the mode and drill it to completion.
    ///
    /// `limit` is validated before the word set is touched. An empty batch
    /// ends immediately with a zero summary.
    pub fn run_session<K: Console + ?Sized>(
        &self,
        console: &mut K,
        learner: LearnerId,
        mode: DrillMode,
        limit: i64,
    ) -> Result<SessionSummary> {
        let limit = BatchLimit::new(limit)?;
        let batch = self
            .word_set
            .fetch_batch(learner, mode.source_partition(), limit)?;

        if batch.is_empty() {
            tracing::info!(learner = %learner, mode = mode.as_str(), "nothing to drill");
            console.announce(Notice::NothingToDrill { mode });
            return Ok(SessionSummary::empty(mode));
        }

        let drilled = batch.len();
        console.announce(Notice::RoundStarted {
            mode,
            words: drilled,
        });

        let started = Instant::now();
        let report = DrillQueue::new(mode, learner, batch, self.word_set, self.catalog)
            .with_direction(self.config.direction)
            .with_deadline(self.config.deadline)
            .run(console)
            .map_err(|err| {
                tracing::error!(learner = %learner, mode = mode.as_str(), "round ended early: {}", err);
                err
            })?;
        let elapsed = started.elapsed();

        let summary = SessionSummary {
            mode,
            elapsed,
            drilled,
            presentations: report.presentations,
            skipped: report.skipped,
            tally: match mode {
                DrillMode::Test => Some(report.tally()),
                DrillMode::Learn => None,
            },
        };

        tracing::info!(
            learner = %learner,
            mode = mode.as_str(),
            drilled,
            presentations = report.presentations,
            elapsed_ms = elapsed.as_millis() as u64,
            "round finished"
        );
        console.announce(Notice::Summary(&summary));
        Ok(summary)
    }

    /// Translate a single word typed in either language.
    pub fn lookup(&self, text: &str) -> Result<Vec<Word>> {
        catalog::lookup(self.catalog, text)
    }

    /// Keep translating words until `exit` or closed input.
    ///
    /// Returns the number of lookups made.
    pub fn lookup_loop<K: Console + ?Sized>(&self, console: &mut K) -> Result<usize> {
        let mut lookups = 0;
        loop {
            let text = match console.present_prompt(LOOKUP_PROMPT) {
                Ok(text) => text,
                Err(DrillError::Input(_)) => break,
                Err(err) => return Err(err),
            };
            if text.trim().eq_ignore_ascii_case(LOOKUP_EXIT) {
                break;
            }

            let words = self.lookup(&text)?;
            console.show_translations(&words);
            lookups += 1;
        }
        Ok(lookups)
    }
}
