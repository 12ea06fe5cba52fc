//! Drill round: a FIFO of words consumed one prompt at a time.
//!
//! Test rounds pop every word after one presentation. A miss must be retyped
//! exactly before the word is escalated to review. Learn rounds requeue a
//! missed word at the tail until it is answered correctly once.

use std::collections::VecDeque;
use std::time::Instant;

use crate::catalog::Catalog;
use crate::console::{Console, Notice};
use crate::error::{DrillError, Result};
use crate::matching::{grade, matches_exactly, Verdict};
use crate::types::{Direction, DrillMode, LearnerId, RoundTally, Word};
use crate::word_set::{Transition, WordSet};

/// Round state. A round is a single pass and cannot be resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Running,
    Done,
}

/// Counters collected while a round runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Head-of-queue prompts shown, requeued words counted again.
    pub presentations: usize,
    /// Transition calls made, successful or not.
    pub transitions: usize,
    pub correct: usize,
    pub spelling_mistakes: usize,
    pub escalated: usize,
    pub skipped: usize,
}

impl RoundReport {
    pub fn tally(&self) -> RoundTally {
        RoundTally {
            correct: self.correct,
            spelling_mistakes: self.spelling_mistakes,
            escalated: self.escalated,
        }
    }
}

enum Commit {
    Done,
    Skipped,
}

pub struct DrillQueue<'a, W: ?Sized, C: ?Sized> {
    mode: DrillMode,
    learner: LearnerId,
    direction: Direction,
    deadline: Option<Instant>,
    queue: VecDeque<Word>,
    word_set: &'a W,
    catalog: &'a C,
    report: RoundReport,
}

impl<'a, W, C> DrillQueue<'a, W, C>
where
    W: WordSet + ?Sized,
    C: Catalog + ?Sized,
{
    pub fn new(
        mode: DrillMode,
        learner: LearnerId,
        batch: Vec<Word>,
        word_set: &'a W,
        catalog: &'a C,
    ) -> Self {
        Self {
            mode,
            learner,
            direction: Direction::default(),
            deadline: None,
            queue: batch.into(),
            word_set,
            catalog,
            report: RoundReport::default(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Abandon the round with `DeadlineExceeded` once this instant passes.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn state(&self) -> RoundState {
        if self.queue.is_empty() {
            RoundState::Done
        } else {
            RoundState::Running
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn report(&self) -> RoundReport {
        self.report
    }

    /// Process items until the queue is empty.
    ///
    /// `Unavailable`, input and deadline errors end the round; transitions
    /// already committed stand.
    pub fn run<K: Console + ?Sized>(&mut self, console: &mut K) -> Result<RoundReport> {
        while self.step(console)? == RoundState::Running {}
        Ok(self.report)
    }

    /// Present the head word once and apply the verdict.
    pub fn step<K: Console + ?Sized>(&mut self, console: &mut K) -> Result<RoundState> {
        let Some(word) = self.queue.front().cloned() else {
            return Ok(RoundState::Done);
        };
        let prompt = self.direction.prompt(&word);
        let expected = self.direction.expected(&word);

        self.check_deadline()?;
        self.report.presentations += 1;
        let answer = console.present_prompt(prompt)?;
        let verdict = grade(expected, &answer);
        tracing::debug!(word = %word.id, ?verdict, mode = self.mode.as_str(), "graded answer");

        if verdict.is_correct() {
            match verdict {
                Verdict::CloseEnough => console.announce(Notice::SpellingMistake { expected }),
                _ => console.announce(Notice::Correct),
            }

            let transition = match self.mode {
                DrillMode::Test => Transition::Promote,
                DrillMode::Learn => Transition::Retire,
            };
            if let Commit::Done = self.commit(console, &word, transition)? {
                self.report.correct += 1;
                if verdict.is_spelling_mistake() {
                    self.report.spelling_mistakes += 1;
                }
            }
            self.queue.pop_front();
            return Ok(self.state());
        }

        console.announce(Notice::Wrong { expected });
        self.show_correct(console, &word)?;

        match self.mode {
            DrillMode::Test => {
                console.announce(Notice::RetryUntilExact { expected });
                loop {
                    self.check_deadline()?;
                    let retry = console.present_prompt(prompt)?;
                    if matches_exactly(expected, &retry) {
                        break;
                    }
                }
                if let Commit::Done = self.commit(console, &word, Transition::Escalate)? {
                    self.report.escalated += 1;
                }
                self.queue.pop_front();
            }
            DrillMode::Learn => {
                if let Some(missed) = self.queue.pop_front() {
                    self.queue.push_back(missed);
                }
            }
        }

        Ok(self.state())
    }

    fn commit<K: Console + ?Sized>(
        &mut self,
        console: &mut K,
        word: &Word,
        transition: Transition,
    ) -> Result<Commit> {
        self.report.transitions += 1;
        match self.word_set.transition(self.learner, word.id, transition) {
            Ok(_) => Ok(Commit::Done),
            Err(err @ DrillError::NotFound { .. }) => {
                tracing::warn!(
                    learner = %self.learner,
                    word = %word.id,
                    transition = transition.as_str(),
                    "skipping drill item: {}",
                    err
                );
                self.report.skipped += 1;
                console.announce(Notice::Skipped { word });
                Ok(Commit::Skipped)
            }
            Err(err) => Err(err),
        }
    }

    /// Display the catalog entries for the expected answer.
    fn show_correct<K: Console + ?Sized>(&self, console: &mut K, word: &Word) -> Result<()> {
        let mut translations = match self.direction {
            Direction::SourceToTarget => self.catalog.find_by_target_text(&word.target)?,
            Direction::TargetToSource => self.catalog.find_by_source_text(&word.source)?,
        };
        if translations.is_empty() {
            translations.push(word.clone());
        }
        console.show_translations(&translations);
        Ok(())
    }

    fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DrillError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
