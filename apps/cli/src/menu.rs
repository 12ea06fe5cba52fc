//! Interactive command menu.

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use vocab_core::{
    Catalog, Console, Direction, DrillError, LearnerId, SessionConfig, SessionMode,
    SessionOrchestrator, WordSet,
};

use crate::terminal::TerminalConsole;

const COMMAND_PROMPT: &str = "Command (test, learn, translate, exit)";
const COUNT_PROMPT: &str = "How many words";

/// A menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Drill(SessionMode),
    Exit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "test" => Some(Self::Drill(SessionMode::Test)),
            "learn" => Some(Self::Drill(SessionMode::Learn)),
            "translate" => Some(Self::Drill(SessionMode::Lookup)),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

pub struct Menu<'a, W: ?Sized, C: ?Sized> {
    word_set: &'a W,
    catalog: &'a C,
    learner: LearnerId,
    direction: Direction,
    time_limit: Option<Duration>,
}

impl<'a, W, C> Menu<'a, W, C>
where
    W: WordSet + ?Sized,
    C: Catalog + ?Sized,
{
    pub fn new(word_set: &'a W, catalog: &'a C, learner: LearnerId) -> Self {
        Self {
            word_set,
            catalog,
            learner,
            direction: Direction::default(),
            time_limit: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Deadline for a round starting now. A limit too large to represent
    /// on this clock means no deadline.
    fn deadline(&self) -> Option<Instant> {
        self.time_limit.and_then(|limit| Instant::now().checked_add(limit))
    }

    /// Read commands until `exit` or closed input.
    ///
    /// Errors from a single session are reported and the menu continues.
    pub fn run<R: BufRead, Wr: Write>(
        &self,
        console: &mut TerminalConsole<R, Wr>,
    ) -> vocab_core::Result<()> {
        loop {
            let input = match console.present_prompt(COMMAND_PROMPT) {
                Ok(input) => input,
                Err(DrillError::Input(_)) => return Ok(()),
                Err(err) => return Err(err),
            };

            let mode = match Command::parse(&input) {
                Some(Command::Drill(mode)) => mode,
                Some(Command::Exit) => return Ok(()),
                None => {
                    console.say(&format!("Unknown command: {}", input.trim()));
                    continue;
                }
            };

            let limit = match mode {
                SessionMode::Lookup => 0,
                _ => match console.present_prompt(COUNT_PROMPT) {
                    Ok(raw) => match raw.trim().parse::<i64>() {
                        Ok(limit) => limit,
                        Err(_) => {
                            console.say("Please enter a whole number.");
                            continue;
                        }
                    },
                    Err(DrillError::Input(_)) => return Ok(()),
                    Err(err) => return Err(err),
                },
            };

            let config = SessionConfig {
                direction: self.direction,
                deadline: self.deadline(),
            };
            let orchestrator =
                SessionOrchestrator::new(self.word_set, self.catalog).with_config(config);

            match orchestrator.run(console, self.learner, mode, limit) {
                Ok(_) => {}
                Err(DrillError::Input(_)) => return Ok(()),
                Err(err) => {
                    tracing::error!(learner = %self.learner, ?mode, "session failed: {}", err);
                    console.say(&format!("Error: {err}"));
                }
            }
        }
    }
}
