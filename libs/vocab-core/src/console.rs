//! Input/output surface a session talks to.

use crate::error::Result;
use crate::types::{DrillMode, SessionSummary, Word};

/// Something the learner should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice<'a> {
    RoundStarted { mode: DrillMode, words: usize },
    NothingToDrill { mode: DrillMode },
    Correct,
    /// Accepted, but not spelled exactly like the expected answer.
    SpellingMistake { expected: &'a str },
    Wrong { expected: &'a str },
    /// The missed word must be typed exactly before the round moves on.
    RetryUntilExact { expected: &'a str },
    /// The item was dropped because the store no longer held it where expected.
    Skipped { word: &'a Word },
    Summary(&'a SessionSummary),
}

/// Blocking prompt and display primitives.
pub trait Console {
    /// Show a prompt and block until the learner answers.
    fn present_prompt(&mut self, text: &str) -> Result<String>;

    fn show_translations(&mut self, words: &[Word]);

    fn announce(&mut self, notice: Notice<'_>);
}

impl<T: Console + ?Sized> Console for &mut T {
    fn present_prompt(&mut self, text: &str) -> Result<String> {
        (**self).present_prompt(text)
    }

    fn show_translations(&mut self, words: &[Word]) {
        (**self).show_translations(words)
    }

    fn announce(&mut self, notice: Notice<'_>) {
        (**self).announce(notice)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use super::*;
    use crate::error::DrillError;

    /// Console fed from a fixed list of answers, recording what it was shown.
    #[derive(Debug, Default)]
    pub struct ScriptedConsole {
        answers: VecDeque<String>,
        pub prompts: Vec<String>,
        pub translations: Vec<Vec<Word>>,
        pub notices: Vec<String>,
    }

    impl ScriptedConsole {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: answers.into_iter().map(Into::into).collect(),
                ..Self::default()
            }
        }

        pub fn remaining(&self) -> usize {
            self.answers.len()
        }
    }

    impl Console for ScriptedConsole {
        fn present_prompt(&mut self, text: &str) -> Result<String> {
            self.prompts.push(text.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| DrillError::Input("no more answers".to_string()))
        }

        fn show_translations(&mut self, words: &[Word]) {
            self.translations.push(words.to_vec());
        }

        fn announce(&mut self, notice: Notice<'_>) {
            self.notices.push(format!("{notice:?}"));
        }
    }
}
