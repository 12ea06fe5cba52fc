//! Line-oriented console over any reader and writer.

use std::io::{BufRead, Write};

use vocab_core::{Console, DrillError, DrillMode, Notice, Word};

pub struct TerminalConsole<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Write one line; a broken terminal is logged, not fatal.
    pub fn say(&mut self, line: &str) {
        if let Err(err) = writeln!(self.writer, "{line}") {
            tracing::warn!("failed to write to terminal: {}", err);
        }
    }

    fn describe(word: &Word) -> String {
        let details: Vec<&str> = [word.part_of_speech.as_str(), word.topic.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if details.is_empty() {
            format!("{} - {}", word.source, word.target)
        } else {
            format!("{} - {} ({})", word.source, word.target, details.join(", "))
        }
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn present_prompt(&mut self, text: &str) -> vocab_core::Result<String> {
        write!(self.writer, "{text}: ")
            .and_then(|_| self.writer.flush())
            .map_err(|e| DrillError::Input(e.to_string()))?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| DrillError::Input(e.to_string()))?;
        if read == 0 {
            return Err(DrillError::Input("input closed".to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn show_translations(&mut self, words: &[Word]) {
        if words.is_empty() {
            self.say("No translations found");
            return;
        }
        for word in words {
            let line = Self::describe(word);
            self.say(&line);
        }
    }

    fn announce(&mut self, notice: Notice<'_>) {
        let line = match notice {
            Notice::RoundStarted {
                mode: DrillMode::Test,
                words,
            } => format!("Test: {words} words. Type the translation of each word."),
            Notice::RoundStarted {
                mode: DrillMode::Learn,
                words,
            } => format!("Learn: {words} words. Missed words come back until you get them right."),
            Notice::NothingToDrill {
                mode: DrillMode::Test,
            } => "No words left to test.".to_string(),
            Notice::NothingToDrill {
                mode: DrillMode::Learn,
            } => "No words to learn. Take a test first.".to_string(),
            Notice::Correct => "Correct!".to_string(),
            Notice::SpellingMistake { expected } => {
                format!("Correct, but mind the spelling: {expected}")
            }
            Notice::Wrong { expected } => format!("Wrong! The answer is: {expected}"),
            Notice::RetryUntilExact { expected } => {
                format!("Type \"{expected}\" to continue.")
            }
            Notice::Skipped { word } => {
                format!("Skipped \"{}\": it was moved elsewhere.", word.source)
            }
            Notice::Summary(summary) => summary.to_string(),
        };
        self.say(&line);
    }
}
