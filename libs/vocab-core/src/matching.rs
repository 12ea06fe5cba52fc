//! Answer grading with tolerance for a single spelling mistake.

use serde::{Deserialize, Serialize};

/// Maximum edit distance still accepted as a spelling mistake.
pub const MAX_SPELLING_MISTAKES: usize = 1;

/// Outcome of grading a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Exact,
    CloseEnough,
    Wrong,
}

impl Verdict {
    /// Whether the answer advances the drill.
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Exact | Self::CloseEnough)
    }

    pub fn is_spelling_mistake(self) -> bool {
        self == Self::CloseEnough
    }
}

/// Grade a submitted answer against the expected word.
pub fn grade(expected: &str, submitted: &str) -> Verdict {
    let expected = normalize(expected);
    let submitted = normalize(submitted);

    if expected == submitted {
        return Verdict::Exact;
    }

    if edit_distance(&expected, &submitted) <= MAX_SPELLING_MISTAKES {
        Verdict::CloseEnough
    } else {
        Verdict::Wrong
    }
}

/// Exact match after normalization, used when a missed word must be retyped.
pub fn matches_exactly(expected: &str, submitted: &str) -> bool {
    grade(expected, submitted) == Verdict::Exact
}

/// Lowercase and drop all whitespace.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Edit distance with unit-cost insertion, deletion, substitution and
/// adjacent transposition (optimal string alignment).
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::osa_distance(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("table", "tabel"), 1);
        assert_eq!(edit_distance("стол", "стул"), 1);
    }

    #[test]
    fn test_grade() {
        assert_eq!(grade("table", "table"), Verdict::Exact);
        assert_eq!(grade("table", "tabel"), Verdict::CloseEnough);
        assert_eq!(grade("table", "chair"), Verdict::Wrong);
    }

    #[test]
    fn test_grade_single_edits() {
        assert_eq!(grade("table", "tabl"), Verdict::CloseEnough);
        assert_eq!(grade("table", "tables"), Verdict::CloseEnough);
        assert_eq!(grade("table", "cable"), Verdict::CloseEnough);
        assert_eq!(grade("table", "cables"), Verdict::Wrong);
    }

    #[test]
    fn test_grade_ignores_case_and_whitespace() {
        assert_eq!(grade("Ice cream", "icecream"), Verdict::Exact);
        assert_eq!(grade("table", "  TABLE \t"), Verdict::Exact);
        assert_eq!(grade("look after", "Look  After"), Verdict::Exact);
    }

    #[test]
    fn test_empty_answer() {
        assert_eq!(grade("a", ""), Verdict::CloseEnough);
        assert_eq!(grade("table", ""), Verdict::Wrong);
    }

    #[test]
    fn test_verdict_flags() {
        assert!(Verdict::Exact.is_correct());
        assert!(Verdict::CloseEnough.is_correct());
        assert!(!Verdict::Wrong.is_correct());
        assert!(Verdict::CloseEnough.is_spelling_mistake());
        assert!(!Verdict::Exact.is_spelling_mistake());
    }

    #[test]
    fn test_matches_exactly() {
        assert!(matches_exactly("table", "Table"));
        assert!(!matches_exactly("table", "tabel"));
    }
}
