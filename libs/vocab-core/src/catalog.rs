//! Read-only vocabulary catalog seam.

use crate::error::Result;
use crate::types::Word;

/// Read-only access to catalog words.
///
/// A text with no match yields an empty list; errors mean the catalog
/// could not be reached.
pub trait Catalog {
    fn find_by_source_text(&self, text: &str) -> Result<Vec<Word>>;
    fn find_by_target_text(&self, text: &str) -> Result<Vec<Word>>;
}

impl<T: Catalog + ?Sized> Catalog for &T {
    fn find_by_source_text(&self, text: &str) -> Result<Vec<Word>> {
        (**self).find_by_source_text(text)
    }

    fn find_by_target_text(&self, text: &str) -> Result<Vec<Word>> {
        (**self).find_by_target_text(text)
    }
}

/// Translate a word typed in either language.
///
/// Searches the source side first and falls back to the target side.
pub fn lookup<C: Catalog + ?Sized>(catalog: &C, text: &str) -> Result<Vec<Word>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let words = catalog.find_by_source_text(text)?;
    if !words.is_empty() {
        return Ok(words);
    }
    catalog.find_by_target_text(text)
}
