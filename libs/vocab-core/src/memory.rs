//! In-process catalog and word set.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use crate::catalog::Catalog;
use crate::error::{DrillError, Result};
use crate::types::{BatchLimit, LearnerId, Partition, Word, WordId};
use crate::word_set::{Transition, WordSet};

fn poisoned(what: &str) -> DrillError {
    DrillError::Unavailable(format!("{what} lock poisoned"))
}

/// Catalog held in memory, ordered by word id.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    words: RwLock<BTreeMap<WordId, Word>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new word with a fresh id.
    pub fn insert(
        &self,
        source: &str,
        target: &str,
        topic: &str,
        part_of_speech: &str,
    ) -> Result<Word> {
        let word = Word {
            id: WordId::new_v4(),
            source: source.to_string(),
            target: target.to_string(),
            topic: topic.to_string(),
            part_of_speech: part_of_speech.to_string(),
        };
        self.add(word.clone())?;
        Ok(word)
    }

    pub fn add(&self, word: Word) -> Result<()> {
        let mut words = self.words.write().map_err(|_| poisoned("catalog"))?;
        words.insert(word.id, word);
        Ok(())
    }

    pub fn get(&self, id: WordId) -> Option<Word> {
        self.words.read().ok()?.get(&id).cloned()
    }

    pub fn ids(&self) -> Result<Vec<WordId>> {
        let words = self.words.read().map_err(|_| poisoned("catalog"))?;
        Ok(words.keys().copied().collect())
    }

    pub fn len(&self) -> usize {
        self.words.read().map(|words| words.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Case-insensitive exact match, falling back to a substring match.
    fn find_by(&self, text: &str, side: fn(&Word) -> &str) -> Result<Vec<Word>> {
        let words = self.words.read().map_err(|_| poisoned("catalog"))?;
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let exact: Vec<Word> = words
            .values()
            .filter(|w| side(w).to_lowercase() == needle)
            .cloned()
            .collect();
        if !exact.is_empty() {
            return Ok(exact);
        }

        Ok(words
            .values()
            .filter(|w| side(w).to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

impl Catalog for MemoryCatalog {
    fn find_by_source_text(&self, text: &str) -> Result<Vec<Word>> {
        self.find_by(text, |w| &w.source)
    }

    fn find_by_target_text(&self, text: &str) -> Result<Vec<Word>> {
        self.find_by(text, |w| &w.target)
    }
}

/// Learner partitions held in memory.
///
/// Each learner maps word id to a single partition, so a word can never sit
/// in two partitions at once.
#[derive(Debug)]
pub struct MemoryWordSet {
    catalog: Arc<MemoryCatalog>,
    learners: Mutex<HashMap<LearnerId, BTreeMap<WordId, Partition>>>,
}

impl MemoryWordSet {
    pub fn new(catalog: Arc<MemoryCatalog>) -> Self {
        Self {
            catalog,
            learners: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &MemoryCatalog {
        &self.catalog
    }

    /// Create entries for every catalog word in `Assigned`.
    ///
    /// Existing entries are left where they are. Returns the number created.
    pub fn enroll(&self, learner: LearnerId) -> Result<usize> {
        let mut learners = self.learners.lock().map_err(|_| poisoned("word set"))?;
        let entries = learners.entry(learner).or_default();
        let mut created = 0;
        for id in self.catalog.ids()? {
            entries.entry(id).or_insert_with(|| {
                created += 1;
                Partition::Assigned
            });
        }
        Ok(created)
    }

    /// Word ids a learner holds in one partition, in id order.
    pub fn members(&self, learner: LearnerId, partition: Partition) -> Result<Vec<WordId>> {
        let learners = self.learners.lock().map_err(|_| poisoned("word set"))?;
        Ok(learners
            .get(&learner)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, p)| **p == partition)
                    .map(|(id, _)| *id)
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl WordSet for MemoryWordSet {
    fn transition(
        &self,
        learner: LearnerId,
        word: WordId,
        transition: Transition,
    ) -> Result<Partition> {
        let mut learners = self.learners.lock().map_err(|_| poisoned("word set"))?;
        let entry = learners.get_mut(&learner).and_then(|e| e.get_mut(&word));
        let current = entry.as_deref().copied();
        let target = transition.apply(learner, word, current)?;
        if let Some(slot) = entry {
            *slot = target;
        }
        Ok(target)
    }

    fn fetch_batch(
        &self,
        learner: LearnerId,
        partition: Partition,
        limit: BatchLimit,
    ) -> Result<Vec<Word>> {
        let learners = self.learners.lock().map_err(|_| poisoned("word set"))?;
        let Some(entries) = learners.get(&learner) else {
            return Ok(Vec::new());
        };

        Ok(entries
            .iter()
            .filter(|(_, p)| **p == partition)
            .filter_map(|(id, _)| self.catalog.get(*id))
            .take(limit.as_usize())
            .collect())
    }

    fn partition_of(&self, learner: LearnerId, word: WordId) -> Result<Option<Partition>> {
        let learners = self.learners.lock().map_err(|_| poisoned("word set"))?;
        Ok(learners.get(&learner).and_then(|e| e.get(&word)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn setup(words: usize) -> (MemoryWordSet, LearnerId, Vec<Word>) {
        let catalog = Arc::new(MemoryCatalog::new());
        let words = (0..words)
            .map(|i| {
                catalog
                    .insert(&format!("слово{i}"), &format!("word{i}"), "misc", "noun")
                    .unwrap()
            })
            .collect();
        let set = MemoryWordSet::new(catalog);
        let learner = LearnerId::new_v4();
        set.enroll(learner).unwrap();
        (set, learner, words)
    }

    fn assert_exclusive(set: &MemoryWordSet, learner: LearnerId, words: &[Word]) {
        let members: Vec<Vec<WordId>> = Partition::ALL
            .iter()
            .map(|p| set.members(learner, *p).unwrap())
            .collect();
        for word in words {
            let holders = members.iter().filter(|m| m.contains(&word.id)).count();
            assert_eq!(holders, 1, "word {} is in {} partitions", word.id, holders);
        }
    }

    #[test]
    fn test_poisoned_catalog_rejects_inserts() {
        let catalog = Arc::new(MemoryCatalog::new());
        let writer = Arc::clone(&catalog);
        let _ = std::thread::spawn(move || {
            let _guard = writer.words.write().unwrap();
            panic!("poison the catalog");
        })
        .join();

        let err = catalog.insert("стол", "table", "house", "noun").unwrap_err();
        assert!(err.is_unavailable());
        assert!(catalog.ids().unwrap_err().is_unavailable());

        let set = MemoryWordSet::new(catalog);
        assert!(set.enroll(LearnerId::new_v4()).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_enroll_assigns_every_word_once() {
        let (set, learner, words) = setup(3);
        assert_eq!(set.members(learner, Partition::Assigned).unwrap().len(), 3);
        assert_eq!(set.enroll(learner).unwrap(), 0);
        assert_exclusive(&set, learner, &words);
    }

    #[test]
    fn test_promote_twice_is_not_found() {
        let (set, learner, words) = setup(1);
        set.promote_to_mastered(learner, words[0].id).unwrap();
        let err = set.promote_to_mastered(learner, words[0].id).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            set.partition_of(learner, words[0].id).unwrap(),
            Some(Partition::Mastered)
        );
    }

    #[test]
    fn test_escalate_removes_from_assigned() {
        let (set, learner, words) = setup(2);
        set.escalate_to_review(learner, words[0].id).unwrap();

        assert_eq!(set.members(learner, Partition::Assigned).unwrap(), vec![words[1].id]);
        assert_eq!(set.members(learner, Partition::InReview).unwrap(), vec![words[0].id]);
        assert_exclusive(&set, learner, &words);
    }

    #[test]
    fn test_retire_moves_to_mastered() {
        let (set, learner, words) = setup(1);
        set.escalate_to_review(learner, words[0].id).unwrap();
        set.retire_from_review(learner, words[0].id).unwrap();

        assert_eq!(
            set.partition_of(learner, words[0].id).unwrap(),
            Some(Partition::Mastered)
        );
        assert!(set.members(learner, Partition::InReview).unwrap().is_empty());
    }

    #[test]
    fn test_failed_transition_leaves_state_untouched() {
        let (set, learner, words) = setup(2);
        assert!(set.retire_from_review(learner, words[0].id).is_err());
        assert!(set.escalate_to_review(learner, WordId::new_v4()).is_err());
        assert!(set.promote_to_mastered(LearnerId::new_v4(), words[0].id).is_err());
        assert_eq!(set.members(learner, Partition::Assigned).unwrap().len(), 2);
    }

    #[test]
    fn test_fetch_batch_is_bounded_and_stable() {
        let (set, learner, _) = setup(5);
        let limit = BatchLimit::new(3).unwrap();
        let first = set.fetch_batch(learner, Partition::Assigned, limit).unwrap();
        let second = set.fetch_batch(learner, Partition::Assigned, limit).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);

        assert!(set
            .fetch_batch(learner, Partition::Mastered, limit)
            .unwrap()
            .is_empty());
        assert!(set
            .fetch_batch(LearnerId::new_v4(), Partition::Assigned, limit)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_learners_are_independent() {
        let (set, first, words) = setup(1);
        let second = LearnerId::new_v4();
        set.enroll(second).unwrap();

        set.promote_to_mastered(first, words[0].id).unwrap();
        assert_eq!(
            set.partition_of(second, words[0].id).unwrap(),
            Some(Partition::Assigned)
        );
    }

    proptest! {
        #[test]
        fn prop_partition_exclusive_after_every_transition(
            ops in proptest::collection::vec((0usize..4, 0usize..3), 1..40)
        ) {
            let (set, learner, words) = setup(4);
            for (index, op) in ops {
                let word = words[index].id;
                let transition = Transition::ALL[op];
                let before = set.partition_of(learner, word).unwrap();
                let expected = transition.apply(learner, word, before).ok();

                match set.transition(learner, word, transition) {
                    Ok(after) => {
                        prop_assert_eq!(Some(after), expected);
                        prop_assert_eq!(set.partition_of(learner, word).unwrap(), Some(after));
                    }
                    Err(err) => {
                        prop_assert!(err.is_not_found());
                        prop_assert_eq!(expected, None);
                        prop_assert_eq!(set.partition_of(learner, word).unwrap(), before);
                    }
                }
                assert_exclusive(&set, learner, &words);
            }
        }
    }
}
