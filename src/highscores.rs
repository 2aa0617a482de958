//! High score leaderboard system
//!
//! Persisted to LocalStorage, tracks the top 5 named scores.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Maximum player name length (chars)
pub const MAX_NAME_LEN: usize = 50;

/// A single high score entry
///
/// Only `new` builds one, so every entry holds a trimmed 1-50 char name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighScoreEntry {
    name: String,
    score: u64,
}

impl HighScoreEntry {
    /// Build an entry from raw input; None if the name is blank
    pub fn new(name: &str, score: u64) -> Option<Self> {
        let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();
        if name.is_empty() {
            return None;
        }
        Some(Self { name, score })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Berries eaten times points
    pub fn score(&self) -> u64 {
        self.score
    }
}

/// Entry as found in storage, before the name rule is applied
#[derive(Deserialize)]
struct StoredEntry {
    name: String,
    score: u64,
}

/// High score leaderboard
///
/// Stored as a bare JSON array so it stays readable by older builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "highScore";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary entries, restoring the sort/size invariants
    pub fn from_entries(entries: Vec<HighScoreEntry>) -> Self {
        let mut scores = Self { entries };
        scores.normalize();
        scores
    }

    /// Entries, best first
    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add an entry, re-sort and keep the top 5
    /// Returns the rank achieved (1-indexed) or None if it fell off the board
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        self.entries.push(entry);
        let inserted = self.entries.len() - 1;
        // Stable sort: ties keep insertion order, so the newcomer ranks last
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| self.entries[b].score.cmp(&self.entries[a].score));
        let rank = order.iter().position(|&i| i == inserted).map(|p| p + 1);
        self.normalize();
        rank.filter(|&r| r <= MAX_HIGH_SCORES)
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best entry (shown on the trophy card)
    pub fn top_entry(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Lowest score on the board (if any)
    pub fn min_score(&self) -> Option<u64> {
        self.entries.last().map(|e| e.score)
    }

    /// Load high scores; missing or malformed data yields an empty board
    pub fn load(storage: &impl Storage) -> Self {
        let Some(json) = storage.get_item(Self::STORAGE_KEY) else {
            log::info!("No high scores found, starting fresh");
            return Self::new();
        };

        match serde_json::from_str::<Vec<StoredEntry>>(&json) {
            Ok(stored) => {
                let total = stored.len();
                let entries: Vec<HighScoreEntry> = stored
                    .into_iter()
                    .filter_map(|e| HighScoreEntry::new(&e.name, e.score))
                    .collect();
                if entries.len() < total {
                    log::warn!("Dropped {} stored high scores without a name", total - entries.len());
                }
                let scores = Self::from_entries(entries);
                log::info!("Loaded {} high scores", scores.len());
                scores
            }
            Err(e) => {
                log::warn!("Ignoring malformed high scores: {}", e);
                Self::new()
            }
        }
    }

    /// Save high scores
    pub fn save(&self, storage: &impl Storage) {
        match serde_json::to_string(self) {
            Ok(json) => {
                storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
            Err(e) => log::warn!("Failed to encode high scores: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;

    fn board(scores: &[(&str, u64)]) -> HighScores {
        HighScores::from_entries(
            scores
                .iter()
                .map(|(n, s)| HighScoreEntry::new(n, *s).unwrap())
                .collect(),
        )
    }

    fn full_board() -> HighScores {
        board(&[("A", 50), ("B", 40), ("C", 30), ("D", 20), ("E", 10)])
    }

    #[test]
    fn test_qualifies_full_board_boundary() {
        let scores = full_board();
        assert!(scores.qualifies(15));
        assert!(scores.qualifies(11));
        assert!(!scores.qualifies(10));
        assert!(!scores.qualifies(5));
    }

    #[test]
    fn test_qualifies_zero_never() {
        assert!(!HighScores::new().qualifies(0));
        assert!(HighScores::new().qualifies(10));
        assert!(board(&[("A", 50)]).qualifies(10));
    }

    #[test]
    fn test_add_keeps_top_five_sorted() {
        let mut scores = full_board();
        let rank = scores.add(HighScoreEntry::new("F", 35).unwrap());
        assert_eq!(rank, Some(3));
        assert_eq!(scores.len(), MAX_HIGH_SCORES);
        let names: Vec<&str> = scores.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["A", "B", "F", "C", "D"]);
    }

    #[test]
    fn test_add_tie_ranks_after_existing() {
        let mut scores = board(&[("A", 30), ("B", 20)]);
        let rank = scores.add(HighScoreEntry::new("C", 20).unwrap());
        assert_eq!(rank, Some(3));
        assert_eq!(scores.entries()[1].name(), "B");
        assert_eq!(scores.entries()[2].name(), "C");
    }

    #[test]
    fn test_potential_rank() {
        let scores = full_board();
        assert_eq!(scores.potential_rank(100), Some(1));
        assert_eq!(scores.potential_rank(25), Some(4));
        assert_eq!(scores.potential_rank(10), None);
    }

    #[test]
    fn test_entry_name_trimmed_and_capped() {
        assert!(HighScoreEntry::new("   ", 10).is_none());
        assert_eq!(HighScoreEntry::new("  Lan  ", 10).unwrap().name(), "Lan");
        let long = "x".repeat(80);
        assert_eq!(HighScoreEntry::new(&long, 10).unwrap().name().len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_load_save_roundtrip() {
        let storage = MemoryStorage::new();
        let scores = full_board();
        scores.save(&storage);
        assert_eq!(HighScores::load(&storage), scores);
        assert!(storage.get_item(HighScores::STORAGE_KEY).unwrap().starts_with('['));
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let storage = MemoryStorage::new();
        assert!(HighScores::load(&storage).is_empty());

        storage.set_item(HighScores::STORAGE_KEY, "{not json");
        assert!(HighScores::load(&storage).is_empty());

        // A single object (not a list) is also rejected
        storage.set_item(HighScores::STORAGE_KEY, r#"{"name":"A","score":10}"#);
        assert!(HighScores::load(&storage).is_empty());
    }

    #[test]
    fn test_load_restores_invariants() {
        let storage = MemoryStorage::new();
        storage.set_item(
            HighScores::STORAGE_KEY,
            r#"[{"name":"a","score":1},{"name":"b","score":9},{"name":"c","score":5},
               {"name":"d","score":3},{"name":"e","score":7},{"name":"f","score":2}]"#,
        );
        let scores = HighScores::load(&storage);
        let values: Vec<u64> = scores.entries().iter().map(|e| e.score()).collect();
        assert_eq!(values, [9, 7, 5, 3, 2]);
    }

    #[test]
    fn test_load_applies_name_rule() {
        let storage = MemoryStorage::new();
        let long = "x".repeat(80);
        storage.set_item(
            HighScores::STORAGE_KEY,
            &format!(
                r#"[{{"name":"","score":30}},{{"name":"   ","score":20}},{{"name":"{long}","score":10}},{{"name":"  Kim ","score":5}}]"#
            ),
        );
        let scores = HighScores::load(&storage);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.entries()[0].name().len(), MAX_NAME_LEN);
        assert_eq!(scores.entries()[0].score(), 10);
        assert_eq!(scores.entries()[1].name(), "Kim");
        assert!(scores.entries().iter().all(|e| (1..=MAX_NAME_LEN).contains(&e.name().chars().count())));
    }

    proptest! {
        #[test]
        fn prop_board_bounded_and_sorted(adds in prop::collection::vec(0u64..200, 0..40)) {
            let mut scores = HighScores::new();
            for (i, score) in adds.into_iter().enumerate() {
                if scores.qualifies(score) {
                    scores.add(HighScoreEntry::new(&format!("p{i}"), score).unwrap());
                }
                prop_assert!(scores.len() <= MAX_HIGH_SCORES);
                prop_assert!(scores.entries().windows(2).all(|w| w[0].score() >= w[1].score()));
            }
        }
    }
}
