use serde::{Deserialize, Serialize};

use crate::GameMode;

/// Number of entries a highscore table keeps.
pub const HIGHSCORE_CAPACITY: usize = 10;

/// Maximum number of characters stored for a player name.
pub const HIGHSCORE_NAME_LENGTH: usize = 12;

/// Single line of the highscore table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreEntry {
    /// Player name, truncated on insertion.
    pub name: String,
    /// Final score.
    pub score: u64,
    /// Mode the run was played in.
    pub mode: GameMode,
    /// Wave reached.
    pub wave: u32,
    /// Number of maps visited.
    pub map_count: u32,
    /// Free-form date supplied by the storage layer.
    pub date: String,
}

/// Descending top-ten list of finished runs.
///
/// Persistence is left to adapters; the table only maintains ordering and
/// capacity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreTable {
    entries: Vec<HighscoreEntry>,
}

impl HighscoreTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries sorted by descending score.
    #[must_use]
    pub fn entries(&self) -> &[HighscoreEntry] {
        &self.entries
    }

    /// Reports whether a score would earn a place in the table.
    #[must_use]
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < HIGHSCORE_CAPACITY {
            return true;
        }
        self.entries
            .last()
            .map_or(true, |lowest| score > lowest.score)
    }

    /// Inserts an entry, returning its rank if it stayed in the table.
    pub fn insert(&mut self, mut entry: HighscoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        entry.name = entry.name.chars().take(HIGHSCORE_NAME_LENGTH).collect();
        let position = self
            .entries
            .iter()
            .position(|existing| entry.score > existing.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
        self.entries.truncate(HIGHSCORE_CAPACITY);
        (position < HIGHSCORE_CAPACITY).then_some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u64) -> HighscoreEntry {
        HighscoreEntry {
            name: name.to_owned(),
            score,
            mode: GameMode::Normal,
            wave: 3,
            map_count: 1,
            date: "2024-01-01".to_owned(),
        }
    }

    #[test]
    fn empty_table_accepts_any_score() {
        let table = HighscoreTable::new();
        assert!(table.qualifies(0));
    }

    #[test]
    fn full_table_requires_beating_the_tenth_entry() {
        let mut table = HighscoreTable::new();
        for score in 1..=10 {
            let _ = table.insert(entry("p", score * 100));
        }
        assert_eq!(table.entries().len(), HIGHSCORE_CAPACITY);
        assert!(!table.qualifies(100));
        assert!(table.qualifies(101));
    }

    #[test]
    fn insertion_keeps_descending_order_and_capacity() {
        let mut table = HighscoreTable::new();
        for score in [300, 100, 200] {
            let _ = table.insert(entry("p", score));
        }
        let scores: Vec<u64> = table.entries().iter().map(|entry| entry.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);

        for _ in 0..20 {
            let _ = table.insert(entry("q", 150));
        }
        assert_eq!(table.entries().len(), HIGHSCORE_CAPACITY);
        assert_eq!(table.entries()[0].score, 300);
    }

    #[test]
    fn names_are_truncated() {
        let mut table = HighscoreTable::new();
        let rank = table.insert(entry("AVeryLongPlayerName", 10));
        assert_eq!(rank, Some(0));
        assert_eq!(table.entries()[0].name, "AVeryLongPla");
    }
}
