//! High score leaderboard system
//!
//! Persisted through [`Storage`], tracks top 10 scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u32,
    /// Level reached
    pub level: u32,
    /// Unix timestamp (seconds) when achieved
    pub timestamp: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
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
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u32, level: u32, timestamp: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                level,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the leaderboard, starting fresh if it is missing or unreadable
    pub fn load(storage: &Storage) -> Self {
        match storage.load::<HighScores>(Self::STORAGE_KEY) {
            Ok(Some(mut scores)) => {
                // Never trust ordering from disk
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Could not load high scores: {e}");
                Self::new()
            }
        }
    }

    pub fn save(&self, storage: &Storage) -> persistence::Result<()> {
        storage.save(Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_add_keeps_descending_order() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(50, 1, 0), Some(1));
        assert_eq!(scores.add_score(120, 2, 0), Some(1));
        assert_eq!(scores.add_score(80, 1, 0), Some(2));
        assert_eq!(scores.add_score(10, 1, 0), Some(4));

        let ordered: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![120, 80, 50, 10]);
        assert_eq!(scores.top_score(), Some(120));
    }

    #[test]
    fn test_full_board_truncates() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u32 {
            scores.add_score(i * 10, 1, 0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);

        // Lowest is 10: ties and lower scores are rejected
        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_score(5, 1, 0), None);

        assert_eq!(scores.add_score(15, 1, 0), Some(MAX_HIGH_SCORES));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(15));
    }

    #[test]
    fn test_equal_score_ranks_below_existing() {
        let mut scores = HighScores::new();
        scores.add_score(100, 3, 1);
        assert_eq!(scores.add_score(100, 2, 2), Some(2));
        assert_eq!(scores.entries[0].timestamp, 1);
    }

    #[test]
    fn test_persisted_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        assert!(HighScores::load(&storage).is_empty());

        let mut scores = HighScores::new();
        scores.add_score(300, 4, 1_700_000_000);
        scores.save(&storage).unwrap();
        assert_eq!(HighScores::load(&storage), scores);
    }
}
