//! High score leaderboard
//!
//! Persisted as `leaderboard` (see [`crate::persistence`]), keeps the top 5.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError, Store};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;
/// Longest name stored on the board
pub const MAX_NAME_LEN: usize = 12;
/// Name used when none is entered
pub const DEFAULT_NAME: &str = "Player";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    #[serde(default)]
    pub timestamp: f64,
}

/// High score leaderboard, sorted by score descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

/// Trim, cut to `MAX_NAME_LEN` characters, fall back to `DEFAULT_NAME`
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_end();
    if cleaned.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

impl Leaderboard {
    /// Storage key of the leaderboard document
    pub const STORAGE_KEY: &'static str = "leaderboard";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Index a new score would take; ties go after existing entries
    fn slot_for(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// True when `score` would make the top `MAX_HIGH_SCORES`. Zero never does.
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0 && self.slot_for(score) < MAX_HIGH_SCORES
    }

    /// 1-based rank `score` would get, or None if it misses the board
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        self.qualifies(score).then(|| self.slot_for(score) + 1)
    }

    /// Record a finished run. Returns its 1-based rank, or None when it
    /// misses the board.
    pub fn add(&mut self, name: &str, score: u64, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        let name = sanitize_name(name);
        log::info!("{} scored {} (rank {})", name, score, rank);

        self.entries.insert(
            rank - 1,
            LeaderboardEntry {
                name,
                score,
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

    /// Best score on the board, 0 when empty
    pub fn best_score(&self) -> u64 {
        self.entries.first().map(|e| e.score).unwrap_or(0)
    }

    /// Restore ordering and size after loading a hand-edited or older file
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Load the leaderboard; missing or malformed data starts an empty board
    pub fn load(store: &Store) -> Self {
        let mut board: Self = persistence::load_or_default(store, Self::STORAGE_KEY);
        board.normalize();
        board
    }

    /// Rewrite the whole leaderboard
    pub fn save(&self, store: &Store) -> Result<(), PersistError> {
        persistence::save(store, Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
