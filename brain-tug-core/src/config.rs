//! Match tuning constants

use serde::{Deserialize, Serialize};

/// Every number that shapes a match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Match length in seconds
    pub match_seconds: u32,
    /// Seconds shown before "FIGHT"
    pub countdown_seconds: u8,
    /// Difficulty rises every this many seconds
    pub ramp_interval_secs: u32,
    pub max_difficulty: u8,
    /// Rope movement for a correct answer
    pub base_power: i32,
    /// Rope movement for a correct answer while on a streak
    pub combo_power: i32,
    /// Streak length at which combo power applies
    pub combo_streak: u32,
    /// Extra power for a scorer who is far behind
    pub comeback_bonus: i32,
    /// Distance from the scorer's losing edge that counts as far behind
    pub comeback_margin: i32,
    /// Rope movement toward the opponent on a wrong answer
    pub wrong_penalty: i32,
    /// Mistakes within `mistake_window_ms` that freeze a player
    pub freeze_mistakes: usize,
    pub mistake_window_ms: u64,
    pub freeze_ms: u64,
    /// How long answer feedback stays visible
    pub feedback_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_seconds: 60,
            countdown_seconds: 3,
            ramp_interval_secs: 15,
            max_difficulty: 5,
            base_power: 8,
            combo_power: 15,
            combo_streak: 3,
            comeback_bonus: 5,
            comeback_margin: 20,
            wrong_penalty: 4,
            freeze_mistakes: 3,
            mistake_window_ms: 3000,
            freeze_ms: 2000,
            feedback_ms: 1000,
        }
    }
}

impl MatchConfig {
    /// Load from a JSON file; missing fields fall back to defaults
    pub fn load(path: &std::path::Path) -> Result<Self, crate::EngineError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Set the match length
    pub fn with_match_seconds(mut self, seconds: u32) -> Self {
        self.match_seconds = seconds;
        self
    }
}
