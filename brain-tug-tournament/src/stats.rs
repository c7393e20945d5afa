//! Per-player statistics across matches
//!
//! Feeds the classroom dashboard with accuracy, speed and win record per name.

use brain_tug_core::{MatchOutcome, PlayerId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Running totals for one player
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub matches: u32,
    pub wins: u32,
    pub correct: u32,
    pub wrong: u32,
    /// Sum of all answer times
    pub answer_ms_total: u64,
    /// Number of timed answers
    pub answers: u32,
}

impl PlayerStats {
    /// Fraction of answers that were correct
    pub fn accuracy(&self) -> f32 {
        let total = self.correct + self.wrong;
        if total == 0 {
            0.0
        } else {
            self.correct as f32 / total as f32
        }
    }

    pub fn win_rate(&self) -> f32 {
        if self.matches == 0 {
            0.0
        } else {
            self.wins as f32 / self.matches as f32
        }
    }

    pub fn avg_answer_ms(&self) -> f32 {
        if self.answers == 0 {
            0.0
        } else {
            self.answer_ms_total as f32 / self.answers as f32
        }
    }
}

/// Statistics for every player seen so far
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsBook {
    players: FxHashMap<String, PlayerStats>,
}

impl StatsBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PlayerStats> {
        self.players.get(name)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Fold both players' numbers from a finished match into the book
    pub fn record_match(&mut self, outcome: &MatchOutcome) {
        for player in PlayerId::BOTH {
            let summary = outcome.summary(player);
            let stats = self.players.entry(summary.name.clone()).or_default();
            stats.matches += 1;
            if outcome.winner == Some(player) {
                stats.wins += 1;
            }
            stats.correct += summary.score;
            stats.wrong += summary.wrong;
            stats.answer_ms_total += summary.answer_times_ms.iter().sum::<u64>();
            stats.answers += summary.answer_times_ms.len() as u32;
        }
    }

    /// Seeding strength: win rate, then accuracy
    pub fn rating(&self, name: &str) -> (f32, f32) {
        self.get(name)
            .map(|s| (s.win_rate(), s.accuracy()))
            .unwrap_or((0.0, 0.0))
    }

    /// All players sorted by wins, then accuracy (descending)
    pub fn leaderboard(&self) -> Vec<(&str, &PlayerStats)> {
        let mut rows: Vec<_> = self
            .players
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
            .collect();
        rows.sort_by(|a, b| {
            b.1.wins
                .cmp(&a.1.wins)
                .then_with(|| {
                    b.1.accuracy()
                        .partial_cmp(&a.1.accuracy())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.0.cmp(b.0))
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_tug_core::{EndReason, PlayerSummary};

    fn outcome(winner: Option<PlayerId>) -> MatchOutcome {
        MatchOutcome {
            winner,
            reason: EndReason::Knockout,
            final_tug: 0,
            duration_ms: 20_000,
            p1: PlayerSummary {
                name: "Ada".into(),
                score: 6,
                wrong: 2,
                answer_times_ms: vec![1000, 2000, 1500, 500, 1000, 2000, 1000, 1000],
            },
            p2: PlayerSummary {
                name: "Bob".into(),
                score: 3,
                wrong: 1,
                answer_times_ms: vec![3000, 3000, 3000, 3000],
            },
        }
    }

    #[test]
    fn test_record_match() {
        let mut book = StatsBook::new();
        book.record_match(&outcome(Some(PlayerId::P1)));

        let ada = book.get("Ada").unwrap();
        assert_eq!(ada.matches, 1);
        assert_eq!(ada.wins, 1);
        assert_eq!(ada.accuracy(), 0.75);
        assert_eq!(ada.avg_answer_ms(), 1250.0);

        let bob = book.get("Bob").unwrap();
        assert_eq!(bob.wins, 0);
        assert_eq!(bob.avg_answer_ms(), 3000.0);
    }

    #[test]
    fn test_draw_counts_no_wins() {
        let mut book = StatsBook::new();
        book.record_match(&outcome(None));
        assert_eq!(book.get("Ada").unwrap().wins, 0);
        assert_eq!(book.get("Bob").unwrap().wins, 0);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_leaderboard_order() {
        let mut book = StatsBook::new();
        book.record_match(&outcome(Some(PlayerId::P2)));
        book.record_match(&outcome(Some(PlayerId::P2)));
        let board = book.leaderboard();
        assert_eq!(board[0].0, "Bob");
        assert_eq!(board[1].0, "Ada");
        assert_eq!(book.rating("Bob"), (1.0, 0.75));
        assert_eq!(book.rating("Nobody"), (0.0, 0.0));
    }

    #[test]
    fn test_empty_stats() {
        let stats = PlayerStats::default();
        assert_eq!(stats.accuracy(), 0.0);
        assert_eq!(stats.win_rate(), 0.0);
        assert_eq!(stats.avg_answer_ms(), 0.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut book = StatsBook::new();
        book.record_match(&outcome(Some(PlayerId::P1)));
        let json = serde_json::to_string(&book).unwrap();
        let restored: StatsBook = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get("Ada"), book.get("Ada"));
    }
}
