//! Tournament controller - setup, progress, and resumable snapshots
//!
//! Level 1 - Orchestration over the bracket

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use brain_tug_core::{GameMode, MatchOutcome, TournamentContext};

use crate::bracket::{Bracket, BracketMatch, MatchRef};
use crate::error::TournamentError;
use crate::runner::MatchHost;
use crate::stats::StatsBook;
use crate::store::HistoryRecord;

/// How entrants are ordered before pairing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedingPolicy {
    /// Random order
    #[default]
    Shuffle,
    /// Order of entry
    AsEntered,
    /// Strongest first, by recorded stats
    ByRating,
}

/// Everything needed to resume a tournament
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub mode: GameMode,
    pub players: Vec<String>,
    pub bracket: Option<Bracket>,
    pub active: Option<MatchRef>,
    pub winners_log: Vec<String>,
}

impl TournamentSnapshot {
    /// Shape check before resuming
    pub fn validate(&self) -> Result<(), TournamentError> {
        let Some(bracket) = &self.bracket else {
            if self.active.is_some() || !self.winners_log.is_empty() {
                return Err(TournamentError::InvalidSnapshot(
                    "progress recorded without a bracket".to_string(),
                ));
            }
            return Ok(());
        };

        bracket.validate()?;
        if bracket.active_match() != self.active {
            return Err(TournamentError::InvalidSnapshot(
                "active match does not match the bracket".to_string(),
            ));
        }
        for name in bracket.entrants() {
            if !self.players.iter().any(|p| p == name) {
                return Err(TournamentError::InvalidSnapshot(format!(
                    "{} is in the bracket but not entered",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// A single-elimination tournament in progress
#[derive(Clone, Debug)]
pub struct Tournament {
    mode: GameMode,
    players: Vec<String>,
    bracket: Option<Bracket>,
    /// Newest first
    winners_log: Vec<String>,
}

impl Tournament {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            players: Vec::new(),
            bracket: None,
            winners_log: Vec::new(),
        }
    }

    // ========================================================================
    // SETUP
    // ========================================================================

    /// Enter a player before the bracket is seeded
    pub fn add_player(&mut self, name: &str) -> Result<(), TournamentError> {
        if self.bracket.is_some() {
            return Err(TournamentError::AlreadySeeded);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidName(name.to_string()));
        }
        if self.players.iter().any(|p| p == name) {
            return Err(TournamentError::DuplicatePlayer(name.to_string()));
        }
        self.players.push(name.to_string());
        Ok(())
    }

    pub fn remove_player(&mut self, index: usize) -> Result<String, TournamentError> {
        if self.bracket.is_some() {
            return Err(TournamentError::AlreadySeeded);
        }
        if index >= self.players.len() {
            return Err(TournamentError::PlayerIndexOutOfRange(index));
        }
        Ok(self.players.remove(index))
    }

    /// Order the entrants by `policy` and build the bracket
    pub fn seed_bracket<R: Rng>(
        &mut self,
        policy: SeedingPolicy,
        rng: &mut R,
        stats: &StatsBook,
    ) -> Result<&Bracket, TournamentError> {
        if self.bracket.is_some() {
            return Err(TournamentError::AlreadySeeded);
        }
        if self.players.len() < 2 {
            return Err(TournamentError::NotEnoughPlayers(self.players.len()));
        }

        let mut order = self.players.clone();
        match policy {
            SeedingPolicy::Shuffle => order.shuffle(rng),
            SeedingPolicy::AsEntered => {}
            SeedingPolicy::ByRating => order.sort_by(|a, b| {
                stats
                    .rating(b)
                    .partial_cmp(&stats.rating(a))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }

        let bracket = Bracket::seed(&order)?;
        Ok(self.bracket.insert(bracket))
    }

    /// Seed in entry order
    pub fn seed_in_order(&mut self) -> Result<&Bracket, TournamentError> {
        self.seed_bracket(SeedingPolicy::AsEntered, &mut rand::thread_rng(), &StatsBook::new())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn winners_log(&self) -> &[String] {
        &self.winners_log
    }

    /// Next match to play
    pub fn active_match(&self) -> Option<(MatchRef, &BracketMatch)> {
        let bracket = self.bracket.as_ref()?;
        let at = bracket.active_match()?;
        bracket.get(at.round, at.index).map(|m| (at, m))
    }

    /// Difficulty context for the active match
    pub fn context(&self) -> Option<TournamentContext> {
        self.bracket
            .as_ref()?
            .rounds_remaining()
            .map(|rounds_remaining| TournamentContext { rounds_remaining })
    }

    pub fn champion(&self) -> Option<&str> {
        self.bracket.as_ref()?.champion()
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    // ========================================================================
    // PROGRESS
    // ========================================================================

    /// Record a result and log it
    pub fn record_match_result(
        &mut self,
        round: usize,
        index: usize,
        winner: &str,
    ) -> Result<(), TournamentError> {
        let bracket = self.bracket.as_mut().ok_or(TournamentError::NotSeeded)?;
        bracket.record_win(round, index, winner)?;

        let loser = bracket
            .get(round, index)
            .and_then(BracketMatch::loser)
            .unwrap_or_default()
            .to_string();
        self.winners_log
            .insert(0, format!("Round {}: {} def. {}", round + 1, winner, loser));

        if let Some(champion) = bracket.champion() {
            tracing::info!("Tournament complete, champion: {}", champion);
        }
        Ok(())
    }

    /// Play the active match through `host` and record the winner
    pub fn play_next<H: MatchHost>(&mut self, host: &mut H) -> Result<MatchOutcome, TournamentError> {
        let (at, m) = match self.active_match() {
            Some(active) => active,
            None if self.bracket.is_none() => return Err(TournamentError::NotSeeded),
            None if self.is_complete() => return Err(TournamentError::Complete),
            None => return Err(TournamentError::NoPlayableMatch),
        };
        let p1 = m.player1.to_string();
        let p2 = m.player2.to_string();
        let context = self.context();

        tracing::info!("{}: {} vs {}", m.id, p1, p2);
        let outcome = host.play_match(&p1, &p2, context)?;
        let winner = outcome
            .winner_name()
            .ok_or(TournamentError::UndecidedMatch)?
            .to_string();

        self.record_match_result(at.round, at.index, &winner)?;
        Ok(outcome)
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    pub fn snapshot(&self) -> TournamentSnapshot {
        TournamentSnapshot {
            mode: self.mode,
            players: self.players.clone(),
            bracket: self.bracket.clone(),
            active: self.bracket.as_ref().and_then(Bracket::active_match),
            winners_log: self.winners_log.clone(),
        }
    }

    /// Rebuild from a saved snapshot after validating it
    pub fn resume_from(snapshot: TournamentSnapshot) -> Result<Self, TournamentError> {
        snapshot.validate()?;
        Ok(Self {
            mode: snapshot.mode,
            players: snapshot.players,
            bracket: snapshot.bracket,
            winners_log: snapshot.winners_log,
        })
    }

    /// History entry for a finished tournament
    pub fn history_record(&self) -> Option<HistoryRecord> {
        Some(HistoryRecord {
            finished_at: Utc::now(),
            mode: self.mode,
            champion: self.champion()?.to_string(),
            players: self.players.clone(),
            log: self.winners_log.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_tug_core::{EndReason, PlayerId, PlayerSummary};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Host where player 1 always wins
    struct FirstSeatWins {
        contexts: Vec<Option<TournamentContext>>,
    }

    impl MatchHost for FirstSeatWins {
        fn play_match(
            &mut self,
            p1: &str,
            p2: &str,
            context: Option<TournamentContext>,
        ) -> Result<MatchOutcome, TournamentError> {
            self.contexts.push(context);
            let summary = |name: &str| PlayerSummary {
                name: name.to_string(),
                score: 0,
                wrong: 0,
                answer_times_ms: vec![],
            };
            Ok(MatchOutcome {
                winner: Some(PlayerId::P1),
                reason: EndReason::Knockout,
                final_tug: 0,
                duration_ms: 1000,
                p1: summary(p1),
                p2: summary(p2),
            })
        }
    }

    fn entered(names: &[&str]) -> Tournament {
        let mut tournament = Tournament::new(GameMode::Math);
        for name in names {
            tournament.add_player(name).unwrap();
        }
        tournament
    }

    #[test]
    fn test_add_and_remove_players() {
        let mut tournament = Tournament::new(GameMode::Math);
        tournament.add_player("  Ada ").unwrap();
        tournament.add_player("Bob").unwrap();
        assert_eq!(tournament.players(), &["Ada".to_string(), "Bob".to_string()]);

        assert!(matches!(tournament.add_player(""), Err(TournamentError::InvalidName(_))));
        assert!(matches!(
            tournament.add_player("Ada"),
            Err(TournamentError::DuplicatePlayer(_))
        ));
        assert!(matches!(
            tournament.remove_player(5),
            Err(TournamentError::PlayerIndexOutOfRange(5))
        ));
        assert_eq!(tournament.remove_player(0).unwrap(), "Ada");
        assert_eq!(tournament.players().len(), 1);
    }

    #[test]
    fn test_seed_requires_two_players() {
        let mut tournament = entered(&["Solo"]);
        assert!(matches!(
            tournament.seed_in_order(),
            Err(TournamentError::NotEnoughPlayers(1))
        ));
    }

    #[test]
    fn test_no_changes_after_seeding() {
        let mut tournament = entered(&["A", "B"]);
        tournament.seed_in_order().unwrap();
        assert!(matches!(tournament.add_player("C"), Err(TournamentError::AlreadySeeded)));
        assert!(matches!(tournament.remove_player(0), Err(TournamentError::AlreadySeeded)));
        assert!(matches!(tournament.seed_in_order(), Err(TournamentError::AlreadySeeded)));
    }

    #[test]
    fn test_shuffle_keeps_everyone() {
        let mut tournament = entered(&["A", "B", "C", "D", "E"]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let bracket = tournament
            .seed_bracket(SeedingPolicy::Shuffle, &mut rng, &StatsBook::new())
            .unwrap();
        let mut entrants = bracket.entrants();
        entrants.sort();
        assert_eq!(entrants, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_seed_by_rating() {
        let mut stats = StatsBook::new();
        let mut host = FirstSeatWins { contexts: vec![] };
        stats.record_match(&host.play_match("Cy", "Ada", None).unwrap());

        let mut tournament = entered(&["Ada", "Bob", "Cy"]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let bracket = tournament
            .seed_bracket(SeedingPolicy::ByRating, &mut rng, &stats)
            .unwrap();
        assert_eq!(bracket.entrants()[0], "Cy");
    }

    #[test]
    fn test_play_to_champion() {
        let mut tournament = entered(&["A", "B", "C", "D", "E"]);
        tournament.seed_in_order().unwrap();
        let mut host = FirstSeatWins { contexts: vec![] };

        while !tournament.is_complete() {
            tournament.play_next(&mut host).unwrap();
        }
        assert_eq!(tournament.champion(), Some("A"));
        assert_eq!(tournament.winners_log()[0], "Round 3: A def. E");
        assert_eq!(tournament.winners_log().len(), 4);

        // Two first-round matches, then the semi, then the final
        let rounds: Vec<usize> = host
            .contexts
            .iter()
            .map(|c| c.unwrap().rounds_remaining)
            .collect();
        assert_eq!(rounds, vec![3, 3, 2, 1]);

        assert!(matches!(tournament.play_next(&mut host), Err(TournamentError::Complete)));
        let record = tournament.history_record().unwrap();
        assert_eq!(record.champion, "A");
    }

    #[test]
    fn test_play_next_before_seeding() {
        let mut tournament = entered(&["A", "B"]);
        let mut host = FirstSeatWins { contexts: vec![] };
        assert!(matches!(tournament.play_next(&mut host), Err(TournamentError::NotSeeded)));
        assert!(tournament.history_record().is_none());
    }

    #[test]
    fn test_play_next_on_stuck_bracket() {
        let mut tournament = entered(&["A", "B"]);
        tournament.seed_in_order().unwrap();

        // The final lost its second entrant, so nothing can be played
        let mut value = serde_json::to_value(tournament.bracket().unwrap()).unwrap();
        value["rounds"][0][0]["player2"] = serde_json::json!("Empty");
        value["active"] = serde_json::Value::Null;
        tournament.bracket = Some(serde_json::from_value(value).unwrap());

        let mut host = FirstSeatWins { contexts: vec![] };
        assert!(matches!(
            tournament.play_next(&mut host),
            Err(TournamentError::NoPlayableMatch)
        ));
        assert!(host.contexts.is_empty());
    }

    #[test]
    fn test_snapshot_resume() {
        let mut tournament = entered(&["A", "B", "C"]);
        tournament.seed_in_order().unwrap();
        tournament.record_match_result(0, 0, "B").unwrap();

        let snapshot = tournament.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = Tournament::resume_from(serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(restored.winners_log(), tournament.winners_log());
        let (at, m) = restored.active_match().unwrap();
        assert_eq!(at, MatchRef { round: 1, index: 0 });
        assert!(m.involves("B") && m.involves("C"));
    }

    #[test]
    fn test_resume_rejects_bad_snapshot() {
        let mut tournament = entered(&["A", "B", "C"]);
        tournament.seed_in_order().unwrap();

        let mut snapshot = tournament.snapshot();
        snapshot.players.retain(|p| p != "C");
        assert!(matches!(
            Tournament::resume_from(snapshot),
            Err(TournamentError::InvalidSnapshot(_))
        ));

        let mut snapshot = tournament.snapshot();
        snapshot.active = None;
        assert!(Tournament::resume_from(snapshot).is_err());

        let snapshot = TournamentSnapshot {
            mode: GameMode::Math,
            players: vec![],
            bracket: None,
            active: None,
            winners_log: vec!["Round 1: X def. Y".into()],
        };
        assert!(Tournament::resume_from(snapshot).is_err());
    }

    #[test]
    fn test_resume_rejects_unfinishable_bracket() {
        // A one-match round trailing the final
        let mut tournament = entered(&["A", "B"]);
        tournament.seed_in_order().unwrap();
        let mut value = serde_json::to_value(tournament.snapshot()).unwrap();
        value["bracket"]["rounds"][0][0]["next"] =
            serde_json::json!({ "round": 1, "index": 0, "side": "Player1" });
        let extra = serde_json::json!({
            "id": "R2-M1",
            "player1": "Empty",
            "player2": "Empty",
            "winner": null,
            "next": null,
        });
        value["bracket"]["rounds"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!([extra]));
        let snapshot: TournamentSnapshot = serde_json::from_value(value).unwrap();
        assert!(matches!(
            Tournament::resume_from(snapshot),
            Err(TournamentError::InvalidSnapshot(_))
        ));

        // C's walkover cleared, so the final would never get its second player
        let mut tournament = entered(&["A", "B", "C"]);
        tournament.seed_in_order().unwrap();
        let mut value = serde_json::to_value(tournament.snapshot()).unwrap();
        value["bracket"]["rounds"][0][1]["winner"] = serde_json::Value::Null;
        value["bracket"]["rounds"][1][0]["player2"] = serde_json::json!("Empty");
        let snapshot: TournamentSnapshot = serde_json::from_value(value).unwrap();
        assert!(matches!(
            Tournament::resume_from(snapshot),
            Err(TournamentError::InvalidSnapshot(_))
        ));
    }
}
