//! Single-elimination bracket
//!
//! Round 0 is built from the entrant list padded with byes to the next power of
//! two; each later round has half as many matches, the final has one. Every match
//! knows which slot of which successor its winner moves into.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;

/// One side of a bracket match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    /// Waiting for an earlier match ("TBD")
    Empty,
    /// No opponent; the other side advances
    Bye,
    Player(String),
}

impl Slot {
    pub fn name(&self) -> Option<&str> {
        match self {
            Slot::Player(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Slot::Player(_))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => f.write_str("TBD"),
            Slot::Bye => f.write_str("BYE"),
            Slot::Player(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    /// Even match indices feed the first slot of their successor
    fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Side::Player1
        } else {
            Side::Player2
        }
    }
}

/// Position of a match in the bracket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRef {
    pub round: usize,
    pub index: usize,
}

/// Where a match's winner goes next
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub round: usize,
    pub index: usize,
    pub side: Side,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: String,
    pub player1: Slot,
    pub player2: Slot,
    pub winner: Option<String>,
    pub next: Option<Advance>,
}

impl BracketMatch {
    fn new(round: usize, index: usize, player1: Slot, player2: Slot) -> Self {
        Self {
            id: format!("R{}-M{}", round + 1, index + 1),
            player1,
            player2,
            winner: None,
            next: None,
        }
    }

    /// Both sides are real players and no result yet
    pub fn is_playable(&self) -> bool {
        self.winner.is_none() && self.player1.is_player() && self.player2.is_player()
    }

    fn slot(&self, side: Side) -> &Slot {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::Player1 => &mut self.player1,
            Side::Player2 => &mut self.player2,
        }
    }

    pub fn involves(&self, name: &str) -> bool {
        self.player1.name() == Some(name) || self.player2.name() == Some(name)
    }

    /// The other side's player, if `name` is in this match
    pub fn opponent_of(&self, name: &str) -> Option<&str> {
        if self.player1.name() == Some(name) {
            self.player2.name()
        } else if self.player2.name() == Some(name) {
            self.player1.name()
        } else {
            None
        }
    }

    pub fn loser(&self) -> Option<&str> {
        self.winner.as_deref().and_then(|w| self.opponent_of(w))
    }
}

/// Complete single-elimination tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    rounds: Vec<Vec<BracketMatch>>,
    active: Option<MatchRef>,
}

impl Bracket {
    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Build a bracket from entrants in seeding order.
    ///
    /// The list is padded with byes to the next power of two and consecutive
    /// entries are paired. Byes are resolved immediately.
    pub fn seed<S: AsRef<str>>(players: &[S]) -> Result<Self, TournamentError> {
        if players.len() < 2 {
            return Err(TournamentError::NotEnoughPlayers(players.len()));
        }
        let mut seen = FxHashSet::default();
        for name in players.iter().map(AsRef::as_ref) {
            if name.trim().is_empty() {
                return Err(TournamentError::InvalidName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(TournamentError::DuplicatePlayer(name.to_string()));
            }
        }

        let size = players.len().next_power_of_two();
        let mut entrants: Vec<Slot> = players
            .iter()
            .map(|p| Slot::Player(p.as_ref().to_string()))
            .collect();
        entrants.resize(size, Slot::Bye);

        let first_round: Vec<BracketMatch> = entrants
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| BracketMatch::new(0, i, pair[0].clone(), pair[1].clone()))
            .collect();

        let mut rounds = vec![first_round];
        while rounds[rounds.len() - 1].len() > 1 {
            let round = rounds.len();
            let previous = &mut rounds[round - 1];
            let next_len = previous.len().div_ceil(2);
            for (i, m) in previous.iter_mut().enumerate() {
                m.next = Some(Advance {
                    round,
                    index: i / 2,
                    side: Side::for_index(i),
                });
            }
            let next_round = (0..next_len)
                .map(|i| BracketMatch::new(round, i, Slot::Empty, Slot::Empty))
                .collect();
            rounds.push(next_round);
        }

        let mut bracket = Self {
            rounds,
            active: None,
        };
        for index in 0..bracket.rounds[0].len() {
            bracket.settle_byes(0, index);
        }
        bracket.refresh_active();

        tracing::info!(
            "Seeded bracket: {} players, {} rounds",
            players.len(),
            bracket.round_count()
        );
        Ok(bracket)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn rounds(&self) -> &[Vec<BracketMatch>] {
        &self.rounds
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn get(&self, round: usize, index: usize) -> Option<&BracketMatch> {
        self.rounds.get(round).and_then(|r| r.get(index))
    }

    /// First playable match in round order
    pub fn active_match(&self) -> Option<MatchRef> {
        self.active
    }

    /// Rounds left counting the active one; the final counts as 1
    pub fn rounds_remaining(&self) -> Option<usize> {
        self.active.map(|r| self.rounds.len() - r.round)
    }

    pub fn champion(&self) -> Option<&str> {
        self.rounds.last()?.first()?.winner.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    /// Display name of a round
    pub fn round_name(&self, round: usize) -> String {
        match self.rounds.get(round).map(Vec::len) {
            Some(1) => "FINAL".to_string(),
            Some(2) => "SEMI FINALS".to_string(),
            _ => format!("ROUND {}", round + 1),
        }
    }

    // ========================================================================
    // UPDATES
    // ========================================================================

    /// Record the winner of a playable match and advance them
    pub fn record_win(
        &mut self,
        round: usize,
        index: usize,
        winner: &str,
    ) -> Result<(), TournamentError> {
        let m = self
            .rounds
            .get_mut(round)
            .and_then(|r| r.get_mut(index))
            .ok_or(TournamentError::NoSuchMatch { round, index })?;

        if !m.is_playable() {
            return Err(TournamentError::MatchNotPlayable(m.id.clone()));
        }
        if !m.involves(winner) {
            return Err(TournamentError::WinnerNotInMatch {
                match_id: m.id.clone(),
                winner: winner.to_string(),
            });
        }

        m.winner = Some(winner.to_string());
        tracing::info!("{}: {} advances", m.id, winner);

        self.forward(round, index, Slot::Player(winner.to_string()));
        self.refresh_active();
        Ok(())
    }

    /// Move a settled match's result into its successor
    fn forward(&mut self, round: usize, index: usize, slot: Slot) {
        let Some(next) = self.rounds[round][index].next else {
            return;
        };
        *self.rounds[next.round][next.index].slot_mut(next.side) = slot;
        self.settle_byes(next.round, next.index);
    }

    /// Give a walkover to a player facing a bye; a bye facing a bye advances a bye
    fn settle_byes(&mut self, round: usize, index: usize) {
        let m = &mut self.rounds[round][index];
        if m.winner.is_some() {
            return;
        }
        let advancing = match (&m.player1, &m.player2) {
            (Slot::Player(name), Slot::Bye) | (Slot::Bye, Slot::Player(name)) => {
                let name = name.clone();
                tracing::debug!("{}: {} advances on a bye", m.id, name);
                m.winner = Some(name.clone());
                Slot::Player(name)
            }
            (Slot::Bye, Slot::Bye) => Slot::Bye,
            _ => return,
        };
        self.forward(round, index, advancing);
    }

    fn refresh_active(&mut self) {
        self.active = self.rounds.iter().enumerate().find_map(|(round, matches)| {
            matches
                .iter()
                .position(BracketMatch::is_playable)
                .map(|index| MatchRef { round, index })
        });
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Structural check for brackets loaded from storage
    pub fn validate(&self) -> Result<(), TournamentError> {
        let invalid = |msg: String| Err(TournamentError::InvalidSnapshot(msg));

        let Some(first) = self.rounds.first() else {
            return invalid("bracket has no rounds".to_string());
        };
        if first.is_empty() || !(first.len() * 2).is_power_of_two() {
            return invalid(format!("first round has {} matches", first.len()));
        }
        let expected_rounds = (first.len() * 2).trailing_zeros() as usize;
        if self.rounds.len() != expected_rounds {
            return invalid(format!(
                "bracket has {} rounds, expected {}",
                self.rounds.len(),
                expected_rounds
            ));
        }

        for (round, matches) in self.rounds.iter().enumerate() {
            if round > 0 {
                let expected = self.rounds[round - 1].len().div_ceil(2);
                if matches.len() != expected {
                    return invalid(format!(
                        "round {} has {} matches, expected {}",
                        round + 1,
                        matches.len(),
                        expected
                    ));
                }
            }
            let is_final = round + 1 == self.rounds.len();
            for (index, m) in matches.iter().enumerate() {
                let expected_next = (!is_final).then(|| Advance {
                    round: round + 1,
                    index: index / 2,
                    side: Side::for_index(index),
                });
                if m.next != expected_next {
                    return invalid(format!("{} has a broken successor link", m.id));
                }
                if let Some(winner) = &m.winner {
                    if !m.involves(winner) {
                        return invalid(format!("{} winner {} is not in the match", m.id, winner));
                    }
                }
                let walkover = matches!(
                    (&m.player1, &m.player2),
                    (Slot::Player(_), Slot::Bye) | (Slot::Bye, Slot::Player(_))
                );
                if walkover && m.winner.is_none() {
                    return invalid(format!("{} has an unsettled walkover", m.id));
                }
                if let Some(next) = m.next {
                    let expected_slot = match (&m.winner, &m.player1, &m.player2) {
                        (Some(winner), _, _) => Slot::Player(winner.clone()),
                        (None, Slot::Bye, Slot::Bye) => Slot::Bye,
                        _ => Slot::Empty,
                    };
                    let carried = self.get(next.round, next.index).map(|n| n.slot(next.side));
                    if carried != Some(&expected_slot) {
                        return invalid(format!("{} result is not carried into its successor", m.id));
                    }
                }
            }
        }

        if self.rounds.last().map(Vec::len) != Some(1) {
            return invalid("final round must have exactly one match".to_string());
        }

        let mut recomputed = self.clone();
        recomputed.refresh_active();
        if recomputed.active != self.active {
            return invalid("active match pointer is stale".to_string());
        }
        Ok(())
    }

    /// Entrants in round-0 order, byes skipped
    pub fn entrants(&self) -> Vec<&str> {
        self.rounds[0]
            .iter()
            .flat_map(|m| [m.player1.name(), m.player2.name()])
            .flatten()
            .collect()
    }
}
