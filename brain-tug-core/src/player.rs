//! Player identity and per-player session state

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::question::Question;

/// One of the two seats at the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    P1,
    P2,
}

impl PlayerId {
    pub const BOTH: [PlayerId; 2] = [PlayerId::P1, PlayerId::P2];

    pub fn opponent(self) -> Self {
        match self {
            PlayerId::P1 => PlayerId::P2,
            PlayerId::P2 => PlayerId::P1,
        }
    }

    /// Direction this player pulls the rope: P1 toward 0, P2 toward 100
    pub fn pull_sign(self) -> i32 {
        match self {
            PlayerId::P1 => -1,
            PlayerId::P2 => 1,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Mutable state of one player during a match
#[derive(Clone, Debug, Default)]
pub struct PlayerSession {
    pub name: String,
    pub score: u32,
    pub streak: u32,
    /// Wrong answers this match
    pub wrong: u32,
    pub current_question: Option<Question>,
    pub answer_buffer: String,
    pub frozen: bool,
    pub combo: bool,
    /// Timestamps (ms) of the most recent mistakes, oldest first
    recent_mistakes: VecDeque<u64>,
    /// Time taken for each validated answer
    pub answer_times_ms: Vec<u64>,
    question_shown_at: u64,
}

impl PlayerSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Replace the current question and restart its answer timer
    pub fn set_question(&mut self, question: Question, now_ms: u64) {
        self.current_question = Some(question);
        self.question_shown_at = now_ms;
    }

    /// Append a digit; returns true once the buffer holds a full-length answer
    pub fn push_digit(&mut self, digit: u8) -> bool {
        let Some(question) = &self.current_question else {
            return false;
        };
        self.answer_buffer.push(char::from(b'0' + digit));
        self.answer_buffer.len() >= question.answer_len()
    }

    pub fn clear_buffer(&mut self) {
        self.answer_buffer.clear();
    }

    /// Parsed buffer, `None` when empty
    pub fn buffered_answer(&self) -> Option<u32> {
        self.answer_buffer.parse().ok()
    }

    pub fn elapsed_on_question(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.question_shown_at)
    }

    /// Record a mistake, keeping at most `limit` timestamps.
    ///
    /// Returns true when `limit` mistakes fall within `window_ms`; the buffer is
    /// then emptied.
    pub fn record_mistake(&mut self, now_ms: u64, limit: usize, window_ms: u64) -> bool {
        self.recent_mistakes.push_back(now_ms);
        while self.recent_mistakes.len() > limit {
            self.recent_mistakes.pop_front();
        }
        let tripped = self.recent_mistakes.len() == limit
            && self
                .recent_mistakes
                .front()
                .is_some_and(|&oldest| now_ms - oldest <= window_ms);
        if tripped {
            self.recent_mistakes.clear();
        }
        tripped
    }

    pub fn recent_mistakes(&self) -> usize {
        self.recent_mistakes.len()
    }
}

/// Typed storage for both sessions
#[derive(Clone, Debug, Default)]
pub struct PlayerPair {
    sessions: [PlayerSession; 2],
}

impl PlayerPair {
    pub fn new(p1: PlayerSession, p2: PlayerSession) -> Self {
        Self { sessions: [p1, p2] }
    }

    pub fn get(&self, id: PlayerId) -> &PlayerSession {
        &self.sessions[id.index()]
    }

    pub fn get_mut(&mut self, id: PlayerId) -> &mut PlayerSession {
        &mut self.sessions[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Operation, Question};

    #[test]
    fn test_opponent_and_sign() {
        assert_eq!(PlayerId::P1.opponent(), PlayerId::P2);
        assert_eq!(PlayerId::P2.opponent(), PlayerId::P1);
        assert_eq!(PlayerId::P1.pull_sign(), -1);
        assert_eq!(PlayerId::P2.pull_sign(), 1);
    }

    #[test]
    fn test_push_digit_waits_for_full_length() {
        let mut session = PlayerSession::new("Ada");
        session.set_question(Question::math(Operation::Multiply, 7, 8), 0);
        assert!(!session.push_digit(5));
        assert!(session.push_digit(6));
        assert_eq!(session.buffered_answer(), Some(56));
    }

    #[test]
    fn test_push_digit_without_question() {
        let mut session = PlayerSession::new("Ada");
        assert!(!session.push_digit(1));
        assert!(session.answer_buffer.is_empty());
    }

    #[test]
    fn test_mistake_window() {
        let mut session = PlayerSession::new("Ada");
        assert!(!session.record_mistake(0, 3, 3000));
        assert!(!session.record_mistake(1000, 3, 3000));
        assert!(session.record_mistake(2500, 3, 3000));
        assert_eq!(session.recent_mistakes(), 0);
    }

    #[test]
    fn test_mistakes_outside_window_do_not_trip() {
        let mut session = PlayerSession::new("Ada");
        assert!(!session.record_mistake(0, 3, 3000));
        assert!(!session.record_mistake(2000, 3, 3000));
        assert!(!session.record_mistake(3500, 3, 3000));
        assert_eq!(session.recent_mistakes(), 3);
        // Oldest is dropped, the remaining three span 1500ms
        assert!(session.record_mistake(3500, 3, 3000));
    }

    #[test]
    fn test_pair_lookup() {
        let mut pair = PlayerPair::new(PlayerSession::new("A"), PlayerSession::new("B"));
        pair.get_mut(PlayerId::P2).score = 3;
        assert_eq!(pair.get(PlayerId::P1).name, "A");
        assert_eq!(pair.get(PlayerId::P2).score, 3);
    }
}
