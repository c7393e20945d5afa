//! Presentation boundary
//!
//! The engine reports every visible change through [`Presenter`]. All methods
//! default to no-ops so a front end overrides only what it draws.

use crate::engine::MatchOutcome;
use crate::player::PlayerId;
use crate::question::Question;

/// Countdown steps before a match goes live
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownStep {
    Three,
    Two,
    One,
    Fight,
}

impl CountdownStep {
    /// Step for a given number of seconds left before the start
    pub fn from_remaining(remaining: u8) -> Self {
        match remaining {
            0 => CountdownStep::Fight,
            1 => CountdownStep::One,
            2 => CountdownStep::Two,
            _ => CountdownStep::Three,
        }
    }
}

/// Short feedback flash after an answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Wrong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundEvent {
    Countdown,
    MatchStart,
    Correct,
    Wrong,
    Freeze,
    SuddenDeath,
    Win,
}

pub trait Presenter {
    fn render_names(&mut self, _p1: &str, _p2: &str) {}
    fn render_question(&mut self, _player: PlayerId, _question: &Question) {}
    fn render_answer_buffer(&mut self, _player: PlayerId, _buffer: &str) {}
    fn render_score(&mut self, _player: PlayerId, _score: u32) {}
    fn render_timer(&mut self, _seconds_remaining: u32) {}
    fn render_tug(&mut self, _value: i32) {}
    fn show_countdown(&mut self, _step: CountdownStep) {}
    fn show_freeze(&mut self, _player: PlayerId, _frozen: bool) {}
    fn show_combo(&mut self, _player: PlayerId, _active: bool) {}
    fn show_feedback(&mut self, _player: PlayerId, _feedback: Option<Feedback>) {}
    fn show_sudden_death(&mut self) {}
    fn play_sound(&mut self, _event: SoundEvent) {}
    fn show_winner(&mut self, _outcome: &MatchOutcome) {}
}

/// Presenter that ignores everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

/// Presenter that records every notification, for tests and replays
#[derive(Clone, Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<PresenterEvent>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PresenterEvent {
    Countdown(CountdownStep),
    Timer(u32),
    Tug(i32),
    Score(PlayerId, u32),
    Freeze(PlayerId, bool),
    Combo(PlayerId, bool),
    Feedback(PlayerId, Option<Feedback>),
    SuddenDeath,
    Sound(SoundEvent),
    Winner(Option<PlayerId>),
}

impl RecordingPresenter {
    pub fn count(&self, event: &PresenterEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl Presenter for RecordingPresenter {
    fn render_score(&mut self, player: PlayerId, score: u32) {
        self.events.push(PresenterEvent::Score(player, score));
    }

    fn render_timer(&mut self, seconds_remaining: u32) {
        self.events.push(PresenterEvent::Timer(seconds_remaining));
    }

    fn render_tug(&mut self, value: i32) {
        self.events.push(PresenterEvent::Tug(value));
    }

    fn show_countdown(&mut self, step: CountdownStep) {
        self.events.push(PresenterEvent::Countdown(step));
    }

    fn show_freeze(&mut self, player: PlayerId, frozen: bool) {
        self.events.push(PresenterEvent::Freeze(player, frozen));
    }

    fn show_combo(&mut self, player: PlayerId, active: bool) {
        self.events.push(PresenterEvent::Combo(player, active));
    }

    fn show_feedback(&mut self, player: PlayerId, feedback: Option<Feedback>) {
        self.events.push(PresenterEvent::Feedback(player, feedback));
    }

    fn show_sudden_death(&mut self) {
        self.events.push(PresenterEvent::SuddenDeath);
    }

    fn play_sound(&mut self, event: SoundEvent) {
        self.events.push(PresenterEvent::Sound(event));
    }

    fn show_winner(&mut self, outcome: &MatchOutcome) {
        self.events.push(PresenterEvent::Winner(outcome.winner));
    }
}
