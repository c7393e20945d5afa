//! Brain Tug Core - Match engine for the two-player trivia duel
//!
//! This crate provides the per-match game logic:
//! - Question generation (math drills, vocabulary gaps)
//! - Player sessions (score, streak, answer buffer, freeze)
//! - Virtual clock with cancellable timers
//! - Match engine state machine (countdown, ticks, tug-of-war, sudden death)
//! - Presentation hooks

pub mod clock;
pub mod config;
pub mod engine;
mod error;
pub mod player;
pub mod presenter;
pub mod question;
pub mod words;

// Re-exports for convenient access
pub use clock::{Scheduler, TimerId};
pub use config::MatchConfig;
pub use engine::{
    EndReason, MatchEngine, MatchOutcome, MatchPhase, MatchState, PlayerSummary,
    TournamentContext, TUG_CENTER, TUG_MAX, TUG_MIN,
};
pub use error::EngineError;
pub use player::{PlayerId, PlayerSession};
pub use presenter::{CountdownStep, Feedback, NullPresenter, Presenter, SoundEvent};
pub use question::{generate, GameMode, Question, QuestionKind};
