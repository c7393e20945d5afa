//! Brain Tug Tournament - Brackets, persistence and bot-driven play
//!
//! This crate layers tournaments on top of the match engine:
//! - Single-elimination brackets with automatic byes
//! - Tournament controller (entrants, seeding, winners log, snapshots)
//! - Storage of the active tournament, history and player statistics
//! - Bot players and a runner that plays matches on virtual time
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Tournament (orchestration)
//! - Level 2: MatchRunner::run (match loop)
//! - Level 3: Bracket updates, bot planning (steps)
//! - Level 4: BotProfile, storage, statistics

pub mod bot;
pub mod bracket;
mod error;
pub mod runner;
pub mod stats;
pub mod store;
pub mod tournament;

pub use bot::BotProfile;
pub use bracket::{Bracket, BracketMatch, MatchRef, Slot};
pub use error::{StoreError, TournamentError};
pub use runner::{MatchHost, MatchRunner};
pub use stats::{PlayerStats, StatsBook};
pub use store::{BlobStore, DirStore, HistoryRecord, MemoryStore, Storage};
pub use tournament::{SeedingPolicy, Tournament, TournamentSnapshot};
