use brain_tug_core::EngineError;

/// Error types for tournament setup, bracket updates and match running
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("A tournament needs at least 2 players, got {0}")]
    NotEnoughPlayers(usize),

    #[error("Invalid player name: {0:?}")]
    InvalidName(String),

    #[error("Player already entered: {0}")]
    DuplicatePlayer(String),

    #[error("No player at index {0}")]
    PlayerIndexOutOfRange(usize),

    #[error("Bracket already seeded")]
    AlreadySeeded,

    #[error("Bracket not seeded yet")]
    NotSeeded,

    #[error("No match at round {round}, index {index}")]
    NoSuchMatch { round: usize, index: usize },

    #[error("Match {0} is not playable")]
    MatchNotPlayable(String),

    #[error("{winner} is not playing in match {match_id}")]
    WinnerNotInMatch { match_id: String, winner: String },

    #[error("Tournament is already complete")]
    Complete,

    #[error("Bracket has no playable match and no champion")]
    NoPlayableMatch,

    #[error("Match ended without a winner")]
    UndecidedMatch,

    #[error("Match did not finish after {0} bot actions")]
    MatchStalled(usize),

    #[error("Invalid tournament snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Error types for persistence backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data malformed: {0}")]
    Json(#[from] serde_json::Error),
}
