/// Error types for the match engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Not a digit: {0}")]
    InvalidDigit(u8),

    #[error("Config file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file malformed: {0}")]
    Json(#[from] serde_json::Error),
}
