//! Rules adapter error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Invalid square '{0}'")]
    InvalidSquare(String),

    #[error("Illegal move '{0}'")]
    IllegalMove(String),

    /// A stored move list could not be replayed from its base position.
    #[error("Illegal move '{san}' at ply {ply} while replaying")]
    IllegalReplayMove { ply: usize, san: String },

    #[error("Replay index {index} out of range for {len} moves")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Malformed PGN: {0}")]
    MalformedPgn(String),
}
