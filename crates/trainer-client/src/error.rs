//! Client error types

use chess_core::ChessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Chess(#[from] ChessError),
}

#[derive(Error, Debug)]
pub enum LessonError {
    /// The stored opening cannot be replayed; nothing of it is shown.
    #[error("Opening not available for replay: {0}")]
    Unavailable(#[source] ChessError),

    #[error(transparent)]
    Remote(#[from] ClientError),
}
