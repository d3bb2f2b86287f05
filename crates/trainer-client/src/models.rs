//! Wire types of the trainer service.

use std::fmt;

use chess_core::Color;
use serde::{Deserialize, Serialize};

pub type OpeningId = i64;

/// Opaque session handle issued by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }

    pub fn opponent(self) -> PlayerColor {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PlayerColor::White => "White",
            PlayerColor::Black => "Black",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PlayerColor> for Color {
    fn from(color: PlayerColor) -> Color {
        match color {
            PlayerColor::White => Color::White,
            PlayerColor::Black => Color::Black,
        }
    }
}

impl From<Color> for PlayerColor {
    fn from(color: Color) -> PlayerColor {
        match color {
            Color::White => PlayerColor::White,
            Color::Black => PlayerColor::Black,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameStartRequest {
    pub user_id: i64,
    pub color: PlayerColor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameStartResponse {
    pub session_id: SessionId,
    /// May already contain the service's first move when the user is black.
    pub initial_fen: String,
    pub message: String,
    #[serde(default)]
    pub color: Option<PlayerColor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveRequest<'a> {
    pub session_id: SessionId,
    pub move_san: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveResponse {
    #[serde(default = "default_legal")]
    pub legal: bool,
    #[serde(default)]
    pub in_theory: bool,
    #[serde(default)]
    pub engine_mode: bool,
    #[serde(default)]
    pub bot_move: Option<String>,
    #[serde(default)]
    pub remaining_openings_count: usize,
    /// Absent means "unchanged", not "no candidates".
    #[serde(default)]
    pub candidate_opening_ids: Option<Vec<OpeningId>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub mistake_made: bool,
}

fn default_legal() -> bool {
    true
}

impl Default for MoveResponse {
    fn default() -> Self {
        Self {
            legal: true,
            in_theory: true,
            engine_mode: false,
            bot_move: None,
            remaining_openings_count: 0,
            candidate_opening_ids: None,
            message: None,
            fen: None,
            mistake_made: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningSummary {
    pub id: OpeningId,
    pub name: String,
    pub is_learned: bool,
    pub color: PlayerColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningDetail {
    #[serde(flatten)]
    pub summary: OpeningSummary,
    pub pgn: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleAck {
    pub status: String,
}

/// FastAPI error body: `{"detail": ...}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}
