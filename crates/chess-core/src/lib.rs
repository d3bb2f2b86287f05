//! Chess rules adapter, move navigator and PGN move extraction shared by the
//! trainer client.

pub mod error;
pub mod navigator;
pub mod pgn;
pub mod rules;

pub use error::ChessError;
pub use navigator::{position_at, position_at_from, replay};
pub use pgn::history_from_pgn;
pub use rules::{parse_square, Game, GameEnding, MoveRecord, STANDARD_START_FEN};

pub use shakmaty::{Color, Square};
