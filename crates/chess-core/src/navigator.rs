//! Move navigator: rebuilds the position at any ply of a move list by
//! replaying it from the base position.
//!
//! There is no per-ply cache. Every call replays from the start, so a
//! position is always exactly "base + moves[0..=index]".

use crate::error::ChessError;
use crate::rules::Game;

/// Position after `moves[0..=index]` from the standard start.
/// `index == -1` is the start position itself.
pub fn position_at<S: AsRef<str>>(moves: &[S], index: isize) -> Result<Game, ChessError> {
    position_at_from(&Game::new(), moves, index)
}

/// Position after `moves[0..=index]` from `base`'s base position.
pub fn position_at_from<S: AsRef<str>>(
    base: &Game,
    moves: &[S],
    index: isize,
) -> Result<Game, ChessError> {
    if index < -1 || index >= moves.len() as isize {
        return Err(ChessError::IndexOutOfRange {
            index,
            len: moves.len(),
        });
    }

    let mut game = base.base_game();
    let count = (index + 1) as usize;

    for (ply, san) in moves.iter().take(count).enumerate() {
        let san = san.as_ref();
        if game.play_san(san).is_err() {
            tracing::warn!("Replay stopped at ply {}: '{}' is not legal", ply, san);
            return Err(ChessError::IllegalReplayMove {
                ply,
                san: san.to_string(),
            });
        }
    }

    Ok(game)
}

/// Replay the whole list; the final position.
pub fn replay<S: AsRef<str>>(base: &Game, moves: &[S]) -> Result<Game, ChessError> {
    position_at_from(base, moves, moves.len() as isize - 1)
}
