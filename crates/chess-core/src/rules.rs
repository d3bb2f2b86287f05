//! Rules adapter over `shakmaty`.
//!
//! `Game` is the only view of chess rules the rest of the workspace has: it
//! applies moves, answers legality questions and reports game-over
//! conditions. Nothing outside this module touches a `shakmaty` position.

use std::collections::{BTreeMap, HashMap};

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Rank, Role, Square};

use crate::error::ChessError;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// One half-move as it was played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// 0-based ply counted from the standard start: white even, black odd.
    pub ply: usize,
    pub san: String,
    pub from: Square,
    pub to: Square,
}

/// Why a game is over, in the order the checks are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEnding {
    Checkmate { winner: Color },
    Stalemate,
    Repetition,
    InsufficientMaterial,
    FiftyMoveRule,
}

impl GameEnding {
    pub fn description(&self) -> String {
        match self {
            GameEnding::Checkmate { winner } => {
                format!("Checkmate! {} wins.", color_name(*winner))
            }
            GameEnding::Stalemate => "Stalemate! Game drawn.".to_string(),
            GameEnding::Repetition => "Draw by repetition.".to_string(),
            GameEnding::InsufficientMaterial => "Draw by insufficient material.".to_string(),
            GameEnding::FiftyMoveRule => "Game drawn.".to_string(),
        }
    }
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// A position together with the moves that led to it from a base position.
#[derive(Debug, Clone)]
pub struct Game {
    base: Chess,
    position: Chess,
    moves: Vec<MoveRecord>,
    // normalized FEN -> occurrences, for threefold repetition
    seen: HashMap<String, u32>,
}

impl Default for Game {
    fn default() -> Self {
        Self::from_position(Chess::default())
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a game from an arbitrary FEN. The FEN becomes the base position.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let invalid = |reason: String| ChessError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };

        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self::from_position(position))
    }

    fn from_position(position: Chess) -> Self {
        let mut seen = HashMap::new();
        seen.insert(repetition_key(&position), 1);
        Self {
            base: position.clone(),
            position,
            moves: Vec::new(),
            seen,
        }
    }

    /// A fresh game at this game's base position, with no history.
    pub fn base_game(&self) -> Game {
        Self::from_position(self.base.clone())
    }

    pub fn fen(&self) -> String {
        fen_of(&self.position)
    }

    pub fn base_fen(&self) -> String {
        fen_of(&self.base)
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn sans(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.san.clone()).collect()
    }

    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.moves.last().map(|m| (m.from, m.to))
    }

    /// Apply a SAN move to a copy of this game.
    pub fn apply_san(&self, san: &str) -> Result<Game, ChessError> {
        let mut next = self.clone();
        next.play_san(san)?;
        Ok(next)
    }

    /// Apply a move given by its endpoints to a copy of this game.
    pub fn apply_squares(&self, from: Square, to: Square) -> Result<Game, ChessError> {
        let mut next = self.clone();
        next.play_squares(from, to)?;
        Ok(next)
    }

    pub fn play_san(&mut self, san: &str) -> Result<&MoveRecord, ChessError> {
        let illegal = || ChessError::IllegalMove(san.to_string());

        let parsed: SanPlus = san.trim().parse().map_err(|_| illegal())?;
        let mv = parsed.san.to_move(&self.position).map_err(|_| illegal())?;

        Ok(self.push(mv))
    }

    /// Play a move from board endpoints. Castling uses the king's destination
    /// square (e1g1) and pawns reaching the last rank promote to a queen.
    pub fn play_squares(&mut self, from: Square, to: Square) -> Result<&MoveRecord, ChessError> {
        let promotion = match self.position.board().piece_at(from) {
            Some(piece)
                if piece.role == Role::Pawn
                    && (to.rank() == Rank::Eighth || to.rank() == Rank::First) =>
            {
                Some(Role::Queen)
            }
            _ => None,
        };

        let uci = UciMove::Normal { from, to, promotion };
        let mv = uci
            .to_move(&self.position)
            .map_err(|_| ChessError::IllegalMove(format!("{from}{to}")))?;

        Ok(self.push(mv))
    }

    fn push(&mut self, mv: Move) -> &MoveRecord {
        let ply = ply_of(&self.position);
        let (from, to) = endpoints(&mv);
        let san = San::from_move(&self.position, mv.clone());

        self.position.play_unchecked(mv);

        let suffix = if self.position.is_checkmate() {
            "#"
        } else if self.position.is_check() {
            "+"
        } else {
            ""
        };
        *self.seen.entry(repetition_key(&self.position)).or_insert(0) += 1;

        let index = self.moves.len();
        self.moves.push(MoveRecord {
            ply,
            san: format!("{san}{suffix}"),
            from,
            to,
        });
        &self.moves[index]
    }

    /// Origin square -> reachable squares for the side to move.
    pub fn legal_destinations(&self) -> BTreeMap<Square, Vec<Square>> {
        let mut dests: BTreeMap<Square, Vec<Square>> = BTreeMap::new();
        for mv in self.position.legal_moves() {
            let (from, to) = endpoints(&mv);
            let targets = dests.entry(from).or_default();
            // promotions yield one move per role
            if !targets.contains(&to) {
                targets.push(to);
            }
        }
        for targets in dests.values_mut() {
            targets.sort();
        }
        dests
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.seen
            .get(&repetition_key(&self.position))
            .is_some_and(|count| *count >= 3)
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.position.halfmoves() >= 100
    }

    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_threefold_repetition()
            || self.is_insufficient_material()
            || self.is_fifty_move_draw()
    }

    pub fn is_game_over(&self) -> bool {
        self.ending().is_some()
    }

    pub fn ending(&self) -> Option<GameEnding> {
        if self.is_checkmate() {
            Some(GameEnding::Checkmate {
                winner: self.turn().other(),
            })
        } else if self.is_stalemate() {
            Some(GameEnding::Stalemate)
        } else if self.is_threefold_repetition() {
            Some(GameEnding::Repetition)
        } else if self.is_insufficient_material() {
            Some(GameEnding::InsufficientMaterial)
        } else if self.is_fifty_move_draw() {
            Some(GameEnding::FiftyMoveRule)
        } else {
            None
        }
    }
}

/// Parse a square name such as `e4`.
pub fn parse_square(name: &str) -> Result<Square, ChessError> {
    name.trim()
        .parse()
        .map_err(|_| ChessError::InvalidSquare(name.to_string()))
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

fn fen_of(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

fn repetition_key(position: &Chess) -> String {
    normalize_fen(&fen_of(position))
}

fn ply_of(position: &Chess) -> usize {
    let full_moves = position.fullmoves().get() as usize;
    let black = usize::from(position.turn() == Color::Black);
    (full_moves - 1) * 2 + black
}

fn endpoints(mv: &Move) -> (Square, Square) {
    match mv.to_uci(CastlingMode::Standard) {
        UciMove::Normal { from, to, .. } => (from, to),
        _ => (mv.from().unwrap_or_else(|| mv.to()), mv.to()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        parse_square(name).unwrap()
    }

    #[test]
    fn test_apply_squares_updates_copy_only() {
        let game = Game::new();
        let next = game.apply_squares(sq("e2"), sq("e4")).unwrap();

        assert_eq!(game.fen(), STANDARD_START_FEN);
        assert_eq!(
            next.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(next.sans(), vec!["e4"]);
        assert_eq!(next.last_move(), Some((sq("e2"), sq("e4"))));
        assert_eq!(next.turn(), Color::Black);
    }

    #[test]
    fn test_play_san_records_move_from_prior_position() {
        let mut game = Game::new();
        let record = game.play_san("Nf3").unwrap().clone();

        assert_eq!(record.san, "Nf3");
        assert_eq!((record.from, record.to), (sq("g1"), sq("f3")));
        assert_eq!(
            game.fen(),
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1"
        );
        assert_eq!(game.base_fen(), STANDARD_START_FEN);
    }

    #[test]
    fn test_illegal_move_rejected() {
        let game = Game::new();
        assert!(matches!(
            game.apply_squares(sq("e2"), sq("e5")),
            Err(ChessError::IllegalMove(_))
        ));
        assert!(matches!(game.apply_san("Ke2"), Err(ChessError::IllegalMove(_))));
        assert!(matches!(game.apply_san("garbage"), Err(ChessError::IllegalMove(_))));
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_castling_from_king_destination() {
        let mut game = Game::new();
        for san in ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"] {
            game.play_san(san).unwrap();
        }
        let record = game.play_squares(sq("e1"), sq("g1")).unwrap();
        assert_eq!(record.san, "O-O");
        assert_eq!(record.ply, 6);
        assert_eq!(game.last_move(), Some((sq("e1"), sq("g1"))));
    }

    #[test]
    fn test_pawn_promotes_to_queen() {
        let mut game = Game::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let record = game.play_squares(sq("e7"), sq("e8")).unwrap();
        assert_eq!(record.san, "e8=Q");
    }

    #[test]
    fn test_check_suffix_recorded() {
        let mut game = Game::new();
        for san in ["e4", "f5"] {
            game.play_san(san).unwrap();
        }
        let record = game.play_san("Qh5+").unwrap();
        assert_eq!(record.san, "Qh5+");
        assert!(game.is_check());
    }

    #[test]
    fn test_legal_destinations_at_start() {
        let dests = Game::new().legal_destinations();
        assert_eq!(dests.len(), 10);
        assert_eq!(dests[&sq("e2")], vec![sq("e3"), sq("e4")]);
        assert_eq!(dests[&sq("g1")].len(), 2);
    }

    #[test]
    fn test_checkmate_detected() {
        let mut game = Game::new();
        for san in ["f3", "e5", "g4", "Qh4#"] {
            game.play_san(san).unwrap();
        }
        assert!(game.is_checkmate());
        assert_eq!(
            game.ending(),
            Some(GameEnding::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(game.ending().unwrap().description(), "Checkmate! Black wins.");
    }

    #[test]
    fn test_stalemate_detected() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.ending(), Some(GameEnding::Stalemate));
        assert!(game.is_draw());
    }

    #[test]
    fn test_insufficient_material_detected() {
        let game = Game::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(game.ending(), Some(GameEnding::InsufficientMaterial));
    }

    #[test]
    fn test_threefold_repetition_detected() {
        let mut game = Game::new();
        let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1"];
        for san in shuffle {
            game.play_san(san).unwrap();
        }
        assert!(!game.is_threefold_repetition());

        game.play_san("Ng8").unwrap();
        assert!(game.is_threefold_repetition());
        assert_eq!(game.ending(), Some(GameEnding::Repetition));
    }

    #[test]
    fn test_ply_index_from_black_base() {
        let mut game =
            Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert_eq!(game.play_san("e5").unwrap().ply, 1);
        assert_eq!(game.play_san("Nf3").unwrap().ply, 2);
        assert_eq!(game.base_game().fen(), game.base_fen());
        assert!(game.base_game().history().is_empty());
    }

    #[test]
    fn test_invalid_fen() {
        assert!(matches!(
            Game::from_fen("not a fen"),
            Err(ChessError::InvalidFen { .. })
        ));
    }

    #[test]
    fn test_normalize_fen() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let normalized = normalize_fen(fen);
        assert_eq!(normalized, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3");
    }
}
