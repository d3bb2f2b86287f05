//! Lesson replay: step through a stored opening one ply at a time.
//!
//! The cursor runs over `[-1, len - 1]`, where `-1` is the initial position.
//! Every step rebuilds the displayed position from the full move list with
//! the move navigator.

use chess_core::{history_from_pgn, navigator, ChessError, Game};
use tracing::{debug, warn};

use crate::clients::TrainerApi;
use crate::error::LessonError;
use crate::models::{OpeningDetail, OpeningId, PlayerColor};
use crate::openings::OpeningCache;

#[derive(Debug)]
pub struct Lesson {
    detail: OpeningDetail,
    moves: Vec<String>,
    cursor: isize,
    position: Game,
}

impl Lesson {
    /// Build a lesson, validating the whole PGN up front. A lesson that
    /// cannot be replayed is not built at all.
    pub fn from_detail(detail: OpeningDetail) -> Result<Self, LessonError> {
        let moves = history_from_pgn(&detail.pgn).map_err(|e| {
            warn!("Opening {} is not replayable: {}", detail.summary.id, e);
            LessonError::Unavailable(e)
        })?;
        debug!("Lesson '{}' loaded with {} plies", detail.summary.name, moves.len());

        Ok(Self {
            detail,
            moves,
            cursor: -1,
            position: Game::new(),
        })
    }

    pub async fn fetch(api: &dyn TrainerApi, id: OpeningId) -> Result<Self, LessonError> {
        let detail = api.opening_detail(id).await?;
        Self::from_detail(detail)
    }

    /// Step forward; no-op on the last ply.
    pub fn next(&mut self) -> Result<bool, ChessError> {
        if !self.can_go_next() {
            return Ok(false);
        }
        self.go_to(self.cursor + 1)
    }

    /// Step back; at the initial position it stays there.
    pub fn previous(&mut self) -> Result<bool, ChessError> {
        if !self.can_go_previous() {
            self.go_to(-1)?;
            return Ok(false);
        }
        self.go_to(self.cursor - 1)
    }

    /// Jump to `index`; no-op when it is outside `[-1, len - 1]`.
    pub fn seek(&mut self, index: isize) -> Result<bool, ChessError> {
        if index < -1 || index >= self.moves.len() as isize {
            return Ok(false);
        }
        self.go_to(index)
    }

    pub fn first(&mut self) -> Result<bool, ChessError> {
        self.seek(-1)
    }

    pub fn last(&mut self) -> Result<bool, ChessError> {
        self.seek(self.moves.len() as isize - 1)
    }

    fn go_to(&mut self, index: isize) -> Result<bool, ChessError> {
        self.position = navigator::position_at(&self.moves[..], index)?;
        self.cursor = index;
        Ok(true)
    }

    /// Flip the learned flag: shown immediately, then reconciled with the
    /// service's copy of the opening. Only a rejected toggle reverts it.
    pub async fn toggle_learned(
        &mut self,
        api: &dyn TrainerApi,
        openings: &mut OpeningCache,
    ) -> Result<bool, LessonError> {
        let id = self.detail.summary.id;
        let before = self.detail.summary.is_learned;
        self.detail.summary.is_learned = !before;

        if let Err(e) = openings.toggle_learned(api, id).await {
            self.detail.summary.is_learned = before;
            return Err(e.into());
        }

        match api.opening_detail(id).await {
            Ok(fresh) => self.detail.summary.is_learned = fresh.summary.is_learned,
            Err(e) => warn!("Refetching opening {} after toggle failed: {}", id, e),
        }
        Ok(self.detail.summary.is_learned)
    }

    pub fn id(&self) -> OpeningId {
        self.detail.summary.id
    }

    pub fn name(&self) -> &str {
        &self.detail.summary.name
    }

    /// Board orientation: the side the opening is played for.
    pub fn orientation(&self) -> PlayerColor {
        self.detail.summary.color
    }

    pub fn is_learned(&self) -> bool {
        self.detail.summary.is_learned
    }

    pub fn pgn(&self) -> &str {
        &self.detail.pgn
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn position(&self) -> &Game {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    /// The move that produced the displayed position.
    pub fn current_move(&self) -> Option<&str> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|i| self.moves.get(i))
            .map(String::as_str)
    }

    pub fn can_go_next(&self) -> bool {
        self.cursor < self.moves.len() as isize - 1
    }

    pub fn can_go_previous(&self) -> bool {
        self.cursor > -1
    }
}
