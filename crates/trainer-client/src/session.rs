//! Practice-session controller.
//!
//! Holds the local, optimistic view of one game against the trainer service:
//! `Setup -> Active(Theory) <-> Active(Engine) -> Terminal`. A user move is
//! applied locally as soon as the rules adapter accepts it, then reconciled
//! with the service's answer. A failed round trip never rolls the move back.
//!
//! Moves go through two steps so the suspension point is visible:
//! [`SessionController::begin_user_move`] applies the move and hands out a
//! [`PendingMove`]; [`SessionController::complete_user_move`] takes the
//! service's result for that ticket. Tickets from an abandoned session are
//! discarded.

use std::collections::BTreeMap;

use chess_core::{navigator, ChessError, Color, Game, GameEnding, MoveRecord, Square};
use tracing::{debug, error, info, warn};

use crate::candidates::CandidateTracker;
use crate::clients::TrainerApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{
    GameStartResponse, MoveResponse, OpeningId, OpeningSummary, PlayerColor, SessionId,
};
use crate::openings::OpeningCache;

pub const WELCOME_STATUS: &str = "Welcome. Press Start to begin.";
pub const THINKING_STATUS: &str = "Thinking...";
pub const YOUR_TURN_STATUS: &str = "Your turn";
pub const MISTAKE_STATUS: &str = "Mistake!";
pub const START_FAILED_STATUS: &str = "Error: Could not connect to backend.";
pub const OFFLINE_STATUS: &str = "Connection problem: your move is kept locally; retry to sync.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The service answers from the user's learned lines.
    Theory,
    /// Theory is exhausted; the service answers with its engine.
    Engine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Game(GameEnding),
    Resigned,
    /// The service sent something the local rules could not follow.
    Desync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Active(Mode),
    Terminal(Ending),
}

/// What became of a move submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Precondition failed or the move was illegal; nothing changed.
    Ignored,
    Synced,
    /// The service could not be reached; the local move stands.
    Offline,
    Desynced,
    /// The answer belonged to a session that is no longer current.
    Discarded,
}

/// A locally applied move waiting for the service's answer.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingMove {
    session_id: SessionId,
    ply: usize,
    san: String,
}

impl PendingMove {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn san(&self) -> &str {
        &self.san
    }
}

/// A learned opening of the player's color and whether it is still in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOpening<'a> {
    pub opening: &'a OpeningSummary,
    pub live: bool,
}

#[derive(Debug)]
struct Session {
    id: SessionId,
    player: PlayerColor,
    game: Game,
    mode: Mode,
    candidates: CandidateTracker,
    // service's view after its last answer
    in_theory: bool,
    remaining_openings: usize,
    ending: Option<Ending>,
    // ply of the move whose answer is outstanding
    in_flight: Option<usize>,
    // move the service never acknowledged
    unsynced: Option<PendingMove>,
}

impl Session {
    fn end(&mut self, ending: Ending, status: &mut String, message: String) {
        info!(session_id = %self.id, ?ending, "Session over: {}", message);
        self.ending = Some(ending);
        *status = message;
    }

    /// Local terminal detection wins over whatever the service thinks.
    fn check_game_over(&mut self, status: &mut String) -> bool {
        match self.game.ending() {
            Some(ending) => {
                self.end(Ending::Game(ending), status, ending.description());
                true
            }
            None => false,
        }
    }

    fn set_mode(&mut self, engine_mode: bool) {
        let mode = if engine_mode { Mode::Engine } else { Mode::Theory };
        if mode != self.mode {
            info!(session_id = %self.id, "Opponent switched to {:?} mode", mode);
        }
        self.mode = mode;
    }
}

#[derive(Debug)]
pub struct SessionController {
    user_id: i64,
    session: Option<Session>,
    status: String,
}

impl SessionController {
    /// `user_id` must be the one the [`TrainerApi`] sends with opening
    /// calls; [`SessionController::from_config`] takes both from one place.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            session: None,
            status: WELCOME_STATUS.to_string(),
        }
    }

    /// A controller for the user the client configuration names.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.user_id)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Start a new game as `color`, replacing whatever session was live.
    pub async fn start_session(
        &mut self,
        api: &dyn TrainerApi,
        openings: &mut OpeningCache,
        color: PlayerColor,
    ) -> Result<(), ClientError> {
        if let Some(previous) = self.session.take() {
            debug!("Abandoning session {}", previous.id);
        }
        self.status = format!("Starting game as {color}...");

        if let Err(e) = openings.ensure_loaded(api).await {
            warn!("Could not load openings, candidate tracking starts empty: {}", e);
        }

        let started = match api.create_session(self.user_id, color).await {
            Ok(started) => started,
            Err(e) => {
                error!("Starting a session failed: {}", e);
                self.status = START_FAILED_STATUS.to_string();
                return Err(e);
            }
        };

        let learned = openings.learned_ids(color);
        if let Err(e) = self.install_session(color, started, learned) {
            error!("Service sent an unusable start position: {}", e);
            self.status = START_FAILED_STATUS.to_string();
            return Err(e.into());
        }
        Ok(())
    }

    fn install_session(
        &mut self,
        color: PlayerColor,
        started: GameStartResponse,
        learned: Vec<OpeningId>,
    ) -> Result<(), ChessError> {
        let game = Game::from_fen(&started.initial_fen)?;
        if let Some(confirmed) = started.color.filter(|c| *c != color) {
            warn!("Service confirmed color {} for a {} request", confirmed, color);
        }

        let mut session = Session {
            id: started.session_id,
            player: color,
            game,
            mode: Mode::Theory,
            candidates: CandidateTracker::seeded(learned),
            in_theory: true,
            remaining_openings: 0,
            ending: None,
            in_flight: None,
            unsynced: None,
        };
        session.remaining_openings = session.candidates.len();
        info!(
            session_id = %session.id,
            color = %color,
            candidates = session.candidates.len(),
            "Session started"
        );

        self.status = started.message;
        session.check_game_over(&mut self.status);
        self.session = Some(session);
        Ok(())
    }

    /// Optimistically apply the user's move. `None` when the move is not
    /// allowed right now or is illegal; the state is then untouched.
    pub fn begin_user_move(&mut self, from: Square, to: Square) -> Option<PendingMove> {
        let Self {
            session, status, ..
        } = self;
        let session = session.as_mut()?;

        if session.ending.is_some() || session.in_flight.is_some() {
            debug!("Ignoring move {}{}: input is closed", from, to);
            return None;
        }
        if session.game.turn() != Color::from(session.player) {
            debug!("Ignoring move {}{}: not the player's turn", from, to);
            return None;
        }

        let next = match session.game.apply_squares(from, to) {
            Ok(next) => next,
            Err(_) => {
                debug!("Ignoring illegal move {}{}", from, to);
                return None;
            }
        };
        let record = next.history().last()?.clone();
        session.game = next;
        session.in_flight = Some(record.ply);
        debug!(session_id = %session.id, ply = record.ply, "Played {}", record.san);

        if !session.check_game_over(status) {
            *status = THINKING_STATUS.to_string();
        }

        Some(PendingMove {
            session_id: session.id,
            ply: record.ply,
            san: record.san,
        })
    }

    /// Reconcile the service's answer for `pending`.
    pub fn complete_user_move(
        &mut self,
        pending: PendingMove,
        result: Result<MoveResponse, ClientError>,
    ) -> SubmitOutcome {
        let Self {
            session, status, ..
        } = self;
        let Some(session) = session
            .as_mut()
            .filter(|s| s.id == pending.session_id && s.in_flight == Some(pending.ply))
        else {
            debug!(
                "Discarding answer for {} in session {}",
                pending.san, pending.session_id
            );
            return SubmitOutcome::Discarded;
        };
        session.in_flight = None;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(session_id = %session.id, "Move {} not synced: {}", pending.san, e);
                session.unsynced = Some(pending);
                if session.ending.is_none() {
                    *status = OFFLINE_STATUS.to_string();
                }
                return SubmitOutcome::Offline;
            }
        };
        session.unsynced = None;

        if !response.legal {
            error!(session_id = %session.id, "Service rejected locally legal move {}", pending.san);
            session.end(
                Ending::Desync,
                status,
                format!("Error: the trainer rejected {}; session ended.", pending.san),
            );
            return SubmitOutcome::Desynced;
        }

        session.set_mode(response.engine_mode);
        session
            .candidates
            .apply(response.candidate_opening_ids.as_deref());
        session.in_theory = response.in_theory;
        session.remaining_openings = response.remaining_openings_count;

        if session.ending.is_some() {
            return SubmitOutcome::Synced;
        }

        *status = match response.message.filter(|m| !m.trim().is_empty()) {
            Some(message) => message,
            None if response.mistake_made => MISTAKE_STATUS.to_string(),
            None => YOUR_TURN_STATUS.to_string(),
        };

        if let Some(reply) = response.bot_move.as_deref() {
            match session.game.apply_san(reply) {
                Ok(next) => {
                    debug!(session_id = %session.id, "Opponent played {}", reply);
                    session.game = next;
                }
                Err(e) => {
                    error!(session_id = %session.id, "Cannot apply opponent move {}: {}", reply, e);
                    session.end(
                        Ending::Desync,
                        status,
                        format!("Error: opponent move '{reply}' could not be applied; session ended."),
                    );
                    return SubmitOutcome::Desynced;
                }
            }
        }

        if let Some(fen) = response.fen.as_deref() {
            if chess_core::rules::normalize_fen(fen)
                != chess_core::rules::normalize_fen(&session.game.fen())
            {
                warn!(session_id = %session.id, "Local position differs from service: {}", fen);
            }
        }

        session.check_game_over(status);
        SubmitOutcome::Synced
    }

    /// Apply the move locally, send it, and reconcile the answer.
    pub async fn submit_user_move(
        &mut self,
        api: &dyn TrainerApi,
        from: Square,
        to: Square,
    ) -> SubmitOutcome {
        let Some(pending) = self.begin_user_move(from, to) else {
            return SubmitOutcome::Ignored;
        };
        let result = api.submit_move(pending.session_id, &pending.san).await;
        self.complete_user_move(pending, result)
    }

    /// Re-arm the move the service never acknowledged.
    pub fn begin_retry(&mut self) -> Option<PendingMove> {
        let Self {
            session, status, ..
        } = self;
        let session = session.as_mut()?;
        if session.in_flight.is_some() {
            return None;
        }

        let pending = session.unsynced.take()?;
        session.in_flight = Some(pending.ply);
        if session.ending.is_none() {
            *status = THINKING_STATUS.to_string();
        }
        Some(pending)
    }

    /// Resend an unacknowledged move after a connection failure.
    pub async fn retry_sync(&mut self, api: &dyn TrainerApi) -> SubmitOutcome {
        let Some(pending) = self.begin_retry() else {
            return SubmitOutcome::Ignored;
        };
        let result = api.submit_move(pending.session_id, &pending.san).await;
        self.complete_user_move(pending, result)
    }

    /// Concede locally. Nothing is sent to the service.
    pub fn resign(&mut self) -> bool {
        let Self {
            session, status, ..
        } = self;
        let Some(session) = session.as_mut() else {
            return false;
        };
        if session.ending.is_some() {
            return false;
        }

        let winner = session.player.opponent();
        session.end(
            Ending::Resigned,
            status,
            format!("You resigned. {} wins.", winner.title()),
        );
        true
    }

    pub fn phase(&self) -> Phase {
        match &self.session {
            None => Phase::Setup,
            Some(Session {
                ending: Some(ending),
                ..
            }) => Phase::Terminal(*ending),
            Some(session) => Phase::Active(session.mode),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn mode(&self) -> Mode {
        self.session.as_ref().map_or(Mode::Theory, |s| s.mode)
    }

    pub fn is_engine_mode(&self) -> bool {
        self.mode() == Mode::Engine
    }

    /// Whether the service's last answer was still inside a learned line.
    pub fn in_theory(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.in_theory)
    }

    /// Learned lines the service still considered reachable at its last
    /// answer. Before the first answer this is the seeded candidate count.
    pub fn remaining_openings(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.remaining_openings)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn player_color(&self) -> Option<PlayerColor> {
        self.session.as_ref().map(|s| s.player)
    }

    pub fn candidates(&self) -> Option<&CandidateTracker> {
        self.session.as_ref().map(|s| &s.candidates)
    }

    pub fn game(&self) -> Option<&Game> {
        self.session.as_ref().map(|s| &s.game)
    }

    pub fn history(&self) -> &[MoveRecord] {
        match &self.session {
            Some(session) => session.game.history(),
            None => &[],
        }
    }

    pub fn fen(&self) -> String {
        self.session
            .as_ref()
            .map_or_else(|| Game::new().fen(), |s| s.game.fen())
    }

    pub fn turn(&self) -> Color {
        self.session.as_ref().map_or(Color::White, |s| s.game.turn())
    }

    pub fn is_check(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.game.is_check())
    }

    pub fn game_over(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.ending.is_some())
    }

    pub fn awaiting_reply(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.in_flight.is_some())
    }

    pub fn has_unsynced_move(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.unsynced.is_some())
    }

    /// Whether a user move would be accepted for consideration right now.
    pub fn can_move(&self) -> bool {
        self.session.as_ref().is_some_and(|s| {
            s.ending.is_none()
                && s.in_flight.is_none()
                && s.game.turn() == Color::from(s.player)
        })
    }

    /// Destinations the board may offer; empty whenever input is closed.
    pub fn legal_destinations(&self) -> BTreeMap<Square, Vec<Square>> {
        match &self.session {
            Some(session) if self.can_move() => session.game.legal_destinations(),
            _ => BTreeMap::new(),
        }
    }

    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.session.as_ref().and_then(|s| s.game.last_move())
    }

    /// Position after `history[0..=index]`, rebuilt from the session's base
    /// position.
    pub fn position_at_ply(&self, index: isize) -> Result<Game, ChessError> {
        let base = self.session.as_ref().map_or_else(Game::new, |s| s.game.base_game());
        let sans: Vec<&str> = self.history().iter().map(|m| m.san.as_str()).collect();
        navigator::position_at_from(&base, &sans[..], index)
    }

    /// Learned openings of the player's color, flagged by whether they are
    /// still consistent with the game.
    pub fn tracked_openings<'a>(&self, openings: &'a OpeningCache) -> Vec<TrackedOpening<'a>> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        openings
            .for_color(session.player)
            .filter(|o| o.is_learned)
            .map(|opening| TrackedOpening {
                opening,
                live: session.candidates.contains(opening.id),
            })
            .collect()
    }
}
