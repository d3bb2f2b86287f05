//! Shared helpers: an in-memory trainer service with scripted answers.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chess_core::{parse_square, Square};
use trainer_client::{
    ClientError, GameStartResponse, MoveResponse, OpeningDetail, OpeningId, OpeningSummary,
    PlayerColor, SessionId, ToggleAck, TrainerApi,
};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

#[derive(Default)]
pub struct ScriptedApi {
    pub openings: Mutex<Vec<OpeningSummary>>,
    pub details: Mutex<HashMap<OpeningId, OpeningDetail>>,
    pub starts: Mutex<VecDeque<Result<GameStartResponse, ClientError>>>,
    pub answers: Mutex<VecDeque<Result<MoveResponse, ClientError>>>,
    pub submitted: Mutex<Vec<(SessionId, String)>>,
    pub toggled: Mutex<Vec<OpeningId>>,
    pub list_calls: Mutex<usize>,
    pub fail_toggle: Mutex<bool>,
    pub fail_list: Mutex<bool>,
}

impl ScriptedApi {
    pub fn with_openings(openings: Vec<OpeningSummary>) -> Self {
        let api = Self::default();
        *api.openings.lock().unwrap() = openings;
        api
    }

    pub fn push_start(&self, id: i64, fen: &str) {
        self.starts.lock().unwrap().push_back(Ok(GameStartResponse {
            session_id: SessionId(id),
            initial_fen: fen.to_string(),
            message: format!("Session {id} started."),
            color: None,
        }));
    }

    pub fn push_answer(&self, answer: MoveResponse) {
        self.answers.lock().unwrap().push_back(Ok(answer));
    }

    pub fn push_failure(&self) {
        self.answers.lock().unwrap().push_back(Err(unavailable()));
    }

    pub fn submitted(&self) -> Vec<(SessionId, String)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

pub fn unavailable() -> ClientError {
    ClientError::Http {
        status: 503,
        detail: "Service Unavailable".to_string(),
    }
}

pub fn opening(id: OpeningId, name: &str, color: PlayerColor, is_learned: bool) -> OpeningSummary {
    OpeningSummary {
        id,
        name: name.to_string(),
        is_learned,
        color,
    }
}

/// Two learned white openings, one unlearned white, one learned black.
pub fn repertoire() -> Vec<OpeningSummary> {
    vec![
        opening(1, "Ruy Lopez", PlayerColor::White, true),
        opening(2, "Italian Game", PlayerColor::White, true),
        opening(3, "London System", PlayerColor::White, false),
        opening(4, "Sicilian Najdorf", PlayerColor::Black, true),
    ]
}

pub fn reply(san: &str) -> MoveResponse {
    MoveResponse {
        bot_move: Some(san.to_string()),
        ..MoveResponse::default()
    }
}

pub fn sq(name: &str) -> Square {
    parse_square(name).unwrap()
}

pub fn init_tracing() {
    trainer_client::telemetry::try_init();
}

#[async_trait]
impl TrainerApi for ScriptedApi {
    async fn create_session(
        &self,
        _user_id: i64,
        _color: PlayerColor,
    ) -> Result<GameStartResponse, ClientError> {
        self.starts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }

    async fn submit_move(
        &self,
        session_id: SessionId,
        move_san: &str,
    ) -> Result<MoveResponse, ClientError> {
        self.submitted
            .lock()
            .unwrap()
            .push((session_id, move_san.to_string()));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }

    async fn list_openings(&self) -> Result<Vec<OpeningSummary>, ClientError> {
        *self.list_calls.lock().unwrap() += 1;
        if *self.fail_list.lock().unwrap() {
            return Err(unavailable());
        }
        Ok(self.openings.lock().unwrap().clone())
    }

    async fn toggle_learned(&self, opening_id: OpeningId) -> Result<ToggleAck, ClientError> {
        if *self.fail_toggle.lock().unwrap() {
            return Err(unavailable());
        }
        self.toggled.lock().unwrap().push(opening_id);

        let mut openings = self.openings.lock().unwrap();
        let mut status = "unlearned";
        if let Some(o) = openings.iter_mut().find(|o| o.id == opening_id) {
            o.is_learned = !o.is_learned;
            if o.is_learned {
                status = "learned";
            }
        }
        if let Some(d) = self.details.lock().unwrap().get_mut(&opening_id) {
            d.summary.is_learned = !d.summary.is_learned;
        }
        Ok(ToggleAck {
            status: status.to_string(),
        })
    }

    async fn opening_detail(&self, opening_id: OpeningId) -> Result<OpeningDetail, ClientError> {
        self.details
            .lock()
            .unwrap()
            .get(&opening_id)
            .cloned()
            .ok_or_else(|| ClientError::Http {
                status: 404,
                detail: "Opening not found".to_string(),
            })
    }
}
