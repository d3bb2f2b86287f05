pub mod trainer_api;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{
    GameStartResponse, MoveResponse, OpeningDetail, OpeningId, OpeningSummary, PlayerColor,
    SessionId, ToggleAck,
};

pub use trainer_api::HttpTrainerApi;

/// The remote authority: chess validation, theory matching, engine play and
/// persistence all live behind this.
#[async_trait]
pub trait TrainerApi: Send + Sync {
    async fn create_session(
        &self,
        user_id: i64,
        color: PlayerColor,
    ) -> Result<GameStartResponse, ClientError>;

    async fn submit_move(
        &self,
        session_id: SessionId,
        move_san: &str,
    ) -> Result<MoveResponse, ClientError>;

    async fn list_openings(&self) -> Result<Vec<OpeningSummary>, ClientError>;

    async fn toggle_learned(&self, opening_id: OpeningId) -> Result<ToggleAck, ClientError>;

    async fn opening_detail(&self, opening_id: OpeningId) -> Result<OpeningDetail, ClientError>;
}
