use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::TrainerApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{
    ErrorBody, GameStartRequest, GameStartResponse, MoveRequest, MoveResponse, OpeningDetail,
    OpeningId, OpeningSummary, PlayerColor, SessionId, ToggleAck,
};

/// JSON-over-HTTP client for the trainer service.
pub struct HttpTrainerApi {
    client: Client,
    config: ClientConfig,
}

impl HttpTrainerApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl TrainerApi for HttpTrainerApi {
    async fn create_session(
        &self,
        user_id: i64,
        color: PlayerColor,
    ) -> Result<GameStartResponse, ClientError> {
        let resp = self
            .client
            .post(self.config.url("/game/start"))
            .json(&GameStartRequest { user_id, color })
            .send()
            .await?;
        read_json(resp).await
    }

    async fn submit_move(
        &self,
        session_id: SessionId,
        move_san: &str,
    ) -> Result<MoveResponse, ClientError> {
        let resp = self
            .client
            .post(self.config.url("/game/move"))
            .json(&MoveRequest {
                session_id,
                move_san,
            })
            .send()
            .await?;
        read_json(resp).await
    }

    async fn list_openings(&self) -> Result<Vec<OpeningSummary>, ClientError> {
        let resp = self
            .client
            .get(self.config.url("/openings"))
            .query(&[("user_id", self.config.user_id)])
            .send()
            .await?;
        read_json(resp).await
    }

    async fn toggle_learned(&self, opening_id: OpeningId) -> Result<ToggleAck, ClientError> {
        let resp = self
            .client
            .post(self.config.url(&format!("/openings/{opening_id}/toggle_learn")))
            .query(&[("user_id", self.config.user_id)])
            .send()
            .await?;
        read_json(resp).await
    }

    async fn opening_detail(&self, opening_id: OpeningId) -> Result<OpeningDetail, ClientError> {
        let resp = self
            .client
            .get(self.config.url(&format!("/openings/{opening_id}")))
            .query(&[("user_id", self.config.user_id)])
            .send()
            .await?;
        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let detail = error_detail(&text);
        tracing::warn!("Trainer service returned HTTP {}: {}", status, detail);
        return Err(ClientError::Http {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(serde_json::from_str(&text)?)
}

/// Pull the message out of a FastAPI `{"detail": ...}` body.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Value::String(message),
        }) => message,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}
