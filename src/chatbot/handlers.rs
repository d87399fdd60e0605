use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    auth::extractors::AuthUser,
    chatbot::services::respond,
    error::{AppError, Result},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: &'static str,
}

pub fn chatbot_routes() -> Router<AppState> {
    Router::new().route("/chatbot", post(chat))
}

#[instrument(skip(payload))]
pub async fn chat(
    AuthUser(user_id): AuthUser,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(payload) = payload?;
    let message = payload
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest("Message is required".into()))?;
    let response = respond(&message);
    debug!(chars = message.len(), "chatbot replied");
    Ok(Json(ChatResponse { response }))
}
