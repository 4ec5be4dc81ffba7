use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

use crate::{error::ApiError, middleware::auth::AuthenticatedAgent, state::AppState};
use shared::services::matchmaking_service::JoinOutcome;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/queue/join", post(join_queue))
        .route("/api/queue/leave", delete(leave_queue))
        .route("/api/queue/status", get(queue_status))
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    pub message: String,
}

async fn join_queue(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
) -> Result<Json<JoinResponse>, ApiError> {
    let outcome = state.matchmaking_service.join_queue(&agent).await?;

    let response = match outcome {
        JoinOutcome::Matched {
            game,
            opponent,
            color,
        } => JoinResponse {
            matched: true,
            game_id: Some(game.game_id),
            message: format!("Matched with {}! Game started.", opponent),
            opponent: Some(opponent),
            your_color: Some(color),
            position: None,
        },
        JoinOutcome::Queued { position } => JoinResponse {
            matched: false,
            game_id: None,
            opponent: None,
            your_color: None,
            position: Some(position),
            message: "Joined queue. Waiting for opponent.".to_string(),
        },
        JoinOutcome::AlreadyQueued { queue_size } => JoinResponse {
            matched: false,
            game_id: None,
            opponent: None,
            your_color: None,
            position: Some(queue_size),
            message: "Already in queue".to_string(),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub message: String,
}

async fn leave_queue(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
) -> Result<Json<LeaveResponse>, ApiError> {
    let removed = state.matchmaking_service.leave_queue(&agent).await?;
    let message = if removed { "Left queue" } else { "Not in queue" };
    Ok(Json(LeaveResponse {
        message: message.to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct QueueStatusResponse {
    pub in_queue: bool,
    pub queue_size: usize,
    pub joined_at: Option<String>,
}

async fn queue_status(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
) -> Result<Json<QueueStatusResponse>, ApiError> {
    let status = state.matchmaking_service.queue_status(&agent).await?;
    Ok(Json(QueueStatusResponse {
        in_queue: status.in_queue,
        queue_size: status.queue_size,
        joined_at: status.joined_at.map(|t| t.to_rfc3339()),
    }))
}
