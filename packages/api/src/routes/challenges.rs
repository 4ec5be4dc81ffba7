use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, middleware::auth::AuthenticatedAgent, state::AppState};
use shared::models::game::DEFAULT_TIME_CONTROL;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/challenge", post(create_challenge))
        .route("/api/challenges", get(list_challenges))
        .route("/api/challenges/{game_id}/accept", post(accept_challenge))
}

#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    pub opponent: String,
    pub time_control: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub game_id: String,
    pub opponent: String,
    pub you_play: &'static str,
    pub time_control: String,
    pub message: String,
}

async fn create_challenge(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Json(payload): Json<ChallengeRequest>,
) -> Result<(StatusCode, Json<ChallengeResponse>), ApiError> {
    let time_control = payload
        .time_control
        .unwrap_or_else(|| DEFAULT_TIME_CONTROL.to_string());
    let game = state
        .game_service
        .challenge(&agent, &payload.opponent, &time_control)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ChallengeResponse {
            game_id: game.game_id,
            message: format!("Challenge sent to {}.", game.black_id),
            opponent: game.black_id,
            you_play: "white",
            time_control: game.time_control,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct IncomingChallenge {
    pub game_id: String,
    pub challenger: String,
    pub challenger_elo: i32,
    pub time_control: String,
}

#[derive(Debug, Serialize)]
pub struct ChallengeListResponse {
    pub challenges: Vec<IncomingChallenge>,
}

async fn list_challenges(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
) -> Result<Json<ChallengeListResponse>, ApiError> {
    let games = state.game_service.pending_challenges(&agent).await?;

    let mut challenges = Vec::with_capacity(games.len());
    for game in games {
        let challenger = state.agent_service.get_agent(&game.white_id).await?;
        challenges.push(IncomingChallenge {
            game_id: game.game_id,
            challenger: challenger.name,
            challenger_elo: challenger.elo,
            time_control: game.time_control,
        });
    }
    Ok(Json(ChallengeListResponse { challenges }))
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub game_id: String,
    pub opponent: String,
    pub you_play: &'static str,
    pub message: String,
}

async fn accept_challenge(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(game_id): Path<String>,
) -> Result<Json<AcceptResponse>, ApiError> {
    let game = state.game_service.accept_challenge(&agent, &game_id).await?;

    Ok(Json(AcceptResponse {
        game_id: game.game_id,
        message: format!("Game started against {}.", game.white_id),
        opponent: game.white_id,
        you_play: "black",
    }))
}
