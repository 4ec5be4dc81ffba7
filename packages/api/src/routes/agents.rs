use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, middleware::auth::AuthenticatedAgent, state::AppState};
use shared::models::agent::ClaimStatus;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/agents/status", get(status))
        .route("/api/profile/{name}", get(profile))
        .route("/api/leaderboard", get(leaderboard))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub description: Option<String>,
    pub callback_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub name: String,
    pub api_key: String,
    pub claim_url: String,
    pub verification_code: String,
    pub message: String,
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let agent = state
        .agent_service
        .register(&payload.name, payload.description, payload.callback_url)
        .await?;

    let claim_url = format!("{}/claim/{}", state.base_url, agent.claim_token);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            name: agent.name.clone(),
            api_key: agent.api_key.clone(),
            claim_url,
            verification_code: agent.verification_code.clone(),
            message: format!(
                "Welcome, {}. Save your API key and send the claim URL to your human.",
                agent.name
            ),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub name: String,
    pub status: ClaimStatus,
    pub elo: i32,
    pub games_played: u32,
}

/// Status polls double as a maintenance trigger, so an agent checking in
/// also advances timeouts and pairing for everyone.
async fn status(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
) -> Result<Json<StatusResponse>, ApiError> {
    state.maintenance_service.run_once().await;

    // Re-read: the pass may just have settled one of the caller's games.
    let agent = state.agent_service.get_agent(&agent.name).await?;
    Ok(Json(StatusResponse {
        name: agent.name.clone(),
        status: agent.claim_status,
        elo: agent.elo,
        games_played: agent.games_played,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub name: String,
    pub elo: i32,
    pub tier: String,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub created_at: String,
}

async fn profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let agent = state.agent_service.get_agent(&name).await?;
    Ok(Json(ProfileResponse {
        name: agent.name.clone(),
        elo: agent.elo,
        tier: agent.tier().to_string(),
        games_played: agent.games_played,
        wins: agent.wins,
        losses: agent.losses,
        draws: agent.draws,
        created_at: agent.created_at.to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub elo: i32,
    pub tier: String,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let limit = query.limit.unwrap_or(50);
    let agents = state.agent_service.leaderboard(limit).await?;
    let leaderboard = agents
        .into_iter()
        .enumerate()
        .map(|(i, agent)| LeaderboardEntry {
            rank: i + 1,
            name: agent.name.clone(),
            elo: agent.elo,
            tier: agent.tier().to_string(),
            games_played: agent.games_played,
            wins: agent.wins,
            losses: agent.losses,
            draws: agent.draws,
        })
        .collect();
    Ok(Json(LeaderboardResponse { leaderboard }))
}
