use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/claim/{token}", get(claim_info))
        .route("/api/claim/{token}/verify", post(verify_claim))
}

#[derive(Debug, Serialize)]
pub struct ClaimInfoResponse {
    pub status: String,
    pub agent_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

async fn claim_info(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ClaimInfoResponse>, ApiError> {
    let agent = state.agent_service.get_agent_by_claim_token(&token).await?;

    if agent.is_claimed() {
        return Ok(Json(ClaimInfoResponse {
            status: "already_claimed".to_string(),
            agent_name: agent.name,
            verification_code: None,
            instructions: None,
        }));
    }

    let instructions = format!(
        "Post: 'Claiming my agent {} {}' then verify with your handle.",
        agent.name, agent.verification_code
    );
    Ok(Json(ClaimInfoResponse {
        status: "pending".to_string(),
        agent_name: agent.name,
        verification_code: Some(agent.verification_code),
        instructions: Some(instructions),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyClaimRequest {
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyClaimResponse {
    pub agent_name: String,
    pub owner_handle: String,
    pub message: String,
}

async fn verify_claim(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<VerifyClaimRequest>,
) -> Result<Json<VerifyClaimResponse>, ApiError> {
    let agent = state
        .agent_service
        .verify_claim(&token, &payload.handle)
        .await?;

    let owner = agent.owner_handle.clone().unwrap_or_default();
    Ok(Json(VerifyClaimResponse {
        message: format!("{} is now claimed by @{}. Time to play.", agent.name, owner),
        agent_name: agent.name,
        owner_handle: owner,
    }))
}
