use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::ApiError, state::AppState};
use shared::models::agent::Agent;
use shared::services::errors::agent_service_errors::AgentServiceError;

/// Resolves the `X-API-Key` header to the calling agent before a handler
/// runs. An unknown or missing key is indistinguishable to the caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedAgent(pub Agent);

impl FromRequestParts<AppState> for AuthenticatedAgent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get("X-API-Key")
            .ok_or(ApiError::Unauthorized)?
            .to_str()
            .map_err(|_| ApiError::Unauthorized)?;

        let agent = state
            .agent_service
            .get_agent_by_api_key(api_key)
            .await
            .map_err(|e| match e {
                AgentServiceError::AgentNotFound => ApiError::Unauthorized,
                other => ApiError::AgentService(other),
            })?;

        Ok(AuthenticatedAgent(agent))
    }
}
