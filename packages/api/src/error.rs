use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::services::errors::{
    agent_service_errors::AgentServiceError, game_service_errors::GameServiceError,
    matchmaking_service_errors::MatchmakingServiceError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    AgentService(AgentServiceError),
    GameService(GameServiceError),
    MatchmakingService(MatchmakingServiceError),
    Unauthorized,
}

impl From<AgentServiceError> for ApiError {
    fn from(error: AgentServiceError) -> Self {
        ApiError::AgentService(error)
    }
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GameService(error)
    }
}

impl From<MatchmakingServiceError> for ApiError {
    fn from(error: MatchmakingServiceError) -> Self {
        ApiError::MatchmakingService(error)
    }
}

fn game_error_status(error: &GameServiceError) -> StatusCode {
    match error {
        GameServiceError::GameNotFound | GameServiceError::AgentNotFound => StatusCode::NOT_FOUND,
        GameServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        GameServiceError::Conflict(_) => StatusCode::CONFLICT,
        GameServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        GameServiceError::Rules(_) | GameServiceError::RepositoryError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::AgentService(error) => {
                let status = match error {
                    AgentServiceError::NameTaken | AgentServiceError::AlreadyClaimed => {
                        StatusCode::CONFLICT
                    }
                    AgentServiceError::AgentNotFound => StatusCode::NOT_FOUND,
                    AgentServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
                    AgentServiceError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, error.to_string())
            }
            ApiError::GameService(error) => (game_error_status(error), error.to_string()),
            ApiError::MatchmakingService(error) => {
                let status = match error {
                    MatchmakingServiceError::Conflict(_) => StatusCode::CONFLICT,
                    MatchmakingServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
                    MatchmakingServiceError::RepositoryError(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    MatchmakingServiceError::GameService(inner) => game_error_status(inner),
                };
                (status, error.to_string())
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid API key".to_string()),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
