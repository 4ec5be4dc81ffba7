use crate::repositories::errors::agent_repository_errors::AgentRepositoryError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;
use crate::services::errors::game_service_errors::GameServiceError;

#[derive(Debug)]
pub enum MatchmakingServiceError {
    /// Caller already holds a game slot the queue invariant forbids.
    Conflict(String),
    ValidationError(String),
    RepositoryError(String),
    GameService(GameServiceError),
}

impl std::fmt::Display for MatchmakingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchmakingServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            MatchmakingServiceError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            MatchmakingServiceError::RepositoryError(msg) => {
                write!(f, "Repository error: {}", msg)
            }
            MatchmakingServiceError::GameService(err) => write!(f, "Game service error: {}", err),
        }
    }
}

impl std::error::Error for MatchmakingServiceError {}

impl From<QueueRepositoryError> for MatchmakingServiceError {
    fn from(err: QueueRepositoryError) -> Self {
        MatchmakingServiceError::RepositoryError(err.to_string())
    }
}

impl From<GameRepositoryError> for MatchmakingServiceError {
    fn from(err: GameRepositoryError) -> Self {
        MatchmakingServiceError::RepositoryError(err.to_string())
    }
}

impl From<AgentRepositoryError> for MatchmakingServiceError {
    fn from(err: AgentRepositoryError) -> Self {
        MatchmakingServiceError::RepositoryError(err.to_string())
    }
}

impl From<GameServiceError> for MatchmakingServiceError {
    fn from(err: GameServiceError) -> Self {
        MatchmakingServiceError::GameService(err)
    }
}
