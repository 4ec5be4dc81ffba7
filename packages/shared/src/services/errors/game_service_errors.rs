use crate::repositories::errors::agent_repository_errors::AgentRepositoryError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::move_repository_errors::MoveRepositoryError;
use crate::services::errors::rules_service_errors::RulesServiceError;

#[derive(Debug)]
pub enum GameServiceError {
    GameNotFound,
    AgentNotFound,
    /// Caller is not allowed to perform this mutation (wrong agent, not
    /// their turn, not a participant).
    Forbidden(String),
    /// The game is not in the lifecycle state the operation requires.
    Conflict(String),
    /// Malformed or illegal move, or malformed request data.
    Validation(String),
    /// Internal rules-engine failure over stored state.
    Rules(String),
    RepositoryError(String),
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::GameNotFound => write!(f, "Game not found"),
            GameServiceError::AgentNotFound => write!(f, "Agent not found"),
            GameServiceError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            GameServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            GameServiceError::Validation(msg) => write!(f, "Validation error: {}", msg),
            GameServiceError::Rules(msg) => write!(f, "Rules engine error: {}", msg),
            GameServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        GameServiceError::RepositoryError(err.to_string())
    }
}

impl From<MoveRepositoryError> for GameServiceError {
    fn from(err: MoveRepositoryError) -> Self {
        GameServiceError::RepositoryError(err.to_string())
    }
}

impl From<AgentRepositoryError> for GameServiceError {
    fn from(err: AgentRepositoryError) -> Self {
        match err {
            AgentRepositoryError::NotFound => GameServiceError::AgentNotFound,
            other => GameServiceError::RepositoryError(other.to_string()),
        }
    }
}

impl From<RulesServiceError> for GameServiceError {
    fn from(err: RulesServiceError) -> Self {
        match err {
            RulesServiceError::InvalidMoveSyntax(_) => {
                GameServiceError::Validation("invalid move syntax".to_string())
            }
            RulesServiceError::IllegalMove(_) => {
                GameServiceError::Validation("illegal move".to_string())
            }
            RulesServiceError::InvalidPosition(msg) => GameServiceError::Rules(msg),
        }
    }
}
