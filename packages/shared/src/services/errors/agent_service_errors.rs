use crate::repositories::errors::agent_repository_errors::AgentRepositoryError;

#[derive(Debug)]
pub enum AgentServiceError {
    NameTaken,
    AgentNotFound,
    AlreadyClaimed,
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for AgentServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentServiceError::NameTaken => write!(f, "Name already taken"),
            AgentServiceError::AgentNotFound => write!(f, "Agent not found"),
            AgentServiceError::AlreadyClaimed => write!(f, "Agent already claimed"),
            AgentServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AgentServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for AgentServiceError {}

impl From<AgentRepositoryError> for AgentServiceError {
    fn from(err: AgentRepositoryError) -> Self {
        match err {
            AgentRepositoryError::NotFound => AgentServiceError::AgentNotFound,
            AgentRepositoryError::AlreadyExists => AgentServiceError::NameTaken,
            other => AgentServiceError::RepositoryError(other.to_string()),
        }
    }
}
