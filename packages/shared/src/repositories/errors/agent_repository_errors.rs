#[derive(Debug)]
pub enum AgentRepositoryError {
    NotFound,
    AlreadyExists,
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for AgentRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRepositoryError::NotFound => write!(f, "Agent not found"),
            AgentRepositoryError::AlreadyExists => write!(f, "Agent already exists"),
            AgentRepositoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            AgentRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for AgentRepositoryError {}
