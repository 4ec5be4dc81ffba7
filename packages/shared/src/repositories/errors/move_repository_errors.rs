#[derive(Debug)]
pub enum MoveRepositoryError {
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for MoveRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveRepositoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            MoveRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for MoveRepositoryError {}
