#[derive(Debug)]
pub enum RulesServiceError {
    /// The stored position string could not be parsed. This is corruption,
    /// not caller error.
    InvalidPosition(String),
    /// The submitted move matched neither accepted notation.
    InvalidMoveSyntax(String),
    /// The move parsed but is not legal in the current position.
    IllegalMove(String),
}

impl std::fmt::Display for RulesServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RulesServiceError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
            RulesServiceError::InvalidMoveSyntax(mv) => write!(f, "Invalid move syntax: {}", mv),
            RulesServiceError::IllegalMove(mv) => write!(f, "Illegal move: {}", mv),
        }
    }
}

impl std::error::Error for RulesServiceError {}
