pub mod agent_repository_errors;
pub mod game_repository_errors;
pub mod move_repository_errors;
pub mod queue_repository_errors;
