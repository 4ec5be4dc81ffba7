pub mod agent_service_errors;
pub mod game_service_errors;
pub mod matchmaking_service_errors;
pub mod rules_service_errors;
