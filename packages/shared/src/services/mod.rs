pub mod errors;

pub mod agent_service;
pub mod elo;
pub mod game_service;
pub mod maintenance_service;
pub mod matchmaking_service;
pub mod notification_service;
pub mod rules_service;
pub mod sweeper_service;
