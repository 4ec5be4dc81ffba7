use std::sync::Arc;

use shared::services::agent_service::AgentService;
use shared::services::game_service::GameService;
use shared::services::maintenance_service::MaintenanceService;
use shared::services::matchmaking_service::MatchmakingService;

#[derive(Clone)]
pub struct AppState {
    pub agent_service: Arc<AgentService>,
    pub game_service: Arc<GameService>,
    pub matchmaking_service: Arc<MatchmakingService>,
    pub maintenance_service: Arc<MaintenanceService>,
    pub base_url: String,
}
