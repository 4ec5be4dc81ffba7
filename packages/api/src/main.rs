use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use shared::repositories::agent_repository::DynamoDbAgentRepository;
use shared::repositories::game_repository::DynamoDbGameRepository;
use shared::repositories::move_repository::DynamoDbMoveRepository;
use shared::repositories::queue_repository::DynamoDbQueueRepository;
use shared::services::agent_service::AgentService;
use shared::services::game_service::GameService;
use shared::services::maintenance_service::MaintenanceService;
use shared::services::matchmaking_service::MatchmakingService;
use shared::services::notification_service::NotificationService;
use shared::services::rules_service::RulesService;
use shared::services::sweeper_service::SweeperService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Set up services
    let config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&config);

    let agent_repository = Arc::new(DynamoDbAgentRepository::new(client.clone()));
    let game_repository = Arc::new(DynamoDbGameRepository::new(client.clone()));
    let move_repository = Arc::new(DynamoDbMoveRepository::new(client.clone()));
    let queue_repository = Arc::new(DynamoDbQueueRepository::new(client.clone()));

    let notifier = Arc::new(NotificationService::new());
    let agent_service = Arc::new(AgentService::new(agent_repository.clone()));
    let game_service = Arc::new(GameService::new(
        game_repository.clone(),
        move_repository.clone(),
        agent_repository.clone(),
        RulesService::new(),
        notifier.clone(),
    ));
    let matchmaking_service = Arc::new(MatchmakingService::new(
        queue_repository,
        game_repository.clone(),
        agent_repository.clone(),
        game_service.clone(),
        notifier,
    ));
    let sweeper_service = Arc::new(SweeperService::new(
        game_repository,
        move_repository,
        game_service.clone(),
    ));
    let maintenance_service = Arc::new(MaintenanceService::new(
        sweeper_service,
        matchmaking_service.clone(),
    ));

    // The periodic upkeep loop lives for the whole process; status polls
    // piggyback extra passes through the same single-flight guard.
    let interval_secs = std::env::var("MAINTENANCE_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    let _maintenance_loop = maintenance_service.spawn(Duration::from_secs(interval_secs));

    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

    let app_state = state::AppState {
        agent_service,
        game_service,
        matchmaking_service,
        maintenance_service,
        base_url,
    };

    // Configure CORS
    // ToDo: Tighten this up
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Merge routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(routes::agents::routes())
        .merge(routes::claim::routes())
        .merge(routes::challenges::routes())
        .merge(routes::games::routes())
        .merge(routes::queue::routes())
        .layer(cors)
        .with_state(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
