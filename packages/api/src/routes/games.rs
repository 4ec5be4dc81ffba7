use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, middleware::auth::AuthenticatedAgent, state::AppState};
use shared::models::game::{Game, GameResult, GameStatus};
use shared::services::errors::game_service_errors::GameServiceError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/games/active", get(active_games))
        .route("/api/games/live", get(live_games))
        .route("/api/games/archive", get(archive))
        .route("/api/games/{game_id}", get(game_state))
        .route("/api/games/{game_id}/move", post(make_move))
        .route("/api/games/{game_id}/resign", post(resign))
}

#[derive(Debug, Serialize)]
pub struct ActiveGameView {
    pub game_id: String,
    pub white: String,
    pub black: String,
    pub your_color: &'static str,
    pub your_turn: bool,
    pub fen: String,
    pub move_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ActiveGamesResponse {
    pub games: Vec<ActiveGameView>,
}

async fn active_games(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
) -> Result<Json<ActiveGamesResponse>, ApiError> {
    let games = state.game_service.active_games_for(&agent).await?;

    let mut views = Vec::with_capacity(games.len());
    for game in games {
        let to_move = state.game_service.agent_to_move(&game)?;
        let your_color = if game.white_id == agent.name {
            "white"
        } else {
            "black"
        };
        views.push(ActiveGameView {
            your_turn: to_move == agent.name,
            your_color,
            move_count: game.move_count(),
            game_id: game.game_id,
            white: game.white_id,
            black: game.black_id,
            fen: game.fen,
        });
    }
    Ok(Json(ActiveGamesResponse { games: views }))
}

#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LiveGameView {
    pub game_id: String,
    pub white: String,
    pub black: String,
    pub turn: &'static str,
    pub move_count: usize,
}

#[derive(Debug, Serialize)]
pub struct LiveGamesResponse {
    pub games: Vec<LiveGameView>,
    pub count: usize,
}

async fn live_games(
    State(state): State<AppState>,
    Query(query): Query<LiveQuery>,
) -> Result<Json<LiveGamesResponse>, ApiError> {
    let games = state.game_service.live_games(query.limit.unwrap_or(20)).await?;

    let mut views = Vec::with_capacity(games.len());
    for game in games {
        let turn = state.game_service.side_to_move(&game)?.as_str();
        views.push(LiveGameView {
            turn,
            move_count: game.move_count(),
            game_id: game.game_id,
            white: game.white_id,
            black: game.black_id,
        });
    }
    let count = views.len();
    Ok(Json(LiveGamesResponse {
        games: views,
        count,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ArchiveQuery {
    pub limit: Option<usize>,
    pub agent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArchivedGameView {
    pub game_id: String,
    pub white: String,
    pub black: String,
    pub result: Option<GameResult>,
    pub move_count: usize,
    pub ended_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    pub games: Vec<ArchivedGameView>,
}

async fn archive(
    State(state): State<AppState>,
    Query(query): Query<ArchiveQuery>,
) -> Result<Json<ArchiveResponse>, ApiError> {
    let games = state
        .game_service
        .archive(query.limit.unwrap_or(50), query.agent.as_deref())
        .await?;

    let games = games
        .into_iter()
        .map(|game: Game| ArchivedGameView {
            result: game.result,
            move_count: game.move_count(),
            ended_at: game.ended_at.map(|t| t.to_rfc3339()),
            game_id: game.game_id,
            white: game.white_id,
            black: game.black_id,
        })
        .collect();
    Ok(Json(ArchiveResponse { games }))
}

#[derive(Debug, Serialize)]
pub struct GameStateResponse {
    pub game_id: String,
    pub white: String,
    pub black: String,
    pub fen: String,
    pub pgn: String,
    pub status: GameStatus,
    pub result: Option<GameResult>,
    pub turn: &'static str,
    pub move_count: usize,
    pub time_control: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

async fn game_state(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let game = state.game_service.get_game(&game_id).await?;
    let turn = state.game_service.side_to_move(&game)?.as_str();

    Ok(Json(GameStateResponse {
        turn,
        move_count: game.move_count(),
        started_at: game.started_at.map(|t| t.to_rfc3339()),
        ended_at: game.ended_at.map(|t| t.to_rfc3339()),
        game_id: game.game_id,
        white: game.white_id,
        black: game.black_id,
        fen: game.fen,
        pgn: game.pgn,
        status: game.status,
        result: game.result,
        time_control: game.time_control,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub mv: String,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub san: String,
    pub fen: String,
    pub game_status: GameStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

async fn make_move(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(game_id): Path<String>,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let outcome = state
        .game_service
        .play_move(&agent, &game_id, &payload.mv)
        .await?;

    Ok(Json(MoveResponse {
        san: outcome.san,
        fen: outcome.fen,
        game_status: outcome.status,
        result: outcome.result,
    }))
}

#[derive(Debug, Serialize)]
pub struct ResignResponse {
    pub result: GameResult,
    pub message: String,
}

async fn resign(
    State(state): State<AppState>,
    AuthenticatedAgent(agent): AuthenticatedAgent,
    Path(game_id): Path<String>,
) -> Result<Json<ResignResponse>, ApiError> {
    let game = state.game_service.resign(&agent, &game_id).await?;
    let result = game.result.ok_or_else(|| {
        ApiError::GameService(GameServiceError::Rules(
            "completed game without result".to_string(),
        ))
    })?;

    Ok(Json(ResignResponse {
        result,
        message: format!("You resigned. Result: {}", result),
    }))
}
