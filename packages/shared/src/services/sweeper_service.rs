use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::error;

use crate::models::game::{Game, GameStatus};
use crate::repositories::game_repository::GameRepository;
use crate::repositories::move_repository::MoveRepository;
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::game_service::GameService;

/// Games with fewer than two recorded moves get this much grace before the
/// side on move is forfeited; a game nobody really started should not hold
/// its players for a full time control.
const EARLY_ABANDON_MINUTES: i64 = 15;

const DEFAULT_TIME_CONTROL_HOURS: i64 = 24;

/// Scans active games and forfeits any whose clock has run out. Idempotent:
/// completed games are excluded from the scan, and the state machine's
/// active-guard makes a second forfeit of the same game a no-op.
#[derive(Clone)]
pub struct SweeperService {
    games: Arc<dyn GameRepository + Send + Sync>,
    moves: Arc<dyn MoveRepository + Send + Sync>,
    game_service: Arc<GameService>,
}

impl SweeperService {
    pub fn new(
        games: Arc<dyn GameRepository + Send + Sync>,
        moves: Arc<dyn MoveRepository + Send + Sync>,
        game_service: Arc<GameService>,
    ) -> Self {
        SweeperService {
            games,
            moves,
            game_service,
        }
    }

    /// One pass over all active games. Returns the number of forfeits
    /// applied; a failure on one game is logged and does not stop the scan.
    pub async fn sweep(&self) -> Result<usize, GameServiceError> {
        let active = self.games.list_games_by_status(GameStatus::Active).await?;
        let now = Utc::now();

        let mut forfeits = 0;
        for game in active {
            match self.check_game(&game, now).await {
                Ok(true) => forfeits += 1,
                Ok(false) => {}
                Err(e) => error!("Timeout check for game {} failed: {}", game.game_id, e),
            }
        }
        Ok(forfeits)
    }

    async fn check_game(
        &self,
        game: &Game,
        now: DateTime<Utc>,
    ) -> Result<bool, GameServiceError> {
        let moves = self.moves.list_moves(&game.game_id).await?;

        let threshold = if moves.len() < 2 {
            Duration::minutes(EARLY_ABANDON_MINUTES)
        } else {
            parse_time_control(&game.time_control)
        };

        let mut last_activity = game.started_at.unwrap_or(game.created_at);
        if let Some(last_move) = moves.last() {
            if last_move.played_at > last_activity {
                last_activity = last_move.played_at;
            }
        }

        if now - last_activity > threshold {
            self.game_service.forfeit_on_timeout(game).await
        } else {
            Ok(false)
        }
    }
}

/// Parses descriptors like "30m", "24h" or "7d". Anything unparseable falls
/// back to 24 hours.
pub fn parse_time_control(descriptor: &str) -> Duration {
    let trimmed = descriptor.trim();
    let parsed = trimmed
        .char_indices()
        .last()
        .and_then(|(i, unit)| {
            let value: i64 = trimmed[..i].parse().ok()?;
            if value <= 0 {
                return None;
            }
            match unit {
                'm' => Some(Duration::minutes(value)),
                'h' => Some(Duration::hours(value)),
                'd' => Some(Duration::days(value)),
                _ => None,
            }
        });
    parsed.unwrap_or_else(|| Duration::hours(DEFAULT_TIME_CONTROL_HOURS))
}
