use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only log entry for one applied move. Never mutated; the ordered
/// sequence for a game replays to the game's current position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub game_id: String,
    pub seq: u32,
    pub san: String,
    pub fen_after: String,
    pub played_at: DateTime<Utc>,
}

impl MoveRecord {
    pub fn new(game_id: &str, seq: u32, san: &str, fen_after: &str) -> Self {
        MoveRecord {
            game_id: game_id.to_string(),
            seq,
            san: san.to_string(),
            fen_after: fen_after.to_string(),
            played_at: Utc::now(),
        }
    }
}
