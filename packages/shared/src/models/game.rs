use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const DEFAULT_TIME_CONTROL: &str = "24h";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Active,
    Completed,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Waiting => write!(f, "waiting"),
            GameStatus::Active => write!(f, "active"),
            GameStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::WhiteWins => write!(f, "1-0"),
            GameResult::BlackWins => write!(f, "0-1"),
            GameResult::Draw => write!(f, "1/2-1/2"),
        }
    }
}

/// One match between two agents. The `pgn` field is the space-separated SAN
/// transcript; replaying it from `INITIAL_FEN` must reproduce `fen`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub white_id: String,
    pub black_id: String,
    pub status: GameStatus,
    pub fen: String,
    pub pgn: String,
    pub result: Option<GameResult>,
    pub time_control: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Game {
    /// A direct challenge: waits for the black side to accept. The
    /// challenger always plays white.
    pub fn new_challenge(white_id: &str, black_id: &str, time_control: &str) -> Self {
        Game {
            game_id: Uuid::new_v4().to_string(),
            white_id: white_id.to_string(),
            black_id: black_id.to_string(),
            status: GameStatus::Waiting,
            fen: INITIAL_FEN.to_string(),
            pgn: String::new(),
            result: None,
            time_control: time_control.to_string(),
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    /// A queue or auto-match pairing: starts immediately.
    pub fn new_paired(white_id: &str, black_id: &str) -> Self {
        let now = Utc::now();
        Game {
            game_id: Uuid::new_v4().to_string(),
            white_id: white_id.to_string(),
            black_id: black_id.to_string(),
            status: GameStatus::Active,
            fen: INITIAL_FEN.to_string(),
            pgn: String::new(),
            result: None,
            time_control: DEFAULT_TIME_CONTROL.to_string(),
            created_at: now,
            started_at: Some(now),
            ended_at: None,
        }
    }

    pub fn move_count(&self) -> usize {
        self.pgn.split_whitespace().count()
    }

    pub fn is_participant(&self, agent_id: &str) -> bool {
        self.white_id == agent_id || self.black_id == agent_id
    }

    pub fn opponent_of(&self, agent_id: &str) -> Option<&str> {
        if self.white_id == agent_id {
            Some(&self.black_id)
        } else if self.black_id == agent_id {
            Some(&self.white_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_challenge_is_waiting() {
        let game = Game::new_challenge("alpha", "beta", "24h");

        assert!(!game.game_id.is_empty());
        assert_eq!(game.white_id, "alpha");
        assert_eq!(game.black_id, "beta");
        assert_eq!(game.status, GameStatus::Waiting);
        assert_eq!(game.fen, INITIAL_FEN);
        assert!(game.pgn.is_empty());
        assert!(game.result.is_none());
        assert_eq!(game.time_control, "24h");
        assert!(game.started_at.is_none());
        assert!(game.ended_at.is_none());
    }

    #[test]
    fn test_new_paired_is_active() {
        let game = Game::new_paired("alpha", "beta");

        assert_eq!(game.status, GameStatus::Active);
        assert!(game.started_at.is_some());
        assert!(game.ended_at.is_none());
        assert_eq!(game.time_control, DEFAULT_TIME_CONTROL);
    }

    #[test]
    fn test_game_ids_are_unique() {
        let a = Game::new_paired("alpha", "beta");
        let b = Game::new_paired("alpha", "beta");
        assert_ne!(a.game_id, b.game_id);
    }

    #[test]
    fn test_move_count() {
        let mut game = Game::new_paired("alpha", "beta");
        assert_eq!(game.move_count(), 0);

        game.pgn = "e4".to_string();
        assert_eq!(game.move_count(), 1);

        game.pgn = "e4 e5 Nf3".to_string();
        assert_eq!(game.move_count(), 3);
    }

    #[test]
    fn test_participant_helpers() {
        let game = Game::new_paired("alpha", "beta");

        assert!(game.is_participant("alpha"));
        assert!(game.is_participant("beta"));
        assert!(!game.is_participant("gamma"));
        assert_eq!(game.opponent_of("alpha"), Some("beta"));
        assert_eq!(game.opponent_of("beta"), Some("alpha"));
        assert_eq!(game.opponent_of("gamma"), None);
    }

    #[test]
    fn test_status_and_result_wire_format() {
        assert_eq!(
            serde_json::to_string(&GameStatus::Waiting).unwrap(),
            "\"waiting\""
        );
        assert_eq!(
            serde_json::to_string(&GameStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&GameStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&GameResult::WhiteWins).unwrap(),
            "\"1-0\""
        );
        assert_eq!(
            serde_json::to_string(&GameResult::BlackWins).unwrap(),
            "\"0-1\""
        );
        assert_eq!(
            serde_json::to_string(&GameResult::Draw).unwrap(),
            "\"1/2-1/2\""
        );

        let back: GameResult = serde_json::from_str("\"1/2-1/2\"").unwrap();
        assert_eq!(back, GameResult::Draw);
    }
}
