use std::time::Duration;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::agent::Agent;
use crate::models::game::GameResult;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle events delivered to an agent's registered webhook.
#[derive(Debug, Clone)]
pub enum GameEvent {
    ChallengeReceived {
        game_id: String,
        challenger: String,
        time_control: String,
    },
    GameStarted {
        game_id: String,
        opponent: String,
        color: &'static str,
    },
    Matched {
        game_id: String,
        opponent: String,
        color: &'static str,
    },
    YourTurn {
        game_id: String,
        opponent: String,
        fen: String,
    },
    GameOver {
        game_id: String,
        opponent: String,
        result: GameResult,
        fen: String,
    },
}

impl GameEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GameEvent::ChallengeReceived { .. } => "challenge_received",
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::Matched { .. } => "game_matched",
            GameEvent::YourTurn { .. } => "your_turn",
            GameEvent::GameOver { .. } => "game_over",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            GameEvent::ChallengeReceived {
                game_id,
                challenger,
                time_control,
            } => json!({
                "event": self.event_type(),
                "game_id": game_id,
                "opponent": challenger,
                "time_control": time_control,
                "message": format!("{} challenged you to a game", challenger),
            }),
            GameEvent::GameStarted {
                game_id,
                opponent,
                color,
            } => json!({
                "event": self.event_type(),
                "game_id": game_id,
                "opponent": opponent,
                "your_color": color,
                "message": format!("Game against {} has started", opponent),
            }),
            GameEvent::Matched {
                game_id,
                opponent,
                color,
            } => json!({
                "event": self.event_type(),
                "game_id": game_id,
                "opponent": opponent,
                "your_color": color,
                "message": format!("Matched with {}. Game started", opponent),
            }),
            GameEvent::YourTurn {
                game_id,
                opponent,
                fen,
            } => json!({
                "event": self.event_type(),
                "game_id": game_id,
                "opponent": opponent,
                "fen": fen,
                "message": format!("{} moved. It is your turn", opponent),
            }),
            GameEvent::GameOver {
                game_id,
                opponent,
                result,
                fen,
            } => json!({
                "event": self.event_type(),
                "game_id": game_id,
                "opponent": opponent,
                "result": result.to_string(),
                "fen": fen,
                "message": format!("Game against {} finished {}", opponent, result),
            }),
        }
    }
}

/// Best-effort webhook delivery. One attempt, short timeout, every failure
/// swallowed after a log line; callers never see an error.
#[derive(Clone)]
pub struct NotificationService {
    client: reqwest::Client,
}

impl NotificationService {
    pub fn new() -> Self {
        NotificationService {
            client: reqwest::Client::new(),
        }
    }

    pub async fn notify(&self, agent: &Agent, event: GameEvent) {
        let Some(url) = &agent.callback_url else {
            return;
        };

        let payload = event.payload();
        match self
            .client
            .post(url)
            .json(&payload)
            .timeout(DELIVERY_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!(
                    "Delivered {} notification to {}",
                    event.event_type(),
                    agent.name
                );
            }
            Ok(response) => {
                warn!(
                    "Webhook for {} returned status {}",
                    agent.name,
                    response.status()
                );
            }
            Err(e) => {
                warn!("Webhook delivery to {} failed: {}", agent.name, e);
            }
        }
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_without_endpoint_is_a_noop() {
        let agent = Agent::new("Silent", None, None);
        let service = NotificationService::new();

        // Must return without attempting any delivery.
        service
            .notify(
                &agent,
                GameEvent::YourTurn {
                    game_id: "g1".to_string(),
                    opponent: "Other".to_string(),
                    fen: "fen".to_string(),
                },
            )
            .await;
    }

    #[test]
    fn test_payload_carries_event_tag_and_context() {
        let event = GameEvent::GameOver {
            game_id: "g1".to_string(),
            opponent: "Rival".to_string(),
            result: GameResult::WhiteWins,
            fen: "fen".to_string(),
        };
        let payload = event.payload();

        assert_eq!(payload["event"], "game_over");
        assert_eq!(payload["game_id"], "g1");
        assert_eq!(payload["opponent"], "Rival");
        assert_eq!(payload["result"], "1-0");
        assert_eq!(payload["fen"], "fen");
        assert!(payload["message"].as_str().unwrap().contains("Rival"));
    }

    #[test]
    fn test_turn_payload_has_position() {
        let event = GameEvent::YourTurn {
            game_id: "g2".to_string(),
            opponent: "Rival".to_string(),
            fen: "some-fen".to_string(),
        };
        let payload = event.payload();

        assert_eq!(payload["event"], "your_turn");
        assert_eq!(payload["fen"], "some-fen");
    }
}
