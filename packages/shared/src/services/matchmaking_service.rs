use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{error, info};

use crate::models::agent::Agent;
use crate::models::game::{Game, GameStatus};
use crate::models::ticket::QueueTicket;
use crate::repositories::agent_repository::AgentRepository;
use crate::repositories::game_repository::GameRepository;
use crate::repositories::queue_repository::QueueRepository;
use crate::services::errors::matchmaking_service_errors::MatchmakingServiceError;
use crate::services::game_service::GameService;
use crate::services::notification_service::{GameEvent, NotificationService};

#[derive(Debug)]
pub enum JoinOutcome {
    /// Paired immediately with a waiting agent.
    Matched {
        game: Game,
        opponent: String,
        color: &'static str,
    },
    /// No one was waiting; a ticket now holds the caller's place.
    Queued { position: usize },
    /// The caller was already queued; re-joining changes nothing.
    AlreadyQueued { queue_size: usize },
}

#[derive(Debug, Clone)]
pub struct QueueStatus {
    pub in_queue: bool,
    pub queue_size: usize,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Both pairing paths. They share one invariant: an agent holds at most one
/// active-or-waiting game slot and at most one ticket at any time.
///
/// Color assignment differs by path on purpose: queue pairing orders by
/// name (reproducible for the agents involved), the auto-match sweep
/// randomizes.
#[derive(Clone)]
pub struct MatchmakingService {
    tickets: Arc<dyn QueueRepository + Send + Sync>,
    games: Arc<dyn GameRepository + Send + Sync>,
    agents: Arc<dyn AgentRepository + Send + Sync>,
    game_service: Arc<GameService>,
    notifier: Arc<NotificationService>,
}

impl MatchmakingService {
    pub fn new(
        tickets: Arc<dyn QueueRepository + Send + Sync>,
        games: Arc<dyn GameRepository + Send + Sync>,
        agents: Arc<dyn AgentRepository + Send + Sync>,
        game_service: Arc<GameService>,
        notifier: Arc<NotificationService>,
    ) -> Self {
        MatchmakingService {
            tickets,
            games,
            agents,
            game_service,
            notifier,
        }
    }

    pub async fn join_queue(&self, agent: &Agent) -> Result<JoinOutcome, MatchmakingServiceError> {
        self.ensure_unengaged(agent).await?;

        if self.tickets.get_ticket(&agent.name).await?.is_some() {
            let queue_size = self.tickets.list_tickets().await?.len();
            return Ok(JoinOutcome::AlreadyQueued { queue_size });
        }

        // Oldest ticket first; consume_ticket arbitrates when two joiners
        // race for the same one.
        let mut waiting: Vec<QueueTicket> = self
            .tickets
            .list_tickets()
            .await?
            .into_iter()
            .filter(|t| t.agent_id != agent.name)
            .collect();
        waiting.sort_by_key(|t| t.joined_at);

        for ticket in waiting {
            if !self.tickets.consume_ticket(&ticket.agent_id).await? {
                continue;
            }
            let Some(opponent) = self.agents.get_agent(&ticket.agent_id).await? else {
                continue;
            };

            let (white, black) = if agent.name < opponent.name {
                (agent, &opponent)
            } else {
                (&opponent, agent)
            };
            let game = self.game_service.create_paired_game(white, black).await?;
            info!(
                "Queue pairing: {} vs {} (game {})",
                white.name, black.name, game.game_id
            );

            let opponent_color = if game.white_id == opponent.name {
                "white"
            } else {
                "black"
            };
            self.dispatch(
                &opponent,
                GameEvent::Matched {
                    game_id: game.game_id.clone(),
                    opponent: agent.name.clone(),
                    color: opponent_color,
                },
            );

            let color = if game.white_id == agent.name {
                "white"
            } else {
                "black"
            };
            return Ok(JoinOutcome::Matched {
                game,
                opponent: opponent.name,
                color,
            });
        }

        self.tickets.put_ticket(&QueueTicket::new(&agent.name)).await?;
        let position = self.tickets.list_tickets().await?.len();
        Ok(JoinOutcome::Queued { position })
    }

    /// Returns whether a ticket was actually removed.
    pub async fn leave_queue(&self, agent: &Agent) -> Result<bool, MatchmakingServiceError> {
        Ok(self.tickets.consume_ticket(&agent.name).await?)
    }

    pub async fn queue_status(
        &self,
        agent: &Agent,
    ) -> Result<QueueStatus, MatchmakingServiceError> {
        let ticket = self.tickets.get_ticket(&agent.name).await?;
        let queue_size = self.tickets.list_tickets().await?.len();
        Ok(QueueStatus {
            in_queue: ticket.is_some(),
            queue_size,
            joined_at: ticket.map(|t| t.joined_at),
        })
    }

    /// Periodic sweep: pair off every claimed agent that is not already
    /// playing, awaiting an accept as challenger, or queued. Colors are
    /// random here; an odd agent out just waits for the next sweep.
    pub async fn auto_match_sweep(&self) -> Result<usize, MatchmakingServiceError> {
        let agents = self.agents.list_agents().await?;
        let active = self.games.list_games_by_status(GameStatus::Active).await?;
        let waiting = self.games.list_games_by_status(GameStatus::Waiting).await?;
        let tickets = self.tickets.list_tickets().await?;

        let mut engaged: HashSet<String> = HashSet::new();
        for game in &active {
            engaged.insert(game.white_id.clone());
            engaged.insert(game.black_id.clone());
        }
        // A waiting game only binds its challenger; the challenged side is
        // free until it accepts.
        for game in &waiting {
            engaged.insert(game.white_id.clone());
        }
        for ticket in &tickets {
            engaged.insert(ticket.agent_id.clone());
        }

        let mut idle: Vec<Agent> = agents
            .into_iter()
            .filter(|a| a.is_claimed() && !engaged.contains(&a.name))
            .collect();
        idle.shuffle(&mut rand::thread_rng());

        let mut paired = 0;
        loop {
            let (Some(first), Some(second)) = (idle.pop(), idle.pop()) else {
                break;
            };
            let (white, black) = if rand::thread_rng().gen_bool(0.5) {
                (first, second)
            } else {
                (second, first)
            };

            match self.game_service.create_paired_game(&white, &black).await {
                Ok(game) => {
                    paired += 1;
                    self.dispatch(
                        &white,
                        GameEvent::Matched {
                            game_id: game.game_id.clone(),
                            opponent: black.name.clone(),
                            color: "white",
                        },
                    );
                    self.dispatch(
                        &black,
                        GameEvent::Matched {
                            game_id: game.game_id.clone(),
                            opponent: white.name.clone(),
                            color: "black",
                        },
                    );
                }
                Err(e) => {
                    error!(
                        "Auto-match pairing of {} and {} failed: {}",
                        white.name, black.name, e
                    );
                }
            }
        }

        Ok(paired)
    }

    /// The single-slot invariant at the join boundary.
    async fn ensure_unengaged(&self, agent: &Agent) -> Result<(), MatchmakingServiceError> {
        let active = self
            .games
            .list_games_for_agent(&agent.name, GameStatus::Active)
            .await?;
        if !active.is_empty() {
            return Err(MatchmakingServiceError::Conflict(
                "already playing an active game".to_string(),
            ));
        }
        let waiting = self
            .games
            .list_games_for_agent(&agent.name, GameStatus::Waiting)
            .await?;
        if waiting.iter().any(|g| g.white_id == agent.name) {
            return Err(MatchmakingServiceError::Conflict(
                "already awaiting an opponent in an open challenge".to_string(),
            ));
        }
        Ok(())
    }

    fn dispatch(&self, agent: &Agent, event: GameEvent) {
        let notifier = Arc::clone(&self.notifier);
        let agent = agent.clone();
        tokio::spawn(async move {
            notifier.notify(&agent, event).await;
        });
    }
}
