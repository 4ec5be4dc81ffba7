use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::models::agent::Agent;
use crate::models::game::{Game, GameResult, GameStatus};
use crate::models::move_record::MoveRecord;
use crate::repositories::agent_repository::AgentRepository;
use crate::repositories::game_repository::GameRepository;
use crate::repositories::move_repository::MoveRepository;
use crate::services::elo;
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::notification_service::{GameEvent, NotificationService};
use crate::services::rules_service::{PositionStatus, RulesService, Side};

/// What the caller gets back from a successful move.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub san: String,
    pub fen: String,
    pub status: GameStatus,
    pub result: Option<GameResult>,
}

/// The game lifecycle state machine. Every transition of a game record goes
/// through this service; the repositories' conditional writes make each
/// transition a single atomic commit, so a move and a timeout forfeit racing
/// on the same game cannot both settle it.
#[derive(Clone)]
pub struct GameService {
    games: Arc<dyn GameRepository + Send + Sync>,
    moves: Arc<dyn MoveRepository + Send + Sync>,
    agents: Arc<dyn AgentRepository + Send + Sync>,
    rules: RulesService,
    notifier: Arc<NotificationService>,
}

impl GameService {
    pub fn new(
        games: Arc<dyn GameRepository + Send + Sync>,
        moves: Arc<dyn MoveRepository + Send + Sync>,
        agents: Arc<dyn AgentRepository + Send + Sync>,
        rules: RulesService,
        notifier: Arc<NotificationService>,
    ) -> Self {
        GameService {
            games,
            moves,
            agents,
            rules,
            notifier,
        }
    }

    /// Direct challenge. The challenger always plays white; the game waits
    /// for the opponent to accept.
    pub async fn challenge(
        &self,
        challenger: &Agent,
        opponent_name: &str,
        time_control: &str,
    ) -> Result<Game, GameServiceError> {
        let opponent = self
            .agents
            .get_agent(opponent_name)
            .await?
            .ok_or(GameServiceError::AgentNotFound)?;
        if opponent.name == challenger.name {
            return Err(GameServiceError::Validation(
                "cannot challenge yourself".to_string(),
            ));
        }

        let game = Game::new_challenge(&challenger.name, &opponent.name, time_control);
        self.games.create_game(&game).await?;
        info!(
            "{} challenged {} (game {})",
            challenger.name, opponent.name, game.game_id
        );

        self.dispatch(
            &opponent,
            GameEvent::ChallengeReceived {
                game_id: game.game_id.clone(),
                challenger: challenger.name.clone(),
                time_control: game.time_control.clone(),
            },
        );

        Ok(game)
    }

    /// Open challenges addressed to this agent.
    pub async fn pending_challenges(&self, agent: &Agent) -> Result<Vec<Game>, GameServiceError> {
        let waiting = self
            .games
            .list_games_for_agent(&agent.name, GameStatus::Waiting)
            .await?;
        Ok(waiting
            .into_iter()
            .filter(|g| g.black_id == agent.name)
            .collect())
    }

    /// Accepts a waiting challenge. Only the designated black side may do
    /// this.
    pub async fn accept_challenge(
        &self,
        agent: &Agent,
        game_id: &str,
    ) -> Result<Game, GameServiceError> {
        let mut game = self
            .games
            .get_game(game_id)
            .await?
            .ok_or(GameServiceError::GameNotFound)?;

        if game.black_id != agent.name {
            return Err(GameServiceError::Forbidden(
                "this challenge is not addressed to you".to_string(),
            ));
        }
        if game.status != GameStatus::Waiting {
            return Err(GameServiceError::Conflict(
                "challenge is no longer open".to_string(),
            ));
        }

        game.status = GameStatus::Active;
        game.started_at = Some(Utc::now());
        if !self.games.update_game_if_waiting(&game).await? {
            return Err(GameServiceError::Conflict(
                "challenge is no longer open".to_string(),
            ));
        }
        info!("{} accepted game {}", agent.name, game.game_id);

        match self.agents.get_agent(&game.white_id).await {
            Ok(Some(challenger)) => self.dispatch(
                &challenger,
                GameEvent::GameStarted {
                    game_id: game.game_id.clone(),
                    opponent: agent.name.clone(),
                    color: "white",
                },
            ),
            Ok(None) => {}
            Err(e) => warn!("Could not load {} for notification: {}", game.white_id, e),
        }

        Ok(game)
    }

    /// Creates a game that is active from the start, for both matchmaking
    /// paths. Color assignment is the caller's business.
    pub async fn create_paired_game(
        &self,
        white: &Agent,
        black: &Agent,
    ) -> Result<Game, GameServiceError> {
        let game = Game::new_paired(&white.name, &black.name);
        self.games.create_game(&game).await?;
        info!(
            "Paired {} (white) vs {} (black) in game {}",
            white.name, black.name, game.game_id
        );
        Ok(game)
    }

    /// Validates and applies one move, appends the move record, and settles
    /// the game if the move ends it.
    pub async fn play_move(
        &self,
        agent: &Agent,
        game_id: &str,
        input: &str,
    ) -> Result<MoveOutcome, GameServiceError> {
        let mut game = self
            .games
            .get_game(game_id)
            .await?
            .ok_or(GameServiceError::GameNotFound)?;

        if game.status != GameStatus::Active {
            return Err(GameServiceError::Conflict(
                "game is not active".to_string(),
            ));
        }
        let side = side_of(&game, &agent.name).ok_or_else(|| {
            GameServiceError::Forbidden("you are not a player in this game".to_string())
        })?;
        if side != self.rules.side_to_move(&game.fen)? {
            return Err(GameServiceError::Validation("not your turn".to_string()));
        }

        let applied = self.rules.apply_move(&game.fen, input)?;

        let seq = game.move_count() as u32 + 1;
        game.fen = applied.fen_after.clone();
        game.pgn = if game.pgn.is_empty() {
            applied.san.clone()
        } else {
            format!("{} {}", game.pgn, applied.san)
        };
        let record = MoveRecord::new(&game.game_id, seq, &applied.san, &game.fen);

        let result = match applied.status {
            PositionStatus::Checkmate => Some(match side {
                Side::White => GameResult::WhiteWins,
                Side::Black => GameResult::BlackWins,
            }),
            PositionStatus::Stalemate => Some(GameResult::Draw),
            PositionStatus::Ongoing => {
                if self.rules.is_insufficient_material(&game.fen)?
                    || self.rules.can_claim_draw(&game.pgn)?
                {
                    Some(GameResult::Draw)
                } else {
                    None
                }
            }
        };

        match result {
            None => {
                if !self.games.update_game_if_active(&game).await? {
                    return Err(GameServiceError::Conflict(
                        "game is not active".to_string(),
                    ));
                }
                self.moves.append_move(&record).await?;

                let opponent_name = match side {
                    Side::White => game.black_id.clone(),
                    Side::Black => game.white_id.clone(),
                };
                match self.agents.get_agent(&opponent_name).await {
                    Ok(Some(opponent)) => self.dispatch(
                        &opponent,
                        GameEvent::YourTurn {
                            game_id: game.game_id.clone(),
                            opponent: agent.name.clone(),
                            fen: game.fen.clone(),
                        },
                    ),
                    Ok(None) => {}
                    Err(e) => warn!("Could not load {} for notification: {}", opponent_name, e),
                }

                Ok(MoveOutcome {
                    san: applied.san,
                    fen: game.fen,
                    status: GameStatus::Active,
                    result: None,
                })
            }
            Some(result) => {
                game.status = GameStatus::Completed;
                game.result = Some(result);
                game.ended_at = Some(Utc::now());
                if !self.games.update_game_if_active(&game).await? {
                    return Err(GameServiceError::Conflict(
                        "game is not active".to_string(),
                    ));
                }
                self.moves.append_move(&record).await?;
                self.settle_and_notify(&game, result).await?;

                Ok(MoveOutcome {
                    san: applied.san,
                    fen: game.fen.clone(),
                    status: GameStatus::Completed,
                    result: Some(result),
                })
            }
        }
    }

    /// Resignation. The other side scores the win; no move record is
    /// written.
    pub async fn resign(&self, agent: &Agent, game_id: &str) -> Result<Game, GameServiceError> {
        let game = self
            .games
            .get_game(game_id)
            .await?
            .ok_or(GameServiceError::GameNotFound)?;

        if game.status != GameStatus::Active {
            return Err(GameServiceError::Conflict(
                "game is not active".to_string(),
            ));
        }
        let side = side_of(&game, &agent.name).ok_or_else(|| {
            GameServiceError::Forbidden("you are not a player in this game".to_string())
        })?;
        let result = match side {
            Side::White => GameResult::BlackWins,
            Side::Black => GameResult::WhiteWins,
        };

        info!("{} resigned game {}", agent.name, game.game_id);
        self.finish(game, result)
            .await?
            .ok_or_else(|| GameServiceError::Conflict("game is not active".to_string()))
    }

    /// Timeout forfeit, driven by the sweeper: the side to move loses.
    /// Returns false when the game was settled by someone else in the
    /// meantime, which is a no-op rather than an error.
    pub async fn forfeit_on_timeout(&self, game: &Game) -> Result<bool, GameServiceError> {
        if game.status != GameStatus::Active {
            return Ok(false);
        }
        let loser = self.rules.side_to_move(&game.fen)?;
        let result = match loser {
            Side::White => GameResult::BlackWins,
            Side::Black => GameResult::WhiteWins,
        };

        match self.finish(game.clone(), result).await? {
            Some(finished) => {
                info!(
                    "Game {} forfeited on timeout, {} wins",
                    finished.game_id,
                    match result {
                        GameResult::WhiteWins => &finished.white_id,
                        _ => &finished.black_id,
                    }
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Game, GameServiceError> {
        self.games
            .get_game(game_id)
            .await?
            .ok_or(GameServiceError::GameNotFound)
    }

    pub async fn active_games_for(&self, agent: &Agent) -> Result<Vec<Game>, GameServiceError> {
        Ok(self
            .games
            .list_games_for_agent(&agent.name, GameStatus::Active)
            .await?)
    }

    pub async fn live_games(&self, limit: usize) -> Result<Vec<Game>, GameServiceError> {
        let mut games = self.games.list_games_by_status(GameStatus::Active).await?;
        games.truncate(limit);
        Ok(games)
    }

    pub async fn archive(
        &self,
        limit: usize,
        agent_name: Option<&str>,
    ) -> Result<Vec<Game>, GameServiceError> {
        Ok(self.games.list_completed_games(limit, agent_name).await?)
    }

    /// Which agent the position says must move next.
    pub fn agent_to_move(&self, game: &Game) -> Result<String, GameServiceError> {
        Ok(match self.rules.side_to_move(&game.fen)? {
            Side::White => game.white_id.clone(),
            Side::Black => game.black_id.clone(),
        })
    }

    pub fn side_to_move(&self, game: &Game) -> Result<Side, GameServiceError> {
        Ok(self.rules.side_to_move(&game.fen)?)
    }

    /// Terminal bookkeeping shared by resign and timeout forfeiture: flip
    /// the status under the active-guard, then settle ratings and counters
    /// exactly once. Returns None when the guard shows the game was already
    /// settled.
    async fn finish(
        &self,
        mut game: Game,
        result: GameResult,
    ) -> Result<Option<Game>, GameServiceError> {
        game.status = GameStatus::Completed;
        game.result = Some(result);
        game.ended_at = Some(Utc::now());
        if !self.games.update_game_if_active(&game).await? {
            return Ok(None);
        }
        self.settle_and_notify(&game, result).await?;
        Ok(Some(game))
    }

    /// Applies the rating update and counters to both agents, then fires
    /// game-over notifications. Only ever called by the writer that won the
    /// active-to-completed flip.
    async fn settle_and_notify(
        &self,
        game: &Game,
        result: GameResult,
    ) -> Result<(), GameServiceError> {
        let mut white = self
            .agents
            .get_agent(&game.white_id)
            .await?
            .ok_or(GameServiceError::AgentNotFound)?;
        let mut black = self
            .agents
            .get_agent(&game.black_id)
            .await?
            .ok_or(GameServiceError::AgentNotFound)?;

        white.games_played += 1;
        black.games_played += 1;
        match result {
            GameResult::WhiteWins => {
                white.wins += 1;
                black.losses += 1;
                let (w, b) = elo::update(white.elo, black.elo, false);
                white.elo = w;
                black.elo = b;
            }
            GameResult::BlackWins => {
                black.wins += 1;
                white.losses += 1;
                let (b, w) = elo::update(black.elo, white.elo, false);
                black.elo = b;
                white.elo = w;
            }
            GameResult::Draw => {
                white.draws += 1;
                black.draws += 1;
                let (w, b) = elo::update(white.elo, black.elo, true);
                white.elo = w;
                black.elo = b;
            }
        }
        self.agents.update_agent(&white).await?;
        self.agents.update_agent(&black).await?;

        self.dispatch(
            &white,
            GameEvent::GameOver {
                game_id: game.game_id.clone(),
                opponent: black.name.clone(),
                result,
                fen: game.fen.clone(),
            },
        );
        self.dispatch(
            &black,
            GameEvent::GameOver {
                game_id: game.game_id.clone(),
                opponent: white.name.clone(),
                result,
                fen: game.fen.clone(),
            },
        );

        Ok(())
    }

    /// Fire-and-forget delivery on a detached task: notification transport
    /// never blocks or fails a state transition.
    fn dispatch(&self, agent: &Agent, event: GameEvent) {
        let notifier = Arc::clone(&self.notifier);
        let agent = agent.clone();
        tokio::spawn(async move {
            notifier.notify(&agent, event).await;
        });
    }
}

fn side_of(game: &Game, agent_id: &str) -> Option<Side> {
    if game.white_id == agent_id {
        Some(Side::White)
    } else if game.black_id == agent_id {
        Some(Side::Black)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::INITIAL_FEN;
    use crate::repositories::agent_repository::tests::MockAgentRepository;
    use crate::repositories::game_repository::tests::MockGameRepository;
    use crate::repositories::move_repository::tests::MockMoveRepository;

    struct Fixture {
        service: GameService,
        games: Arc<MockGameRepository>,
        moves: Arc<MockMoveRepository>,
        agents: Arc<MockAgentRepository>,
        alice: Agent,
        bob: Agent,
    }

    fn fixture() -> Fixture {
        let alice = Agent::new("Alice", None, None);
        let bob = Agent::new("Bob", None, None);
        let agents = Arc::new(
            MockAgentRepository::new()
                .with_agent(alice.clone())
                .with_agent(bob.clone()),
        );
        let games = Arc::new(MockGameRepository::new());
        let moves = Arc::new(MockMoveRepository::new());
        let service = GameService::new(
            games.clone(),
            moves.clone(),
            agents.clone(),
            RulesService::new(),
            Arc::new(NotificationService::new()),
        );
        Fixture {
            service,
            games,
            moves,
            agents,
            alice,
            bob,
        }
    }

    async fn active_game(f: &Fixture) -> Game {
        f.service
            .create_paired_game(&f.alice, &f.bob)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_challenge_creates_waiting_game() {
        let f = fixture();
        let game = f.service.challenge(&f.alice, "Bob", "24h").await.unwrap();

        assert_eq!(game.white_id, "Alice");
        assert_eq!(game.black_id, "Bob");
        assert_eq!(game.status, GameStatus::Waiting);
        assert_eq!(game.fen, INITIAL_FEN);
        assert!(game.pgn.is_empty());
        assert!(game.started_at.is_none());

        let stored = f.games.get_game(&game.game_id).await.unwrap().unwrap();
        assert_eq!(stored.status, GameStatus::Waiting);
    }

    #[tokio::test]
    async fn test_challenge_unknown_opponent_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .challenge(&f.alice, "Nobody", "24h")
            .await
            .unwrap_err();
        assert!(matches!(err, GameServiceError::AgentNotFound));
    }

    #[tokio::test]
    async fn test_challenge_self_is_rejected() {
        let f = fixture();
        let err = f
            .service
            .challenge(&f.alice, "Alice", "24h")
            .await
            .unwrap_err();
        assert!(matches!(err, GameServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_accept_transitions_waiting_to_active() {
        let f = fixture();
        let game = f.service.challenge(&f.alice, "Bob", "24h").await.unwrap();

        let accepted = f
            .service
            .accept_challenge(&f.bob, &game.game_id)
            .await
            .unwrap();

        assert_eq!(accepted.status, GameStatus::Active);
        assert!(accepted.started_at.is_some());
        let stored = f.games.get_game(&game.game_id).await.unwrap().unwrap();
        assert_eq!(stored.status, GameStatus::Active);
    }

    #[tokio::test]
    async fn test_accept_by_wrong_agent_is_forbidden() {
        let f = fixture();
        let game = f.service.challenge(&f.alice, "Bob", "24h").await.unwrap();

        let err = f
            .service
            .accept_challenge(&f.alice, &game.game_id)
            .await
            .unwrap_err();
        assert!(matches!(err, GameServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_accept_twice_is_a_conflict() {
        let f = fixture();
        let game = f.service.challenge(&f.alice, "Bob", "24h").await.unwrap();
        f.service
            .accept_challenge(&f.bob, &game.game_id)
            .await
            .unwrap();

        let err = f
            .service
            .accept_challenge(&f.bob, &game.game_id)
            .await
            .unwrap_err();
        assert!(matches!(err, GameServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_pending_challenges_lists_only_incoming() {
        let f = fixture();
        f.service.challenge(&f.alice, "Bob", "24h").await.unwrap();

        let bobs = f.service.pending_challenges(&f.bob).await.unwrap();
        assert_eq!(bobs.len(), 1);

        let alices = f.service.pending_challenges(&f.alice).await.unwrap();
        assert!(alices.is_empty());
    }

    #[tokio::test]
    async fn test_move_on_waiting_game_is_conflict_and_mutates_nothing() {
        let f = fixture();
        let game = f.service.challenge(&f.alice, "Bob", "24h").await.unwrap();

        let err = f
            .service
            .play_move(&f.alice, &game.game_id, "e4")
            .await
            .unwrap_err();
        assert!(matches!(err, GameServiceError::Conflict(_)));

        let stored = f.games.get_game(&game.game_id).await.unwrap().unwrap();
        assert_eq!(stored.fen, INITIAL_FEN);
        assert!(stored.pgn.is_empty());
        assert!(f.moves.list_moves(&game.game_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_by_outsider_is_forbidden() {
        let f = fixture();
        let game = active_game(&f).await;
        let carol = Agent::new("Carol", None, None);

        let err = f
            .service
            .play_move(&carol, &game.game_id, "e4")
            .await
            .unwrap_err();
        assert!(matches!(err, GameServiceError::Forbidden(_)));

        let err = f.service.resign(&carol, &game.game_id).await.unwrap_err();
        assert!(matches!(err, GameServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_move_out_of_turn_is_rejected() {
        let f = fixture();
        let game = active_game(&f).await;

        // Black cannot open.
        let err = f
            .service
            .play_move(&f.bob, &game.game_id, "e5")
            .await
            .unwrap_err();
        match err {
            GameServiceError::Validation(msg) => assert_eq!(msg, "not your turn"),
            other => panic!("expected turn validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_legal_move_updates_game_and_appends_record() {
        let f = fixture();
        let game = active_game(&f).await;

        let outcome = f
            .service
            .play_move(&f.alice, &game.game_id, "e4")
            .await
            .unwrap();
        assert_eq!(outcome.san, "e4");
        assert_eq!(outcome.status, GameStatus::Active);
        assert!(outcome.result.is_none());

        let stored = f.games.get_game(&game.game_id).await.unwrap().unwrap();
        assert_eq!(stored.pgn, "e4");
        assert_eq!(stored.fen, outcome.fen);

        let records = f.moves.list_moves(&game.game_id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].seq, 1);
        assert_eq!(records[0].san, "e4");
        assert_eq!(records[0].fen_after, stored.fen);
    }

    #[tokio::test]
    async fn test_transcript_replay_reproduces_stored_position() {
        let f = fixture();
        let game = active_game(&f).await;
        let rules = RulesService::new();

        for (agent, mv) in [
            (&f.alice, "e4"),
            (&f.bob, "e5"),
            (&f.alice, "Nf3"),
            (&f.bob, "Nc6"),
        ] {
            f.service.play_move(agent, &game.game_id, mv).await.unwrap();
        }

        let stored = f.games.get_game(&game.game_id).await.unwrap().unwrap();
        let replayed = rules.replay_transcript(&stored.pgn).unwrap();
        assert_eq!(replayed, stored.fen);
    }

    #[tokio::test]
    async fn test_second_consecutive_move_is_rejected() {
        let f = fixture();
        let game = active_game(&f).await;
        f.service
            .play_move(&f.alice, &game.game_id, "e4")
            .await
            .unwrap();

        let err = f
            .service
            .play_move(&f.alice, &game.game_id, "d4")
            .await
            .unwrap_err();
        match err {
            GameServiceError::Validation(msg) => assert_eq!(msg, "not your turn"),
            other => panic!("expected turn validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_move_syntax_and_legality_errors() {
        let f = fixture();
        let game = active_game(&f).await;

        let err = f
            .service
            .play_move(&f.alice, &game.game_id, "zz9")
            .await
            .unwrap_err();
        match err {
            GameServiceError::Validation(msg) => assert_eq!(msg, "invalid move syntax"),
            other => panic!("expected syntax error, got {:?}", other),
        }

        let err = f
            .service
            .play_move(&f.alice, &game.game_id, "e2e5")
            .await
            .unwrap_err();
        match err {
            GameServiceError::Validation(msg) => assert_eq!(msg, "illegal move"),
            other => panic!("expected legality error, got {:?}", other),
        }

        // Nothing was persisted along the way.
        assert!(f.moves.list_moves(&game.game_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkmate_completes_game_and_settles_ratings() {
        let f = fixture();
        let game = active_game(&f).await;

        for (agent, mv) in [(&f.alice, "f3"), (&f.bob, "e5"), (&f.alice, "g4")] {
            let outcome = f.service.play_move(agent, &game.game_id, mv).await.unwrap();
            assert_eq!(outcome.status, GameStatus::Active);
        }
        let outcome = f
            .service
            .play_move(&f.bob, &game.game_id, "Qh4")
            .await
            .unwrap();

        assert_eq!(outcome.san, "Qh4#");
        assert_eq!(outcome.status, GameStatus::Completed);
        assert_eq!(outcome.result, Some(GameResult::BlackWins));

        let stored = f.games.get_game(&game.game_id).await.unwrap().unwrap();
        assert_eq!(stored.status, GameStatus::Completed);
        assert_eq!(stored.result, Some(GameResult::BlackWins));
        assert!(stored.ended_at.is_some());
        assert_eq!(f.moves.list_moves(&game.game_id).await.unwrap().len(), 4);

        let alice = f.agents.get_agent("Alice").await.unwrap().unwrap();
        let bob = f.agents.get_agent("Bob").await.unwrap().unwrap();
        assert_eq!(alice.games_played, 1);
        assert_eq!(bob.games_played, 1);
        assert_eq!(alice.losses, 1);
        assert_eq!(bob.wins, 1);
        assert_eq!(alice.elo, 1184);
        assert_eq!(bob.elo, 1216);
    }

    #[tokio::test]
    async fn test_completed_game_rejects_further_moves() {
        let f = fixture();
        let game = active_game(&f).await;
        for (agent, mv) in [
            (&f.alice, "f3"),
            (&f.bob, "e5"),
            (&f.alice, "g4"),
            (&f.bob, "Qh4"),
        ] {
            f.service.play_move(agent, &game.game_id, mv).await.unwrap();
        }

        let err = f
            .service
            .play_move(&f.alice, &game.game_id, "a3")
            .await
            .unwrap_err();
        assert!(matches!(err, GameServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_resign_awards_the_other_side_without_a_move_record() {
        let f = fixture();
        let game = active_game(&f).await;

        let finished = f.service.resign(&f.alice, &game.game_id).await.unwrap();

        assert_eq!(finished.status, GameStatus::Completed);
        assert_eq!(finished.result, Some(GameResult::BlackWins));
        assert!(f.moves.list_moves(&game.game_id).await.unwrap().is_empty());

        let bob = f.agents.get_agent("Bob").await.unwrap().unwrap();
        assert_eq!(bob.wins, 1);
        assert_eq!(bob.elo, 1216);
    }

    #[tokio::test]
    async fn test_resign_requires_active_game() {
        let f = fixture();
        let game = f.service.challenge(&f.alice, "Bob", "24h").await.unwrap();

        let err = f.service.resign(&f.alice, &game.game_id).await.unwrap_err();
        assert!(matches!(err, GameServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_forfeit_loses_the_side_to_move() {
        let f = fixture();
        let game = active_game(&f).await;
        // White to move in the initial position, so white forfeits.
        let forfeited = f.service.forfeit_on_timeout(&game).await.unwrap();
        assert!(forfeited);

        let stored = f.games.get_game(&game.game_id).await.unwrap().unwrap();
        assert_eq!(stored.result, Some(GameResult::BlackWins));
    }

    #[tokio::test]
    async fn test_forfeit_after_completion_is_a_noop() {
        let f = fixture();
        let game = active_game(&f).await;
        f.service.resign(&f.bob, &game.game_id).await.unwrap();

        let stale = f.games.get_game(&game.game_id).await.unwrap().unwrap();
        let mut raced = stale.clone();
        raced.status = GameStatus::Active;
        let forfeited = f.service.forfeit_on_timeout(&raced).await.unwrap();
        assert!(!forfeited);

        // Ratings were settled exactly once, by the resignation.
        let alice = f.agents.get_agent("Alice").await.unwrap().unwrap();
        assert_eq!(alice.games_played, 1);
        assert_eq!(alice.elo, 1216);
    }

    #[tokio::test]
    async fn test_active_games_listing() {
        let f = fixture();
        let game = active_game(&f).await;

        let active = f.service.active_games_for(&f.alice).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].game_id, game.game_id);

        assert_eq!(
            f.service.agent_to_move(&active[0]).unwrap(),
            "Alice".to_string()
        );
    }
}
