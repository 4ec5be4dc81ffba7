use crate::models::game::{Game, GameStatus};
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::warn;

#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError>;

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError>;

    /// Replaces the stored game only if its persisted status is still
    /// `waiting`. Returns false when the guard fails, i.e. another writer
    /// already moved the game on.
    async fn update_game_if_waiting(&self, game: &Game) -> Result<bool, GameRepositoryError>;

    /// Replaces the stored game only if its persisted status is still
    /// `active`. Every move commit and every termination goes through this
    /// guard, so two racing writers cannot both settle the same game.
    async fn update_game_if_active(&self, game: &Game) -> Result<bool, GameRepositoryError>;

    async fn list_games_by_status(
        &self,
        status: GameStatus,
    ) -> Result<Vec<Game>, GameRepositoryError>;

    async fn list_games_for_agent(
        &self,
        agent_id: &str,
        status: GameStatus,
    ) -> Result<Vec<Game>, GameRepositoryError>;

    /// Completed games, most recently ended first, optionally restricted to
    /// one agent's games.
    async fn list_completed_games(
        &self,
        limit: usize,
        agent_id: Option<&str>,
    ) -> Result<Vec<Game>, GameRepositoryError>;
}

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client) -> Self {
        let table_name =
            std::env::var("GAMES_TABLE").expect("GAMES_TABLE environment variable must be set");
        Self { client, table_name }
    }

    async fn conditional_put(
        &self,
        game: &Game,
        required_status: GameStatus,
    ) -> Result<bool, GameRepositoryError> {
        let item = serde_dynamo::to_item(game)
            .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("#status = :required")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":required",
                AttributeValue::S(required_status.to_string()),
            );

        match request.send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    Ok(false)
                } else {
                    Err(GameRepositoryError::DynamoDb(service_err.to_string()))
                }
            }
        }
    }

    fn parse_items(items: Vec<std::collections::HashMap<String, AttributeValue>>) -> Vec<Game> {
        items
            .into_iter()
            .filter_map(|item| match serde_dynamo::from_item(item) {
                Ok(game) => Some(game),
                Err(e) => {
                    warn!("Failed to parse game item: {:?}", e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let item = serde_dynamo::to_item(game)
            .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("game_id", AttributeValue::S(game_id.to_string()))
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            let game: Game = serde_dynamo::from_item(item)
                .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(game))
        } else {
            Ok(None)
        }
    }

    async fn update_game_if_waiting(&self, game: &Game) -> Result<bool, GameRepositoryError> {
        self.conditional_put(game, GameStatus::Waiting).await
    }

    async fn update_game_if_active(&self, game: &Game) -> Result<bool, GameRepositoryError> {
        self.conditional_put(game, GameStatus::Active).await
    }

    async fn list_games_by_status(
        &self,
        status: GameStatus,
    ) -> Result<Vec<Game>, GameRepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression("#status = :status")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":status", AttributeValue::S(status.to_string()))
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        Ok(Self::parse_items(result.items.unwrap_or_default()))
    }

    async fn list_games_for_agent(
        &self,
        agent_id: &str,
        status: GameStatus,
    ) -> Result<Vec<Game>, GameRepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression("(white_id = :agent OR black_id = :agent) AND #status = :status")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":agent", AttributeValue::S(agent_id.to_string()))
            .expression_attribute_values(":status", AttributeValue::S(status.to_string()))
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        Ok(Self::parse_items(result.items.unwrap_or_default()))
    }

    async fn list_completed_games(
        &self,
        limit: usize,
        agent_id: Option<&str>,
    ) -> Result<Vec<Game>, GameRepositoryError> {
        let mut games = match agent_id {
            Some(agent) => self.list_games_for_agent(agent, GameStatus::Completed).await?,
            None => self.list_games_by_status(GameStatus::Completed).await?,
        };
        games.sort_by_key(|g| std::cmp::Reverse(g.ended_at));
        games.truncate(limit);
        Ok(games)
    }
}
