use crate::models::move_record::MoveRecord;
use crate::repositories::errors::move_repository_errors::MoveRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::warn;

#[async_trait]
pub trait MoveRepository: Send + Sync {
    async fn append_move(&self, record: &MoveRecord) -> Result<(), MoveRepositoryError>;

    /// All moves of a game in sequence order.
    async fn list_moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, MoveRepositoryError>;
}

pub struct DynamoDbMoveRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbMoveRepository {
    pub fn new(client: Client) -> Self {
        let table_name =
            std::env::var("MOVES_TABLE").expect("MOVES_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
impl MoveRepository for DynamoDbMoveRepository {
    async fn append_move(&self, record: &MoveRecord) -> Result<(), MoveRepositoryError> {
        let item = serde_dynamo::to_item(record)
            .map_err(|e| MoveRepositoryError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| MoveRepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    async fn list_moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, MoveRepositoryError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("game_id = :game_id")
            .expression_attribute_values(":game_id", AttributeValue::S(game_id.to_string()))
            .send()
            .await
            .map_err(|e| MoveRepositoryError::DynamoDb(e.to_string()))?;

        let moves = result
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match serde_dynamo::from_item(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Failed to parse move item: {:?}", e);
                    None
                }
            })
            .collect();

        Ok(moves)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockMoveRepository {
        moves: Mutex<Vec<MoveRecord>>,
    }

    impl MockMoveRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Test helper: rewrite a stored move's timestamp.
        pub fn set_played_at(&self, game_id: &str, seq: u32, played_at: chrono::DateTime<chrono::Utc>) {
            let mut moves = self.moves.lock().unwrap();
            for record in moves.iter_mut() {
                if record.game_id == game_id && record.seq == seq {
                    record.played_at = played_at;
                }
            }
        }
    }

    #[async_trait]
    impl MoveRepository for MockMoveRepository {
        async fn append_move(&self, record: &MoveRecord) -> Result<(), MoveRepositoryError> {
            self.moves.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn list_moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, MoveRepositoryError> {
            let mut moves: Vec<MoveRecord> = self
                .moves
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.game_id == game_id)
                .cloned()
                .collect();
            moves.sort_by_key(|m| m.seq);
            Ok(moves)
        }
    }
}
