use crate::models::ticket::QueueTicket;
use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::warn;

#[async_trait]
pub trait QueueRepository: Send + Sync {
    async fn put_ticket(&self, ticket: &QueueTicket) -> Result<(), QueueRepositoryError>;

    async fn get_ticket(&self, agent_id: &str)
        -> Result<Option<QueueTicket>, QueueRepositoryError>;

    async fn list_tickets(&self) -> Result<Vec<QueueTicket>, QueueRepositoryError>;

    /// Deletes the ticket only if it still exists. Returns false when
    /// another pairing attempt consumed it first; exactly one caller ever
    /// sees true for a given ticket.
    async fn consume_ticket(&self, agent_id: &str) -> Result<bool, QueueRepositoryError>;
}

pub struct DynamoDbQueueRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbQueueRepository {
    pub fn new(client: Client) -> Self {
        let table_name = std::env::var("MATCHMAKING_TABLE")
            .expect("MATCHMAKING_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
impl QueueRepository for DynamoDbQueueRepository {
    async fn put_ticket(&self, ticket: &QueueTicket) -> Result<(), QueueRepositoryError> {
        let item = serde_dynamo::to_item(ticket)
            .map_err(|e| QueueRepositoryError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| QueueRepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    async fn get_ticket(
        &self,
        agent_id: &str,
    ) -> Result<Option<QueueTicket>, QueueRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("agent_id", AttributeValue::S(agent_id.to_string()))
            .send()
            .await
            .map_err(|e| QueueRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            let ticket: QueueTicket = serde_dynamo::from_item(item)
                .map_err(|e| QueueRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(ticket))
        } else {
            Ok(None)
        }
    }

    async fn list_tickets(&self) -> Result<Vec<QueueTicket>, QueueRepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| QueueRepositoryError::DynamoDb(e.to_string()))?;

        let tickets = result
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match serde_dynamo::from_item(item) {
                Ok(ticket) => Some(ticket),
                Err(e) => {
                    warn!("Failed to parse queue ticket: {:?}", e);
                    None
                }
            })
            .collect();

        Ok(tickets)
    }

    async fn consume_ticket(&self, agent_id: &str) -> Result<bool, QueueRepositoryError> {
        let request = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("agent_id", AttributeValue::S(agent_id.to_string()))
            .condition_expression("attribute_exists(agent_id)");

        match request.send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    Ok(false)
                } else {
                    Err(QueueRepositoryError::DynamoDb(service_err.to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockQueueRepository {
        tickets: Mutex<HashMap<String, QueueTicket>>,
    }

    impl MockQueueRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_ticket(self, ticket: QueueTicket) -> Self {
            self.tickets
                .lock()
                .unwrap()
                .insert(ticket.agent_id.clone(), ticket);
            self
        }
    }

    #[async_trait]
    impl QueueRepository for MockQueueRepository {
        async fn put_ticket(&self, ticket: &QueueTicket) -> Result<(), QueueRepositoryError> {
            self.tickets
                .lock()
                .unwrap()
                .insert(ticket.agent_id.clone(), ticket.clone());
            Ok(())
        }

        async fn get_ticket(
            &self,
            agent_id: &str,
        ) -> Result<Option<QueueTicket>, QueueRepositoryError> {
            Ok(self.tickets.lock().unwrap().get(agent_id).cloned())
        }

        async fn list_tickets(&self) -> Result<Vec<QueueTicket>, QueueRepositoryError> {
            Ok(self.tickets.lock().unwrap().values().cloned().collect())
        }

        async fn consume_ticket(&self, agent_id: &str) -> Result<bool, QueueRepositoryError> {
            Ok(self.tickets.lock().unwrap().remove(agent_id).is_some())
        }
    }
}
