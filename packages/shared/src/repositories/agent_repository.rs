use crate::models::agent::Agent;
use crate::repositories::errors::agent_repository_errors::AgentRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::warn;

#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn create_agent(&self, agent: &Agent) -> Result<(), AgentRepositoryError>;

    async fn get_agent(&self, name: &str) -> Result<Option<Agent>, AgentRepositoryError>;

    async fn get_agent_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<Agent>, AgentRepositoryError>;

    async fn get_agent_by_claim_token(
        &self,
        claim_token: &str,
    ) -> Result<Option<Agent>, AgentRepositoryError>;

    async fn update_agent(&self, agent: &Agent) -> Result<(), AgentRepositoryError>;

    async fn list_agents(&self) -> Result<Vec<Agent>, AgentRepositoryError>;
}

pub struct DynamoDbAgentRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbAgentRepository {
    pub fn new(client: Client) -> Self {
        let table_name =
            std::env::var("AGENTS_TABLE").expect("AGENTS_TABLE environment variable must be set");
        Self { client, table_name }
    }

    async fn query_index(
        &self,
        index: &str,
        key_attr: &str,
        value: &str,
    ) -> Result<Option<Agent>, AgentRepositoryError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(index)
            .key_condition_expression(format!("{} = :v", key_attr))
            .expression_attribute_values(":v", AttributeValue::S(value.to_string()))
            .send()
            .await
            .map_err(|e| AgentRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.items.and_then(|items| items.into_iter().next()) {
            let agent: Agent = serde_dynamo::from_item(item)
                .map_err(|e| AgentRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(agent))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl AgentRepository for DynamoDbAgentRepository {
    async fn create_agent(&self, agent: &Agent) -> Result<(), AgentRepositoryError> {
        let item = serde_dynamo::to_item(agent)
            .map_err(|e| AgentRepositoryError::Serialization(e.to_string()))?;

        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#name)")
            .expression_attribute_names("#name", "name");

        match request.send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    Err(AgentRepositoryError::AlreadyExists)
                } else {
                    Err(AgentRepositoryError::DynamoDb(service_err.to_string()))
                }
            }
        }
    }

    async fn get_agent(&self, name: &str) -> Result<Option<Agent>, AgentRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("name", AttributeValue::S(name.to_string()))
            .send()
            .await
            .map_err(|e| AgentRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            let agent: Agent = serde_dynamo::from_item(item)
                .map_err(|e| AgentRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(agent))
        } else {
            Ok(None)
        }
    }

    async fn get_agent_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<Agent>, AgentRepositoryError> {
        self.query_index("ApiKeyIndex", "api_key", api_key).await
    }

    async fn get_agent_by_claim_token(
        &self,
        claim_token: &str,
    ) -> Result<Option<Agent>, AgentRepositoryError> {
        self.query_index("ClaimTokenIndex", "claim_token", claim_token)
            .await
    }

    async fn update_agent(&self, agent: &Agent) -> Result<(), AgentRepositoryError> {
        let item = serde_dynamo::to_item(agent)
            .map_err(|e| AgentRepositoryError::Serialization(e.to_string()))?;

        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_exists(#name)")
            .expression_attribute_names("#name", "name");

        match request.send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    Err(AgentRepositoryError::NotFound)
                } else {
                    Err(AgentRepositoryError::DynamoDb(service_err.to_string()))
                }
            }
        }
    }

    async fn list_agents(&self) -> Result<Vec<Agent>, AgentRepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| AgentRepositoryError::DynamoDb(e.to_string()))?;

        let agents = result
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match serde_dynamo::from_item(item) {
                Ok(agent) => Some(agent),
                Err(e) => {
                    warn!("Failed to parse agent item: {:?}", e);
                    None
                }
            })
            .collect();

        Ok(agents)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in keyed by agent name, mirroring the table layout.
    #[derive(Default)]
    pub struct MockAgentRepository {
        agents: Mutex<HashMap<String, Agent>>,
    }

    impl MockAgentRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_agent(self, agent: Agent) -> Self {
            self.agents
                .lock()
                .unwrap()
                .insert(agent.name.clone(), agent);
            self
        }
    }

    #[async_trait]
    impl AgentRepository for MockAgentRepository {
        async fn create_agent(&self, agent: &Agent) -> Result<(), AgentRepositoryError> {
            let mut agents = self.agents.lock().unwrap();
            if agents.contains_key(&agent.name) {
                return Err(AgentRepositoryError::AlreadyExists);
            }
            agents.insert(agent.name.clone(), agent.clone());
            Ok(())
        }

        async fn get_agent(&self, name: &str) -> Result<Option<Agent>, AgentRepositoryError> {
            Ok(self.agents.lock().unwrap().get(name).cloned())
        }

        async fn get_agent_by_api_key(
            &self,
            api_key: &str,
        ) -> Result<Option<Agent>, AgentRepositoryError> {
            Ok(self
                .agents
                .lock()
                .unwrap()
                .values()
                .find(|a| a.api_key == api_key)
                .cloned())
        }

        async fn get_agent_by_claim_token(
            &self,
            claim_token: &str,
        ) -> Result<Option<Agent>, AgentRepositoryError> {
            Ok(self
                .agents
                .lock()
                .unwrap()
                .values()
                .find(|a| a.claim_token == claim_token)
                .cloned())
        }

        async fn update_agent(&self, agent: &Agent) -> Result<(), AgentRepositoryError> {
            let mut agents = self.agents.lock().unwrap();
            if !agents.contains_key(&agent.name) {
                return Err(AgentRepositoryError::NotFound);
            }
            agents.insert(agent.name.clone(), agent.clone());
            Ok(())
        }

        async fn list_agents(&self) -> Result<Vec<Agent>, AgentRepositoryError> {
            Ok(self.agents.lock().unwrap().values().cloned().collect())
        }
    }
}
