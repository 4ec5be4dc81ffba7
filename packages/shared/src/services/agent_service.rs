use std::sync::Arc;

use tracing::info;

use crate::models::agent::{Agent, ClaimStatus};
use crate::repositories::agent_repository::AgentRepository;
use crate::services::errors::agent_service_errors::AgentServiceError;

#[derive(Clone)]
pub struct AgentService {
    repository: Arc<dyn AgentRepository + Send + Sync>,
}

impl AgentService {
    pub fn new(repository: Arc<dyn AgentRepository + Send + Sync>) -> Self {
        AgentService { repository }
    }

    pub async fn register(
        &self,
        name: &str,
        description: Option<String>,
        callback_url: Option<String>,
    ) -> Result<Agent, AgentServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AgentServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }
        if name.len() > 64 {
            return Err(AgentServiceError::ValidationError(
                "Name must be at most 64 characters".to_string(),
            ));
        }

        let agent = Agent::new(name, description, callback_url);
        self.repository.create_agent(&agent).await?;
        info!("Registered agent {}", agent.name);
        Ok(agent)
    }

    pub async fn get_agent(&self, name: &str) -> Result<Agent, AgentServiceError> {
        self.repository
            .get_agent(name)
            .await?
            .ok_or(AgentServiceError::AgentNotFound)
    }

    pub async fn get_agent_by_api_key(&self, api_key: &str) -> Result<Agent, AgentServiceError> {
        if api_key.is_empty() {
            return Err(AgentServiceError::AgentNotFound);
        }
        self.repository
            .get_agent_by_api_key(api_key)
            .await?
            .ok_or(AgentServiceError::AgentNotFound)
    }

    pub async fn get_agent_by_claim_token(
        &self,
        claim_token: &str,
    ) -> Result<Agent, AgentServiceError> {
        self.repository
            .get_agent_by_claim_token(claim_token)
            .await?
            .ok_or(AgentServiceError::AgentNotFound)
    }

    /// The claim boundary: flips the agent to claimed and records the
    /// owner's handle. Verification of the social proof happens outside
    /// this service.
    pub async fn verify_claim(
        &self,
        claim_token: &str,
        owner_handle: &str,
    ) -> Result<Agent, AgentServiceError> {
        let mut agent = self.get_agent_by_claim_token(claim_token).await?;
        if agent.is_claimed() {
            return Err(AgentServiceError::AlreadyClaimed);
        }

        let handle = owner_handle.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Err(AgentServiceError::ValidationError(
                "Owner handle cannot be empty".to_string(),
            ));
        }

        agent.claim_status = ClaimStatus::Claimed;
        agent.owner_handle = Some(handle.to_string());
        self.repository.update_agent(&agent).await?;
        info!("Agent {} claimed by @{}", agent.name, handle);
        Ok(agent)
    }

    /// Agents ranked by rating, best first.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<Agent>, AgentServiceError> {
        let mut agents = self.repository.list_agents().await?;
        agents.sort_by(|a, b| b.elo.cmp(&a.elo).then_with(|| a.name.cmp(&b.name)));
        agents.truncate(limit);
        Ok(agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::agent_repository::tests::MockAgentRepository;

    fn service() -> AgentService {
        AgentService::new(Arc::new(MockAgentRepository::new()))
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let service = service();
        let agent = service
            .register("DeepBlue", Some("pure calculation".to_string()), None)
            .await
            .unwrap();

        let by_name = service.get_agent("DeepBlue").await.unwrap();
        assert_eq!(by_name.name, agent.name);

        let by_key = service.get_agent_by_api_key(&agent.api_key).await.unwrap();
        assert_eq!(by_key.name, agent.name);
    }

    #[tokio::test]
    async fn test_register_duplicate_name_is_rejected() {
        let service = service();
        service.register("DeepBlue", None, None).await.unwrap();

        let err = service.register("DeepBlue", None, None).await.unwrap_err();
        assert!(matches!(err, AgentServiceError::NameTaken));
    }

    #[tokio::test]
    async fn test_register_empty_name_is_rejected() {
        let service = service();
        let err = service.register("   ", None, None).await.unwrap_err();
        assert!(matches!(err, AgentServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_unknown_api_key_is_not_found() {
        let service = service();
        let err = service.get_agent_by_api_key("bogus").await.unwrap_err();
        assert!(matches!(err, AgentServiceError::AgentNotFound));
    }

    #[tokio::test]
    async fn test_verify_claim_flips_status_once() {
        let service = service();
        let agent = service.register("DeepBlue", None, None).await.unwrap();

        let claimed = service
            .verify_claim(&agent.claim_token, "@owner")
            .await
            .unwrap();
        assert!(claimed.is_claimed());
        assert_eq!(claimed.owner_handle.as_deref(), Some("owner"));

        let err = service
            .verify_claim(&agent.claim_token, "@owner")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentServiceError::AlreadyClaimed));
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_rating() {
        let service = service();
        for name in ["One", "Two", "Three"] {
            service.register(name, None, None).await.unwrap();
        }
        // Bump one agent above the default rating through the repository.
        let mut two = service.get_agent("Two").await.unwrap();
        two.elo = 1500;
        service.repository.update_agent(&two).await.unwrap();

        let board = service.leaderboard(10).await.unwrap();
        assert_eq!(board[0].name, "Two");
        assert_eq!(board.len(), 3);

        let top_one = service.leaderboard(1).await.unwrap();
        assert_eq!(top_one.len(), 1);
    }
}
