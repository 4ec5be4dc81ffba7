use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A matchmaking queue entry. At most one per agent; deleted the moment a
/// pairing is made or the agent withdraws.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTicket {
    pub agent_id: String,
    pub joined_at: DateTime<Utc>,
}

impl QueueTicket {
    pub fn new(agent_id: &str) -> Self {
        QueueTicket {
            agent_id: agent_id.to_string(),
            joined_at: Utc::now(),
        }
    }
}
