use crate::patching::domain::{AgentId, AgentWorkItem, WorkOrder};
use crate::shared::Result;
use async_trait::async_trait;

/// AgentWorkQueue port: per-agent pull mailbox
#[async_trait]
pub trait AgentWorkQueue: Send + Sync {
    /// Stamps the order with its queue position and expiry, then stores it
    async fn push(&self, order: WorkOrder) -> Result<AgentWorkItem>;

    /// Removes and returns every queued item for the agent, oldest first
    async fn pop_all(&self, agent_id: &AgentId) -> Result<Vec<AgentWorkItem>>;
}
