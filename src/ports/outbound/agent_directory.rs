use crate::patching::domain::{Agent, AgentId};
use crate::shared::Result;
use async_trait::async_trait;

/// AgentDirectory port for fleet membership owned by another subsystem
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn get_agent(&self, agent_id: &AgentId) -> Result<Option<Agent>>;

    /// Member agents of a tag; an unknown tag has no members
    async fn agent_ids_for_tag(&self, tag_id: &str) -> Result<Vec<AgentId>>;

    async fn set_needs_reboot(&self, agent_id: &AgentId, needs_reboot: bool) -> Result<()>;
}
