use crate::patching::domain::{Agent, AgentId};
use crate::ports::outbound::AgentDirectory;
use crate::shared::error::PatchError;
use crate::shared::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// In-memory agent and tag registry
#[derive(Default)]
pub struct InMemoryAgentDirectory {
    agents: DashMap<AgentId, Agent>,
    tags: DashMap<String, Vec<AgentId>>,
}

impl InMemoryAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, agent: Agent) {
        self.agents.insert(agent.agent_id.clone(), agent);
    }

    /// Adds an agent to a tag, keeping membership unique and in insertion order
    pub fn tag(&self, tag_id: &str, agent_id: AgentId) {
        let mut members = self.tags.entry(tag_id.to_string()).or_default();
        if !members.contains(&agent_id) {
            members.push(agent_id);
        }
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}

#[async_trait]
impl AgentDirectory for InMemoryAgentDirectory {
    async fn get_agent(&self, agent_id: &AgentId) -> Result<Option<Agent>> {
        Ok(self.agents.get(agent_id).map(|row| row.value().clone()))
    }

    async fn agent_ids_for_tag(&self, tag_id: &str) -> Result<Vec<AgentId>> {
        Ok(self
            .tags
            .get(tag_id)
            .map(|members| members.value().clone())
            .unwrap_or_default())
    }

    async fn set_needs_reboot(&self, agent_id: &AgentId, needs_reboot: bool) -> Result<()> {
        let mut agent = self
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| PatchError::Storage {
                collection: "agents",
                details: format!("agent {} not found", agent_id),
            })?;
        agent.needs_reboot = needs_reboot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patching::domain::OsCode;

    #[tokio::test]
    async fn test_tag_membership_is_unique_and_ordered() {
        let directory = InMemoryAgentDirectory::new();
        directory.tag("web", AgentId::new("b"));
        directory.tag("web", AgentId::new("a"));
        directory.tag("web", AgentId::new("b"));

        let members = directory.agent_ids_for_tag("web").await.unwrap();
        assert_eq!(members, vec![AgentId::new("b"), AgentId::new("a")]);
        assert!(directory.agent_ids_for_tag("db").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_needs_reboot() {
        let directory = InMemoryAgentDirectory::new();
        directory.register(Agent::new(AgentId::new("a1"), OsCode::Linux, "Ubuntu 22.04"));

        directory
            .set_needs_reboot(&AgentId::new("a1"), true)
            .await
            .unwrap();
        let agent = directory
            .get_agent(&AgentId::new("a1"))
            .await
            .unwrap()
            .unwrap();
        assert!(agent.needs_reboot);

        assert!(directory
            .set_needs_reboot(&AgentId::new("ghost"), true)
            .await
            .is_err());
    }
}
