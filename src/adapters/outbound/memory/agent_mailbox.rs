use crate::patching::domain::{AgentId, AgentWorkItem, WorkOrder};
use crate::ports::outbound::AgentWorkQueue;
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;

/// In-memory per-agent mailbox
///
/// Each agent has its own monotonically increasing `order_id` sequence, so
/// `pop_all` hands items back in push order.
pub struct InMemoryAgentWorkQueue {
    mailboxes: DashMap<AgentId, Vec<AgentWorkItem>>,
    sequences: DashMap<AgentId, u64>,
    server_ttl: Duration,
    agent_ttl: Duration,
}

impl InMemoryAgentWorkQueue {
    pub fn new(server_ttl_minutes: u32, agent_ttl_minutes: u32) -> Self {
        Self {
            mailboxes: DashMap::new(),
            sequences: DashMap::new(),
            server_ttl: Duration::minutes(i64::from(server_ttl_minutes)),
            agent_ttl: Duration::minutes(i64::from(agent_ttl_minutes)),
        }
    }

    pub fn pending(&self, agent_id: &AgentId) -> usize {
        self.mailboxes
            .get(agent_id)
            .map(|items| items.len())
            .unwrap_or(0)
    }

    fn next_order_id(&self, agent_id: &AgentId) -> u64 {
        let mut sequence = self.sequences.entry(agent_id.clone()).or_insert(0);
        *sequence += 1;
        *sequence
    }
}

#[async_trait]
impl AgentWorkQueue for InMemoryAgentWorkQueue {
    async fn push(&self, order: WorkOrder) -> Result<AgentWorkItem> {
        let agent_id = order.agent_id.clone();
        let order_id = self.next_order_id(&agent_id);
        let item = order.stamp(order_id, Utc::now(), self.server_ttl, self.agent_ttl);
        self.mailboxes
            .entry(agent_id)
            .or_default()
            .push(item.clone());
        Ok(item)
    }

    async fn pop_all(&self, agent_id: &AgentId) -> Result<Vec<AgentWorkItem>> {
        let mut items = self
            .mailboxes
            .remove(agent_id)
            .map(|(_, items)| items)
            .unwrap_or_default();
        items.sort_by_key(|item| item.order_id);
        Ok(items)
    }
}
