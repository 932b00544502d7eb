use crate::application::dto::CheckInResponse;
use crate::patching::domain::{AgentId, AgentOperationStatus};
use crate::ports::outbound::{AgentWorkQueue, OperationRepository};
use crate::shared::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// CheckInUseCase - delivers an agent's pending work items
///
/// The mailbox is drained in order. Items whose server-side TTL lapsed are
/// not delivered; their per-agent record moves to `Expired`. Everything else
/// is handed over and its record moves to `PickedUp`. The mailbox is already
/// empty once bookkeeping starts, so a bookkeeping failure is logged and the
/// item is still delivered or reported as expired.
pub struct CheckInUseCase<OR, AQ> {
    operations: Arc<OR>,
    agent_queue: Arc<AQ>,
}

impl<OR, AQ> CheckInUseCase<OR, AQ>
where
    OR: OperationRepository,
    AQ: AgentWorkQueue,
{
    pub fn new(operations: Arc<OR>, agent_queue: Arc<AQ>) -> Self {
        Self {
            operations,
            agent_queue,
        }
    }

    pub async fn execute(&self, agent_id: &AgentId) -> Result<CheckInResponse> {
        self.execute_at(agent_id, Utc::now()).await
    }

    /// Same as [`Self::execute`] with an explicit clock reading
    pub async fn execute_at(
        &self,
        agent_id: &AgentId,
        now: DateTime<Utc>,
    ) -> Result<CheckInResponse> {
        let items = self.agent_queue.pop_all(agent_id).await?;

        let mut delivered = Vec::with_capacity(items.len());
        let mut expired = Vec::new();
        for item in items {
            if item.is_expired_at(now) {
                self.advance(item.operation_id, agent_id, AgentOperationStatus::Expired, now)
                    .await;
                expired.push(item.operation_id);
            } else {
                self.advance(item.operation_id, agent_id, AgentOperationStatus::PickedUp, now)
                    .await;
                delivered.push(item);
            }
        }

        info!(
            agent_id = %agent_id,
            delivered = delivered.len(),
            expired = expired.len(),
            "agent checked in"
        );
        Ok(CheckInResponse {
            agent_id: agent_id.clone(),
            delivered,
            expired,
        })
    }

    async fn advance(
        &self,
        operation_id: Uuid,
        agent_id: &AgentId,
        to: AgentOperationStatus,
        now: DateTime<Utc>,
    ) {
        if let Err(e) = self.try_advance(operation_id, agent_id, to, now).await {
            warn!(
                operation_id = %operation_id,
                agent_id = %agent_id,
                status = ?to,
                error = %e,
                "check-in bookkeeping failed"
            );
        }
    }

    async fn try_advance(
        &self,
        operation_id: Uuid,
        agent_id: &AgentId,
        to: AgentOperationStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        match self
            .operations
            .transition_agent(operation_id, agent_id, to, now)
            .await?
        {
            Some(previous) => {
                self.operations
                    .shift_counters(operation_id, Some(previous), to)
                    .await
            }
            None => {
                debug!(operation_id = %operation_id, agent_id = %agent_id, "agent record already settled");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::memory::{InMemoryAgentWorkQueue, InMemoryOperationRepository};
    use crate::patching::domain::{
        AgentOperation, CpuThrottle, OperationKind, RestartPolicy, WorkOrder,
    };

    fn order(agent: &str, operation_id: Uuid) -> WorkOrder {
        WorkOrder {
            operation_id,
            kind: OperationKind::Reboot,
            agent_id: AgentId::new(agent),
            apps: vec![],
            cpu_throttle: CpuThrottle::Normal,
            net_throttle_kbs: 0,
            restart: RestartPolicy::Force,
        }
    }

    #[tokio::test]
    async fn test_items_are_delivered_when_counter_update_fails() {
        let operations = Arc::new(InMemoryOperationRepository::new());
        let queue = Arc::new(InMemoryAgentWorkQueue::new(10, 10));
        let agent = AgentId::new("a1");

        // agent records exist but their operation rows do not, so counters cannot move
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        for operation_id in [first, second] {
            operations
                .insert_agent_operation(AgentOperation::new(operation_id, agent.clone(), vec![]))
                .await
                .unwrap();
            queue.push(order("a1", operation_id)).await.unwrap();
        }

        let use_case = CheckInUseCase::new(operations.clone(), queue.clone());
        let response = use_case.execute(&agent).await.unwrap();

        let delivered: Vec<Uuid> = response.delivered.iter().map(|i| i.operation_id).collect();
        assert_eq!(delivered, vec![first, second]);
        assert!(response.expired.is_empty());
        assert_eq!(queue.pending(&agent), 0);
    }

    #[tokio::test]
    async fn test_unknown_operation_items_are_still_delivered() {
        let operations = Arc::new(InMemoryOperationRepository::new());
        let queue = Arc::new(InMemoryAgentWorkQueue::new(10, 10));
        let agent = AgentId::new("a1");
        queue.push(order("a1", Uuid::new_v4())).await.unwrap();

        let use_case = CheckInUseCase::new(operations, queue);
        let response = use_case.execute(&agent).await.unwrap();
        assert_eq!(response.delivered.len(), 1);
    }
}
