use crate::patching::domain::{
    AgentId, AgentOperation, AgentOperationStatus, AppId, Operation,
};
use crate::ports::outbound::OperationRepository;
use crate::shared::error::PatchError;
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

const OPERATIONS: &str = "operations";
const AGENT_OPERATIONS: &str = "agent_operations";

/// In-memory operation store
#[derive(Default)]
pub struct InMemoryOperationRepository {
    operations: DashMap<Uuid, Operation>,
    agent_operations: DashMap<(Uuid, AgentId), AgentOperation>,
}

impl InMemoryOperationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn agent_operations(&self, operation_id: Uuid) -> Vec<AgentOperation> {
        let mut records: Vec<AgentOperation> = self
            .agent_operations
            .iter()
            .filter(|row| row.key().0 == operation_id)
            .map(|row| row.value().clone())
            .collect();
        records.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        records
    }
}

#[async_trait]
impl OperationRepository for InMemoryOperationRepository {
    async fn insert(&self, operation: Operation) -> Result<()> {
        if self.operations.contains_key(&operation.id) {
            return Err(PatchError::Storage {
                collection: OPERATIONS,
                details: format!("operation {} already exists", operation.id),
            }
            .into());
        }
        self.operations.insert(operation.id, operation);
        Ok(())
    }

    async fn get(&self, operation_id: Uuid) -> Result<Option<Operation>> {
        Ok(self
            .operations
            .get(&operation_id)
            .map(|row| row.value().clone()))
    }

    async fn shift_counters(
        &self,
        operation_id: Uuid,
        from: Option<AgentOperationStatus>,
        to: AgentOperationStatus,
    ) -> Result<()> {
        let mut operation =
            self.operations
                .get_mut(&operation_id)
                .ok_or_else(|| PatchError::Storage {
                    collection: OPERATIONS,
                    details: format!("operation {} not found", operation_id),
                })?;
        operation.counters.shift(from, to);
        Ok(())
    }

    async fn insert_agent_operation(&self, record: AgentOperation) -> Result<()> {
        self.agent_operations
            .insert((record.operation_id, record.agent_id.clone()), record);
        Ok(())
    }

    async fn get_agent_operation(
        &self,
        operation_id: Uuid,
        agent_id: &AgentId,
    ) -> Result<Option<AgentOperation>> {
        Ok(self
            .agent_operations
            .get(&(operation_id, agent_id.clone()))
            .map(|row| row.value().clone()))
    }

    async fn transition_agent(
        &self,
        operation_id: Uuid,
        agent_id: &AgentId,
        to: AgentOperationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<AgentOperationStatus>> {
        let Some(mut record) = self
            .agent_operations
            .get_mut(&(operation_id, agent_id.clone()))
        else {
            return Ok(None);
        };
        let previous = record.status;
        if previous.is_final() || previous == to {
            return Ok(None);
        }
        record.status = to;
        if to == AgentOperationStatus::PickedUp {
            record.picked_up_at = Some(at);
        }
        if to.is_final() {
            record.completed_at = Some(at);
        }
        Ok(Some(previous))
    }

    async fn record_app_result(
        &self,
        operation_id: Uuid,
        agent_id: &AgentId,
        app_id: &AppId,
        success: bool,
        errors: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<AgentOperation>> {
        let Some(mut record) = self
            .agent_operations
            .get_mut(&(operation_id, agent_id.clone()))
        else {
            return Ok(None);
        };
        if !record.record_app(app_id, success, errors, at) {
            return Err(PatchError::Storage {
                collection: AGENT_OPERATIONS,
                details: format!(
                    "app {} is not part of operation {} for agent {}",
                    app_id, operation_id, agent_id
                ),
            }
            .into());
        }
        Ok(Some(record.clone()))
    }
}
