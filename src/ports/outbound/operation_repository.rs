use crate::patching::domain::{
    AgentId, AgentOperation, AgentOperationStatus, AppId, Operation,
};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// OperationRepository port for operations and their per-agent records
///
/// Operations are immutable once inserted; only their counters move, and
/// only through `shift_counters`.
#[async_trait]
pub trait OperationRepository: Send + Sync {
    async fn insert(&self, operation: Operation) -> Result<()>;

    async fn get(&self, operation_id: Uuid) -> Result<Option<Operation>>;

    /// Atomically moves one agent into `to`, out of `from` when given
    async fn shift_counters(
        &self,
        operation_id: Uuid,
        from: Option<AgentOperationStatus>,
        to: AgentOperationStatus,
    ) -> Result<()>;

    async fn insert_agent_operation(&self, record: AgentOperation) -> Result<()>;

    async fn get_agent_operation(
        &self,
        operation_id: Uuid,
        agent_id: &AgentId,
    ) -> Result<Option<AgentOperation>>;

    /// Moves a non-final record to `to`, returning its previous status
    ///
    /// Returns `None` when the record is missing or already final.
    async fn transition_agent(
        &self,
        operation_id: Uuid,
        agent_id: &AgentId,
        to: AgentOperationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<AgentOperationStatus>>;

    /// Records one application result and returns the updated record
    async fn record_app_result(
        &self,
        operation_id: Uuid,
        agent_id: &AgentId,
        app_id: &AppId,
        success: bool,
        errors: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<AgentOperation>>;
}
