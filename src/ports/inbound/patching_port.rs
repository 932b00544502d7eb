use crate::application::dto::{
    AppResult, CheckInResponse, CreateOperationRequest, DispatchReport, DownloadReport,
    DownloadRequest, IngestReport, IngestRequest, ResultOutcome,
};
use crate::patching::domain::AgentId;
use crate::shared::Result;
use async_trait::async_trait;

/// PatchingPort - Inbound port for the patch-deployment core
///
/// This port defines the interface that external adapters (CLI, API, etc.)
/// use to drive inventory ingestion, package acquisition and operation
/// dispatch. It represents the application's public API.
#[async_trait]
pub trait PatchingPort: Send + Sync {
    /// Reconciles one agent's inventory snapshot
    ///
    /// Malformed entries are skipped and listed in the report; they never
    /// fail the call.
    ///
    /// # Errors
    /// Returns an error if a store rejects a write or the agent is unknown
    async fn ingest(&self, request: IngestRequest) -> Result<IngestReport>;

    /// Acquires and verifies every file of one application
    ///
    /// Per-file failures are folded into the report's status.
    async fn download(&self, request: DownloadRequest) -> Result<DownloadReport>;

    /// Creates an operation and fans out one work item per target agent
    ///
    /// # Errors
    /// Returns [`crate::shared::error::PatchError::DispatchFailure`] if the
    /// operation could not be persisted; no work item exists in that case.
    async fn create_operation(&self, request: CreateOperationRequest) -> Result<DispatchReport>;

    /// Hands an agent every work item waiting in its mailbox
    async fn check_in(&self, agent_id: &AgentId) -> Result<CheckInResponse>;

    /// Records an agent's result for one application of an operation
    async fn record_result(&self, result: AppResult) -> Result<ResultOutcome>;
}
