/// Data Transfer Objects for application layer
///
/// DTOs carry requests into the use cases and batch reports back out,
/// keeping the domain layer isolated from callers.
mod agent_results;
mod dispatch;
mod download;
mod ingest;

pub use agent_results::{AppResult, CheckInResponse, RemovedApp, ResultOutcome};
pub use dispatch::{AgentFailure, CreateOperationRequest, DispatchReport};
pub use download::{DownloadReport, DownloadRequest, FileReport};
pub use ingest::{IngestReport, IngestRequest, SkippedEntry};
