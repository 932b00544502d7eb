use crate::patching::domain::{
    AgentId, AppId, CatalogKind, FileDescriptor, OsCode, ReportedApp,
};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Background job handed to the work queue
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    IngestInventory {
        agent_id: AgentId,
        catalog: CatalogKind,
        apps: Vec<ReportedApp>,
        cutoff: DateTime<Utc>,
        delete_afterwards: bool,
    },
    DownloadFiles {
        app_id: AppId,
        catalog: CatalogKind,
        os_code: OsCode,
        os_string: String,
        files: Vec<FileDescriptor>,
        throttle_kbs: u64,
    },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::IngestInventory { .. } => "ingest_inventory",
            Job::DownloadFiles { .. } => "download_files",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::IngestInventory { agent_id, apps, .. } => {
                write!(f, "ingest_inventory(agent={}, apps={})", agent_id, apps.len())
            }
            Job::DownloadFiles { app_id, files, .. } => {
                write!(f, "download_files(app={}, files={})", app_id, files.len())
            }
        }
    }
}

/// WorkQueue port: fire-and-forget background execution
///
/// `enqueue` returns as soon as the job is accepted; failures while running
/// the job surface only through the status fields the job writes.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn enqueue(&self, job: Job) -> Result<()>;
}

/// Executes jobs taken off a work queue
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: Job) -> Result<()>;
}
