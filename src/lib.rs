//! fleet-patch - patch catalog reconciliation and operation dispatch
//!
//! Agents report the applications they have installed or could install. This
//! library reconciles those reports into per-catalog application rows and
//! per-agent bindings, downloads and verifies package files into a
//! content-addressed tree, and fans install, uninstall and reboot operations
//! out to agent mailboxes, following hexagonal architecture.
//!
//! # Architecture
//!
//! - **Domain Layer** (`patching`): catalog model, download aggregation, URI
//!   resolution and integrity rules
//! - **Application Layer** (`application`): use cases and the [`PatchingService`] facade
//! - **Ports** (`ports`): interfaces for storage, network, queues and console
//! - **Adapters** (`adapters`): in-memory stores, HTTP fetcher, package tree, worker pool
//! - **Shared** (`shared`): error types and filesystem safety checks
//!
//! # Example
//!
//! ```no_run
//! use fleet_patch::prelude::*;
//! use fleet_patch::replay::{load_scenario, run_replay};
//! use std::path::Path;
//!
//! # async fn example() -> Result<()> {
//! let settings = Settings::default();
//! let scenario = load_scenario(Path::new("scenario.json"))?;
//! let reporter = StderrProgressReporter::new();
//!
//! let summary = run_replay(scenario, &settings, &reporter).await?;
//! println!("{}", serde_json::to_string_pretty(&summary)?);
//! # Ok(())
//! # }
//! ```
//!
//! [`PatchingService`]: application::PatchingService

pub mod adapters;
pub mod application;
pub mod config;
pub mod patching;
pub mod ports;
pub mod replay;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::application::dto::{
        AppResult, CheckInResponse, CreateOperationRequest, DispatchReport, DownloadReport,
        DownloadRequest, IngestReport, IngestRequest, ResultOutcome,
    };
    pub use crate::application::{
        JobRunner, PatchingAdapters, PatchingInfrastructure, PatchingService, ServiceSettings,
    };
    pub use crate::config::Settings;
    pub use crate::patching::domain::{
        Agent, AgentId, AppId, AppStatus, Application, CatalogKind, FilesDownloadStatus,
        FileDescriptor, OperationKind, OsCode, PackageLayout, ReportedApp,
    };
    pub use crate::patching::services::FileOutcome;
    pub use crate::ports::inbound::PatchingPort;
    pub use crate::ports::outbound::ProgressReporter;
    pub use crate::shared::error::PatchError;
    pub use crate::shared::Result;
}
