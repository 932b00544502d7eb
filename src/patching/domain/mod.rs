pub mod agent;
pub mod application;
pub mod artifact;
pub mod binding;
pub mod catalog;
pub mod ids;
pub mod inventory;
pub mod operation;
pub mod package_layout;
pub mod work_item;

pub use agent::{Agent, OsCode};
pub use application::{
    Application, FilesDownloadStatus, RebootRequired, Severity, VulnerabilityInfo,
};
pub use artifact::{ArtifactFile, FileDescriptor};
pub use binding::{AppStatus, ApplicationBinding};
pub use catalog::{CatalogKind, Collections};
pub use ids::{AgentId, AppId, BindingId, ContentAddresser};
pub use inventory::{AppName, AppVersion, InventoryEntry, ReportedApp};
pub use operation::{
    AgentOperation, AgentOperationStatus, AppOperationRow, AppResultStatus, CpuThrottle,
    Operation, OperationCounters, OperationKind, PerformedOn, RestartPolicy, ThrottleOptions,
    PATCHING_PLUGIN,
};
pub use package_layout::PackageLayout;
pub use work_item::{AgentWorkItem, AppPayload, ResolvedFile, WorkOrder};
