/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with storage, the network, the filesystem, queues and the console.
pub mod agent_directory;
pub mod agent_work_queue;
pub mod application_repository;
pub mod artifact_repository;
pub mod binding_repository;
pub mod file_fetcher;
pub mod operation_repository;
pub mod package_files;
pub mod progress_reporter;
pub mod view_config;
pub mod vulnerability_repository;
pub mod work_queue;

pub use agent_directory::AgentDirectory;
pub use agent_work_queue::AgentWorkQueue;
pub use application_repository::{ApplicationRepository, UpsertOutcome};
pub use artifact_repository::{ArtifactRepository, PutSummary};
pub use binding_repository::BindingRepository;
pub use file_fetcher::FileFetcher;
pub use operation_repository::OperationRepository;
pub use package_files::PackageFiles;
pub use progress_reporter::ProgressReporter;
pub use view_config::ViewConfig;
pub use vulnerability_repository::VulnerabilityRepository;
pub use work_queue::{Job, JobHandler, WorkQueue};
