/// In-memory storage adapters backed by `dashmap`
mod agent_directory;
mod agent_mailbox;
mod application_store;
mod artifact_store;
mod binding_store;
mod bulletin_store;
mod operation_store;
mod view_registry;

pub use agent_directory::InMemoryAgentDirectory;
pub use agent_mailbox::InMemoryAgentWorkQueue;
pub use application_store::InMemoryApplicationRepository;
pub use artifact_store::InMemoryArtifactRepository;
pub use binding_store::InMemoryBindingRepository;
pub use bulletin_store::{Bulletin, StaticVulnerabilityRepository};
pub use operation_store::InMemoryOperationRepository;
pub use view_registry::{StaticViewRegistry, ViewLocations};
