use super::mocks::MockFileFetcher;
use fleet_patch::adapters::outbound::filesystem::LocalPackageFiles;
use fleet_patch::adapters::outbound::memory::{
    InMemoryAgentDirectory, InMemoryAgentWorkQueue, InMemoryApplicationRepository,
    InMemoryArtifactRepository, InMemoryBindingRepository, InMemoryOperationRepository,
    StaticViewRegistry, StaticVulnerabilityRepository, ViewLocations,
};
use fleet_patch::adapters::outbound::queue::RecordingWorkQueue;
use fleet_patch::patching::policies::VendorManagedOs;
use fleet_patch::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub const PACKAGE_BASE_URL: &str = "https://packages.example.com/packages";
pub const MIRROR: &str = "mirror1.example.com";

/// In-memory stores, a recording queue and a mock fetcher over a temp package tree
pub struct TestInfrastructure;

impl PatchingInfrastructure for TestInfrastructure {
    type Applications = InMemoryApplicationRepository;
    type Bindings = InMemoryBindingRepository;
    type Artifacts = InMemoryArtifactRepository;
    type Operations = InMemoryOperationRepository;
    type Agents = InMemoryAgentDirectory;
    type Vulnerabilities = StaticVulnerabilityRepository;
    type Views = StaticViewRegistry;
    type Queue = RecordingWorkQueue;
    type AgentQueue = InMemoryAgentWorkQueue;
    type Fetcher = MockFileFetcher;
    type Files = LocalPackageFiles;
}

/// A wired [`PatchingService`] plus handles on every store it writes to
pub struct TestFleet {
    pub service: PatchingService<TestInfrastructure>,
    pub runner: JobRunner<TestInfrastructure>,
    pub applications: Arc<InMemoryApplicationRepository>,
    pub bindings: Arc<InMemoryBindingRepository>,
    pub artifacts: Arc<InMemoryArtifactRepository>,
    pub operations: Arc<InMemoryOperationRepository>,
    pub agents: Arc<InMemoryAgentDirectory>,
    pub queue: Arc<RecordingWorkQueue>,
    pub fetcher: Arc<MockFileFetcher>,
    pub layout: PackageLayout,
    _packages: TempDir,
}

impl TestFleet {
    pub fn new(fetcher: MockFileFetcher) -> Self {
        Self::with_ttls(fetcher, 10, 10)
    }

    /// Same as [`Self::new`] with explicit mailbox TTLs in minutes
    pub fn with_ttls(fetcher: MockFileFetcher, server_ttl: u32, agent_ttl: u32) -> Self {
        let packages = TempDir::new().unwrap();
        let layout = PackageLayout::new(packages.path().join("packages"), None);

        let applications = Arc::new(InMemoryApplicationRepository::new());
        let bindings = Arc::new(InMemoryBindingRepository::new());
        let artifacts = Arc::new(InMemoryArtifactRepository::new());
        let operations = Arc::new(InMemoryOperationRepository::new());
        let agents = Arc::new(InMemoryAgentDirectory::new());
        let queue = Arc::new(RecordingWorkQueue::new());
        let fetcher = Arc::new(fetcher);

        let mut views = HashMap::new();
        views.insert(
            "default".to_string(),
            ViewLocations {
                package_base_url: PACKAGE_BASE_URL.to_string(),
                file_servers: vec![MIRROR.to_string()],
            },
        );

        let adapters = PatchingAdapters::<TestInfrastructure> {
            applications: applications.clone(),
            bindings: bindings.clone(),
            artifacts: artifacts.clone(),
            operations: operations.clone(),
            agents: agents.clone(),
            vulnerabilities: Arc::new(StaticVulnerabilityRepository::new(vec![])),
            views: Arc::new(StaticViewRegistry::new(views)),
            work_queue: queue.clone(),
            agent_queue: Arc::new(InMemoryAgentWorkQueue::new(server_ttl, agent_ttl)),
            fetcher: fetcher.clone(),
            package_files: Arc::new(LocalPackageFiles::new()),
        };
        let service = PatchingService::new(
            adapters,
            ServiceSettings {
                layout: layout.clone(),
                vendor_managed: VendorManagedOs::default(),
                default_throttle_kbs: 0,
            },
        );
        let runner = service.job_runner();

        Self {
            service,
            runner,
            applications,
            bindings,
            artifacts,
            operations,
            agents,
            queue,
            fetcher,
            layout,
            _packages: packages,
        }
    }

    pub fn with_agent(self, agent: Agent) -> Self {
        self.agents.register(agent);
        self
    }

    pub fn with_linux_agent(self, agent_id: &str) -> Self {
        self.with_agent(Agent::new(
            AgentId::new(agent_id),
            OsCode::Linux,
            "Ubuntu 22.04",
        ))
    }

    /// Runs every queued job, including jobs those jobs enqueue
    pub async fn drain(&self) -> usize {
        self.queue.drain_into(&self.runner).await
    }
}
