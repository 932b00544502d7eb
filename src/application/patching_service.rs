use crate::application::dto::{
    AppResult, CheckInResponse, CreateOperationRequest, DispatchReport, DownloadReport,
    DownloadRequest, IngestReport, IngestRequest, ResultOutcome,
};
use crate::application::use_cases::{
    CheckInUseCase, DispatchOperationUseCase, DownloadFilesUseCase, IngestInventoryUseCase,
    RecordResultUseCase,
};
use crate::patching::domain::{AgentId, PackageLayout};
use crate::patching::policies::VendorManagedOs;
use crate::ports::inbound::PatchingPort;
use crate::ports::outbound::{
    AgentDirectory, AgentWorkQueue, ApplicationRepository, ArtifactRepository, BindingRepository,
    FileFetcher, Job, JobHandler, OperationRepository, PackageFiles, ViewConfig,
    VulnerabilityRepository, WorkQueue,
};
use crate::shared::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// The set of outbound adapters one deployment wires together
///
/// Naming every adapter once here keeps [`PatchingService`] and [`JobRunner`]
/// down to a single type parameter.
pub trait PatchingInfrastructure: Send + Sync + 'static {
    type Applications: ApplicationRepository + 'static;
    type Bindings: BindingRepository + 'static;
    type Artifacts: ArtifactRepository + 'static;
    type Operations: OperationRepository + 'static;
    type Agents: AgentDirectory + 'static;
    type Vulnerabilities: VulnerabilityRepository + 'static;
    type Views: ViewConfig + 'static;
    type Queue: WorkQueue + 'static;
    type AgentQueue: AgentWorkQueue + 'static;
    type Fetcher: FileFetcher + 'static;
    type Files: PackageFiles + 'static;
}

/// Adapter instances for a [`PatchingInfrastructure`]
pub struct PatchingAdapters<I: PatchingInfrastructure> {
    pub applications: Arc<I::Applications>,
    pub bindings: Arc<I::Bindings>,
    pub artifacts: Arc<I::Artifacts>,
    pub operations: Arc<I::Operations>,
    pub agents: Arc<I::Agents>,
    pub vulnerabilities: Arc<I::Vulnerabilities>,
    pub views: Arc<I::Views>,
    pub work_queue: Arc<I::Queue>,
    pub agent_queue: Arc<I::AgentQueue>,
    pub fetcher: Arc<I::Fetcher>,
    pub package_files: Arc<I::Files>,
}

/// Settings that are not adapters
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub layout: PackageLayout,
    pub vendor_managed: VendorManagedOs,
    pub default_throttle_kbs: u64,
}

type Ingest<I> = IngestInventoryUseCase<
    <I as PatchingInfrastructure>::Applications,
    <I as PatchingInfrastructure>::Bindings,
    <I as PatchingInfrastructure>::Artifacts,
    <I as PatchingInfrastructure>::Agents,
    <I as PatchingInfrastructure>::Vulnerabilities,
    <I as PatchingInfrastructure>::Queue,
>;

type Download<I> = DownloadFilesUseCase<
    <I as PatchingInfrastructure>::Applications,
    <I as PatchingInfrastructure>::Fetcher,
    <I as PatchingInfrastructure>::Files,
>;

type Dispatch<I> = DispatchOperationUseCase<
    <I as PatchingInfrastructure>::Applications,
    <I as PatchingInfrastructure>::Bindings,
    <I as PatchingInfrastructure>::Artifacts,
    <I as PatchingInfrastructure>::Operations,
    <I as PatchingInfrastructure>::Agents,
    <I as PatchingInfrastructure>::Views,
    <I as PatchingInfrastructure>::AgentQueue,
>;

type CheckIn<I> = CheckInUseCase<
    <I as PatchingInfrastructure>::Operations,
    <I as PatchingInfrastructure>::AgentQueue,
>;

type Record<I> = RecordResultUseCase<
    <I as PatchingInfrastructure>::Bindings,
    <I as PatchingInfrastructure>::Operations,
    <I as PatchingInfrastructure>::Agents,
    <I as PatchingInfrastructure>::Queue,
>;

/// PatchingService - the application core behind [`PatchingPort`]
///
/// Request paths (`create_operation`, `check_in`, `record_result`) run
/// inline. Ingestion and downloads are normally reached through jobs handed
/// to [`JobRunner`], which shares this service's reconciler and downloader.
pub struct PatchingService<I: PatchingInfrastructure> {
    ingest: Arc<Ingest<I>>,
    download: Arc<Download<I>>,
    dispatch: Dispatch<I>,
    check_in: CheckIn<I>,
    record: Record<I>,
}

impl<I: PatchingInfrastructure> PatchingService<I> {
    pub fn new(adapters: PatchingAdapters<I>, settings: ServiceSettings) -> Self {
        let ingest = IngestInventoryUseCase::new(
            adapters.applications.clone(),
            adapters.bindings.clone(),
            adapters.artifacts.clone(),
            adapters.agents.clone(),
            adapters.vulnerabilities,
            adapters.work_queue.clone(),
        )
        .with_default_throttle(settings.default_throttle_kbs);

        let download = DownloadFilesUseCase::new(
            adapters.applications.clone(),
            adapters.fetcher,
            adapters.package_files,
            settings.layout,
            settings.vendor_managed,
        );

        let dispatch = DispatchOperationUseCase::new(
            adapters.applications,
            adapters.bindings.clone(),
            adapters.artifacts,
            adapters.operations.clone(),
            adapters.agents.clone(),
            adapters.views,
            adapters.agent_queue.clone(),
        );

        let check_in = CheckInUseCase::new(adapters.operations.clone(), adapters.agent_queue);
        let record = RecordResultUseCase::new(
            adapters.bindings,
            adapters.operations,
            adapters.agents,
            adapters.work_queue,
        );

        Self {
            ingest: Arc::new(ingest),
            download: Arc::new(download),
            dispatch,
            check_in,
            record,
        }
    }

    /// Job handler for the background worker pool
    pub fn job_runner(&self) -> JobRunner<I> {
        JobRunner {
            ingest: self.ingest.clone(),
            download: self.download.clone(),
        }
    }
}

#[async_trait]
impl<I: PatchingInfrastructure> PatchingPort for PatchingService<I> {
    async fn ingest(&self, request: IngestRequest) -> Result<IngestReport> {
        self.ingest.execute(request).await
    }

    async fn download(&self, request: DownloadRequest) -> Result<DownloadReport> {
        self.download.execute(request).await
    }

    async fn create_operation(&self, request: CreateOperationRequest) -> Result<DispatchReport> {
        self.dispatch.execute(request).await
    }

    async fn check_in(&self, agent_id: &AgentId) -> Result<CheckInResponse> {
        self.check_in.execute(agent_id).await
    }

    async fn record_result(&self, result: AppResult) -> Result<ResultOutcome> {
        self.record.execute(result).await
    }
}

/// JobRunner - executes background jobs with the reconciler and downloader
pub struct JobRunner<I: PatchingInfrastructure> {
    ingest: Arc<Ingest<I>>,
    download: Arc<Download<I>>,
}

impl<I: PatchingInfrastructure> Clone for JobRunner<I> {
    fn clone(&self) -> Self {
        Self {
            ingest: self.ingest.clone(),
            download: self.download.clone(),
        }
    }
}

#[async_trait]
impl<I: PatchingInfrastructure> JobHandler for JobRunner<I> {
    async fn handle(&self, job: Job) -> Result<()> {
        debug!(job = %job, "running job");
        match job {
            Job::IngestInventory {
                agent_id,
                catalog,
                apps,
                cutoff,
                delete_afterwards,
            } => {
                let request = IngestRequest {
                    agent_id,
                    catalog,
                    apps,
                    cutoff,
                    delete_afterwards,
                };
                self.ingest.execute(request).await.map(|_| ())
            }
            Job::DownloadFiles {
                app_id,
                catalog,
                os_code,
                os_string,
                files,
                throttle_kbs,
            } => {
                let request = DownloadRequest {
                    app_id,
                    catalog,
                    os_code,
                    os_string,
                    files,
                    throttle_kbs,
                };
                self.download.execute(request).await.map(|_| ())
            }
        }
    }
}
