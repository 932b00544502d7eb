//! Scenario replay against in-memory stores.
//!
//! A scenario is a JSON file naming agents, tags, security bulletins and an
//! ordered list of steps (`ingest`, `dispatch`, `check_in`, `result`). Steps
//! run through [`PatchingService`] with the real HTTP fetcher and package
//! tree; background jobs are drained after every step that enqueues them.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::outbound::filesystem::{LocalPackageFiles, SafeFileReader};
use crate::adapters::outbound::memory::{
    Bulletin, InMemoryAgentDirectory, InMemoryAgentWorkQueue, InMemoryApplicationRepository,
    InMemoryArtifactRepository, InMemoryBindingRepository, InMemoryOperationRepository,
    StaticViewRegistry, StaticVulnerabilityRepository, ViewLocations,
};
use crate::adapters::outbound::network::{CachingVulnerabilityRepository, HttpFileFetcher};
use crate::adapters::outbound::queue::TokioWorkQueue;
use crate::application::dto::{
    AppResult, CheckInResponse, CreateOperationRequest, DispatchReport, IngestReport,
    IngestRequest, RemovedApp, ResultOutcome,
};
use crate::application::{PatchingAdapters, PatchingInfrastructure, PatchingService, ServiceSettings};
use crate::config::Settings;
use crate::patching::domain::{
    Agent, AgentId, AppId, CatalogKind, FilesDownloadStatus, OperationCounters, OsCode,
    PackageLayout, ReportedApp,
};
use crate::ports::inbound::PatchingPort;
use crate::ports::outbound::{OperationRepository, ProgressReporter};
use crate::shared::error::PatchError;
use crate::shared::Result;

/// A replayable fleet history.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub agents: Vec<ScenarioAgent>,
    #[serde(default)]
    pub bulletins: Vec<Bulletin>,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioAgent {
    pub agent_id: AgentId,
    pub os_code: String,
    #[serde(default)]
    pub os_string: String,
    #[serde(default)]
    pub views: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Application named by id, or by the (name, version) pair it derives from
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AppRef {
    Id { app_id: AppId },
    NameVersion { name: String, version: String },
}

impl AppRef {
    fn app_id(&self) -> AppId {
        match self {
            AppRef::Id { app_id } => app_id.clone(),
            AppRef::NameVersion { name, version } => AppId::derive(name, version),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    Ingest {
        agent_id: AgentId,
        #[serde(default)]
        apps: Vec<ReportedApp>,
        #[serde(default = "default_catalog")]
        catalog: CatalogKind,
        #[serde(default)]
        partial: bool,
    },
    Dispatch {
        label: String,
        #[serde(flatten)]
        request: CreateOperationRequest,
    },
    CheckIn {
        agent_id: AgentId,
    },
    Result {
        /// Label of an earlier dispatch step
        operation: String,
        agent_id: AgentId,
        #[serde(default)]
        app: Option<AppRef>,
        success: bool,
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        reboot_required: bool,
        #[serde(default)]
        apps_to_add: Vec<ReportedApp>,
        #[serde(default)]
        apps_to_delete: Vec<RemovedApp>,
    },
}

fn default_catalog() -> CatalogKind {
    CatalogKind::Os
}

impl ScenarioStep {
    fn label(&self) -> String {
        match self {
            ScenarioStep::Ingest { agent_id, apps, .. } => {
                format!("ingest {} app(s) from {}", apps.len(), agent_id)
            }
            ScenarioStep::Dispatch { label, request } => {
                format!("dispatch {} ({})", label, request.kind)
            }
            ScenarioStep::CheckIn { agent_id } => format!("check-in {}", agent_id),
            ScenarioStep::Result {
                operation,
                agent_id,
                ..
            } => format!("result {} from {}", operation, agent_id),
        }
    }

    /// Steps whose work continues on the background queue
    fn enqueues_jobs(&self) -> bool {
        matches!(
            self,
            ScenarioStep::Ingest { .. } | ScenarioStep::Result { .. }
        )
    }
}

/// What one step returned.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepOutcome {
    Ingest {
        agent_id: AgentId,
        report: IngestReport,
    },
    Dispatch {
        label: String,
        report: DispatchReport,
    },
    CheckIn {
        response: CheckInResponse,
    },
    Result {
        operation: String,
        agent_id: AgentId,
        outcome: ResultOutcome,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub app_id: AppId,
    pub catalog: CatalogKind,
    pub name: String,
    pub version: String,
    pub files_download_status: FilesDownloadStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationSummary {
    pub label: String,
    pub operation_id: Uuid,
    pub counters: OperationCounters,
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub steps: Vec<StepOutcome>,
    pub applications: Vec<ApplicationSummary>,
    pub bindings: usize,
    pub operations: Vec<OperationSummary>,
}

impl ReplaySummary {
    /// True when any inventory entry was skipped or any agent missed its work item
    pub fn has_skips(&self) -> bool {
        self.steps.iter().any(|step| match step {
            StepOutcome::Ingest { report, .. } => report.has_skips(),
            StepOutcome::Dispatch { report, .. } => !report.agents_failed.is_empty(),
            _ => false,
        })
    }
}

/// In-memory stores with the real fetcher and package tree
pub struct ReplayInfrastructure;

impl PatchingInfrastructure for ReplayInfrastructure {
    type Applications = InMemoryApplicationRepository;
    type Bindings = InMemoryBindingRepository;
    type Artifacts = InMemoryArtifactRepository;
    type Operations = InMemoryOperationRepository;
    type Agents = InMemoryAgentDirectory;
    type Vulnerabilities = CachingVulnerabilityRepository<StaticVulnerabilityRepository>;
    type Views = StaticViewRegistry;
    type Queue = TokioWorkQueue;
    type AgentQueue = InMemoryAgentWorkQueue;
    type Fetcher = HttpFileFetcher;
    type Files = LocalPackageFiles;
}

/// Load and parse a scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = SafeFileReader::new()
        .read_to_string(path, "scenario file")
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

    serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse scenario file: {}\n\n💡 Hint: A scenario is a JSON object with 'agents', 'bulletins' and 'steps'.",
            path.display()
        )
    })
}

/// Replays `scenario` and returns the final state.
pub async fn run_replay<R: ProgressReporter>(
    scenario: Scenario,
    settings: &Settings,
    reporter: &R,
) -> Result<ReplaySummary> {
    // Step 1: Seed the agent directory and bulletin table
    let agents = Arc::new(InMemoryAgentDirectory::new());
    for seeded in &scenario.agents {
        let mut agent = Agent::new(
            seeded.agent_id.clone(),
            OsCode::parse(&seeded.os_code),
            seeded.os_string.clone(),
        );
        for view in &seeded.views {
            agent = agent.with_view(view.clone());
        }
        agents.register(agent);
        for tag in &seeded.tags {
            agents.tag(tag, seeded.agent_id.clone());
        }
    }
    reporter.report(&format!(
        "Seeded {} agent(s) and {} bulletin(s)",
        agents.agent_count(),
        scenario.bulletins.len()
    ));

    // Step 2: Wire adapters into the service and start the worker pool
    let applications = Arc::new(InMemoryApplicationRepository::new());
    let bindings = Arc::new(InMemoryBindingRepository::new());
    let operations = Arc::new(InMemoryOperationRepository::new());
    let (queue, pool) = TokioWorkQueue::new(settings.max_concurrent_jobs, settings.job_timeout);
    let queue = Arc::new(queue);

    let views = settings
        .views
        .iter()
        .map(|(name, view)| {
            (
                name.clone(),
                ViewLocations {
                    package_base_url: view.package_base_url.clone(),
                    file_servers: view.file_servers.clone(),
                },
            )
        })
        .collect();

    let adapters = PatchingAdapters::<ReplayInfrastructure> {
        applications: applications.clone(),
        bindings: bindings.clone(),
        artifacts: Arc::new(InMemoryArtifactRepository::new()),
        operations: operations.clone(),
        agents,
        vulnerabilities: Arc::new(CachingVulnerabilityRepository::new(
            StaticVulnerabilityRepository::new(scenario.bulletins),
        )),
        views: Arc::new(StaticViewRegistry::new(views)),
        work_queue: queue.clone(),
        agent_queue: Arc::new(InMemoryAgentWorkQueue::new(
            settings.server_ttl_minutes,
            settings.agent_ttl_minutes,
        )),
        fetcher: Arc::new(HttpFileFetcher::new(settings.request_timeout)?),
        package_files: Arc::new(LocalPackageFiles::new()),
    };
    let service = PatchingService::new(
        adapters,
        ServiceSettings {
            layout: PackageLayout::new(
                settings.packages_root.clone(),
                settings.dependencies_dir.clone(),
            ),
            vendor_managed: settings.vendor_managed_os.clone(),
            default_throttle_kbs: settings.default_throttle_kbs,
        },
    );
    let worker = pool.start(Arc::new(service.job_runner()));

    // Step 3: Run every step in order
    let total = scenario.steps.len();
    let mut labels: HashMap<String, Uuid> = HashMap::new();
    let mut steps = Vec::with_capacity(total);
    for (i, step) in scenario.steps.into_iter().enumerate() {
        reporter.report_progress(i, total, Some(&step.label()));
        let drain = step.enqueues_jobs();
        steps.push(run_step(&service, step, &mut labels).await?);

        if drain {
            reporter.report_waiting("waiting for background jobs");
            queue.wait_idle().await;
        }
    }
    reporter.report_progress(total, total, Some("done"));
    worker.abort();

    // Step 4: Collect final state
    let mut summary_apps = Vec::new();
    for catalog in CatalogKind::ALL {
        summary_apps.extend(applications.all(catalog).into_iter().map(|app| {
            ApplicationSummary {
                app_id: app.app_id,
                catalog,
                name: app.name,
                version: app.version,
                files_download_status: app.files_download_status,
            }
        }));
    }

    let mut summary_ops = Vec::new();
    for (label, operation_id) in &labels {
        if let Some(operation) = operations.get(*operation_id).await? {
            summary_ops.push(OperationSummary {
                label: label.clone(),
                operation_id: *operation_id,
                counters: operation.counters,
            });
        }
    }
    summary_ops.sort_by(|a, b| a.label.cmp(&b.label));

    Ok(ReplaySummary {
        steps,
        applications: summary_apps,
        bindings: bindings.len(),
        operations: summary_ops,
    })
}

async fn run_step<P: PatchingPort>(
    service: &P,
    step: ScenarioStep,
    labels: &mut HashMap<String, Uuid>,
) -> Result<StepOutcome> {
    match step {
        ScenarioStep::Ingest {
            agent_id,
            apps,
            catalog,
            partial,
        } => {
            let mut request =
                IngestRequest::new(agent_id.clone(), apps, chrono::Utc::now()).with_catalog(catalog);
            if partial {
                request = request.partial();
            }
            let report = service.ingest(request).await?;
            Ok(StepOutcome::Ingest { agent_id, report })
        }
        ScenarioStep::Dispatch { label, request } => {
            let report = service.create_operation(request).await?;
            labels.insert(label.clone(), report.operation_id);
            Ok(StepOutcome::Dispatch { label, report })
        }
        ScenarioStep::CheckIn { agent_id } => {
            let response = service.check_in(&agent_id).await?;
            Ok(StepOutcome::CheckIn { response })
        }
        ScenarioStep::Result {
            operation,
            agent_id,
            app,
            success,
            error,
            reboot_required,
            apps_to_add,
            apps_to_delete,
        } => {
            let operation_id = *labels.get(&operation).ok_or_else(|| PatchError::Validation {
                message: format!("result refers to unknown dispatch label '{}'", operation),
            })?;
            let outcome = service
                .record_result(AppResult {
                    operation_id,
                    agent_id: agent_id.clone(),
                    app_id: app.as_ref().map(AppRef::app_id),
                    success,
                    error,
                    reboot_required,
                    apps_to_add,
                    apps_to_delete,
                })
                .await?;
            Ok(StepOutcome::Result {
                operation,
                agent_id,
                outcome,
            })
        }
    }
}
