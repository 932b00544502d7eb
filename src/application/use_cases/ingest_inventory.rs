use crate::application::dto::{IngestReport, IngestRequest, SkippedEntry};
use crate::patching::domain::{
    Agent, AppStatus, ApplicationBinding, ArtifactFile, InventoryEntry, ReportedApp,
    VulnerabilityInfo,
};
use crate::patching::policies::VulnerabilityRouting;
use crate::ports::outbound::{
    AgentDirectory, ApplicationRepository, ArtifactRepository, BindingRepository, Job,
    UpsertOutcome, VulnerabilityRepository, WorkQueue,
};
use crate::shared::error::PatchError;
use crate::shared::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// View used for agents that belong to no view
pub const DEFAULT_VIEW: &str = "default";

/// What reconciling one inventory entry changed
struct EntryOutcome {
    application: UpsertOutcome,
    binding: UpsertOutcome,
    download_enqueued: bool,
}

/// IngestInventoryUseCase - reconciles an agent's inventory snapshot
///
/// Each reported entry upserts the shared catalog row and the agent's
/// binding, both stamped with the request's cutoff. Once every entry has been
/// processed, bindings older than the cutoff are swept, so the stored set
/// matches the snapshot. One bad entry is recorded in the report and never
/// aborts the batch.
///
/// # Type Parameters
/// * `AR` - ApplicationRepository implementation
/// * `BR` - BindingRepository implementation
/// * `FR` - ArtifactRepository implementation
/// * `AD` - AgentDirectory implementation
/// * `VR` - VulnerabilityRepository implementation
/// * `WQ` - WorkQueue implementation
pub struct IngestInventoryUseCase<AR, BR, FR, AD, VR, WQ> {
    applications: Arc<AR>,
    bindings: Arc<BR>,
    artifacts: Arc<FR>,
    agents: Arc<AD>,
    vulnerabilities: Arc<VR>,
    work_queue: Arc<WQ>,
    default_throttle_kbs: u64,
}

impl<AR, BR, FR, AD, VR, WQ> IngestInventoryUseCase<AR, BR, FR, AD, VR, WQ>
where
    AR: ApplicationRepository,
    BR: BindingRepository,
    FR: ArtifactRepository,
    AD: AgentDirectory,
    VR: VulnerabilityRepository,
    WQ: WorkQueue,
{
    pub fn new(
        applications: Arc<AR>,
        bindings: Arc<BR>,
        artifacts: Arc<FR>,
        agents: Arc<AD>,
        vulnerabilities: Arc<VR>,
        work_queue: Arc<WQ>,
    ) -> Self {
        Self {
            applications,
            bindings,
            artifacts,
            agents,
            vulnerabilities,
            work_queue,
            default_throttle_kbs: 0,
        }
    }

    /// Throttle applied to download jobs this reconciler enqueues
    pub fn with_default_throttle(mut self, throttle_kbs: u64) -> Self {
        self.default_throttle_kbs = throttle_kbs;
        self
    }

    pub async fn execute(&self, request: IngestRequest) -> Result<IngestReport> {
        // Step 1: Resolve the reporting agent and the view it belongs to
        let agent = self
            .agents
            .get_agent(&request.agent_id)
            .await?
            .ok_or_else(|| PatchError::Validation {
                message: format!("unknown agent '{}'", request.agent_id),
            })?;
        let view = agent.primary_view().unwrap_or(DEFAULT_VIEW).to_string();

        info!(
            agent_id = %agent.agent_id,
            catalog = ?request.catalog,
            apps = request.apps.len(),
            cutoff = %request.cutoff,
            "ingesting inventory"
        );

        // Step 2: Reconcile every entry, absorbing failures per entry
        let mut report = IngestReport::default();
        for app in request.apps.iter().cloned() {
            let name = app.name.clone();
            match self.reconcile_entry(&agent, &view, &request, app).await {
                Ok(Some(outcome)) => Self::tally(&mut report, outcome),
                Ok(None) => debug!(agent_id = %agent.agent_id, "ignoring entry without a name"),
                Err(e) => {
                    let reason = skip_reason(&e);
                    warn!(agent_id = %agent.agent_id, app = %name, reason = %reason, "skipping inventory entry");
                    report.skipped.push(SkippedEntry { name, reason });
                }
            }
        }

        // Step 3: Sweep bindings this snapshot did not refresh
        if request.delete_afterwards {
            report.bindings_deleted = self
                .bindings
                .delete_older_than(request.catalog, &agent.agent_id, request.cutoff)
                .await?;
        }

        info!(
            agent_id = %agent.agent_id,
            inserted = report.bindings_inserted,
            updated = report.bindings_updated,
            deleted = report.bindings_deleted,
            skipped = report.skipped.len(),
            downloads = report.downloads_enqueued,
            "inventory reconciled"
        );
        Ok(report)
    }

    async fn reconcile_entry(
        &self,
        agent: &Agent,
        view: &str,
        request: &IngestRequest,
        app: ReportedApp,
    ) -> Result<Option<EntryOutcome>> {
        let Some(entry) = app.validate()? else {
            return Ok(None);
        };

        let vulnerability = self.lookup_vulnerability(agent, &entry).await;
        let row =
            entry.to_application(request.catalog, agent.os_code.clone(), view, vulnerability);
        let application = self
            .applications
            .merge_or_insert(request.catalog, row, view)
            .await?;

        if entry.has_files() {
            let artifacts = entry
                .files
                .iter()
                .map(|file| {
                    ArtifactFile::from_descriptor(
                        file,
                        [entry.app_id.clone()].into_iter().collect(),
                        [agent.agent_id.clone()].into_iter().collect(),
                    )
                })
                .collect();
            self.artifacts.put(artifacts).await?;
        }

        let binding = ApplicationBinding::new(
            agent.agent_id.clone(),
            entry.app_id.clone(),
            request.catalog,
            view,
            entry.status,
            request.cutoff,
        )
        .with_install_date(entry.install_date)
        .with_dependencies(entry.dependencies.clone());
        let binding = self.bindings.upsert(binding).await?;

        let download_enqueued = if entry.status == AppStatus::Available {
            self.work_queue
                .enqueue(Job::DownloadFiles {
                    app_id: entry.app_id.clone(),
                    catalog: request.catalog,
                    os_code: agent.os_code.clone(),
                    os_string: agent.os_string.clone(),
                    files: entry.files,
                    throttle_kbs: self.default_throttle_kbs,
                })
                .await?;
            true
        } else {
            false
        };

        Ok(Some(EntryOutcome {
            application,
            binding,
            download_enqueued,
        }))
    }

    /// Looks up bulletins for an entry; failures degrade to no data
    async fn lookup_vulnerability(&self, agent: &Agent, entry: &InventoryEntry) -> VulnerabilityInfo {
        let Some(query) = VulnerabilityRouting::route(
            &agent.os_code,
            &agent.os_string,
            entry.name.as_str(),
            entry.version.as_str(),
            &entry.kb,
        ) else {
            return VulnerabilityInfo::default();
        };

        match self.vulnerabilities.lookup(&agent.os_string, &query).await {
            Ok(info) => info,
            Err(e) => {
                warn!(
                    app = %entry.name.as_str(),
                    error = %e,
                    "vulnerability lookup failed, continuing without bulletin data"
                );
                VulnerabilityInfo::default()
            }
        }
    }

    fn tally(report: &mut IngestReport, outcome: EntryOutcome) {
        match outcome.application {
            UpsertOutcome::Inserted => report.applications_inserted += 1,
            UpsertOutcome::Updated => report.applications_updated += 1,
            UpsertOutcome::Stale => {}
        }
        match outcome.binding {
            UpsertOutcome::Inserted => report.bindings_inserted += 1,
            UpsertOutcome::Updated => report.bindings_updated += 1,
            UpsertOutcome::Stale => report.bindings_stale += 1,
        }
        if outcome.download_enqueued {
            report.downloads_enqueued += 1;
        }
    }
}

fn skip_reason(error: &anyhow::Error) -> String {
    match error.downcast_ref::<PatchError>() {
        Some(PatchError::ReconciliationSkip { reason, .. }) => reason.clone(),
        _ => error.to_string(),
    }
}
