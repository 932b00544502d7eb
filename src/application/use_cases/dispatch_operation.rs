use crate::application::dto::{AgentFailure, CreateOperationRequest, DispatchReport};
use crate::patching::domain::{
    AgentId, AgentOperation, AgentOperationStatus, AppId, AppOperationRow, AppPayload, AppStatus,
    CatalogKind, Operation, OperationCounters, PerformedOn, WorkOrder, PATCHING_PLUGIN,
};
use crate::patching::services::UriResolver;
use crate::ports::outbound::{
    AgentDirectory, AgentWorkQueue, ApplicationRepository, ArtifactRepository, BindingRepository,
    OperationRepository, ViewConfig,
};
use crate::shared::error::PatchError;
use crate::shared::Result;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where agents fetch package files from for one view
struct FileLocations {
    package_base_url: String,
    file_servers: Vec<String>,
}

/// DispatchOperationUseCase - turns an operator request into per-agent work
///
/// The operation is persisted before anything else is written. If that
/// fails the call returns [`PatchError::DispatchFailure`] and no agent sees a
/// work item. After that, agents are handled one at a time and a failure on
/// one agent is recorded against it without stopping the rest.
///
/// # Type Parameters
/// * `AR` - ApplicationRepository implementation
/// * `BR` - BindingRepository implementation
/// * `FR` - ArtifactRepository implementation
/// * `OR` - OperationRepository implementation
/// * `AD` - AgentDirectory implementation
/// * `VC` - ViewConfig implementation
/// * `AQ` - AgentWorkQueue implementation
pub struct DispatchOperationUseCase<AR, BR, FR, OR, AD, VC, AQ> {
    applications: Arc<AR>,
    bindings: Arc<BR>,
    artifacts: Arc<FR>,
    operations: Arc<OR>,
    agents: Arc<AD>,
    views: Arc<VC>,
    agent_queue: Arc<AQ>,
}

impl<AR, BR, FR, OR, AD, VC, AQ> DispatchOperationUseCase<AR, BR, FR, OR, AD, VC, AQ>
where
    AR: ApplicationRepository,
    BR: BindingRepository,
    FR: ArtifactRepository,
    OR: OperationRepository,
    AD: AgentDirectory,
    VC: ViewConfig,
    AQ: AgentWorkQueue,
{
    pub fn new(
        applications: Arc<AR>,
        bindings: Arc<BR>,
        artifacts: Arc<FR>,
        operations: Arc<OR>,
        agents: Arc<AD>,
        views: Arc<VC>,
        agent_queue: Arc<AQ>,
    ) -> Self {
        Self {
            applications,
            bindings,
            artifacts,
            operations,
            agents,
            views,
            agent_queue,
        }
    }

    pub async fn execute(&self, request: CreateOperationRequest) -> Result<DispatchReport> {
        // Step 1: Reject requests that cannot target anything
        Self::validate_request(&request)?;

        // Step 2: Resolve explicit agents plus tag members
        let targets = self.resolve_targets(&request).await?;
        if targets.is_empty() {
            return Err(PatchError::Validation {
                message: "operation resolves to no target agents".to_string(),
            }
            .into());
        }

        // Step 3: Installs need the view's file locations before anything is persisted
        let locations = self.file_locations(&request).await?;

        // Step 4: Persist the operation; failure aborts the whole fan-out
        let operation = Self::build_operation(&request, &targets);
        let operation_id = operation.id;
        self.operations
            .insert(operation)
            .await
            .map_err(|e| PatchError::DispatchFailure {
                details: e.to_string(),
            })?;

        info!(
            operation_id = %operation_id,
            kind = %request.kind,
            agents = targets.len(),
            apps = request.app_ids.len(),
            "operation created"
        );

        // Step 5: Fan out one work item per agent with something to do
        let mut report = DispatchReport::new(operation_id);
        let mut payloads = HashMap::new();
        for agent_id in &targets {
            match self
                .dispatch_agent(operation_id, &request, agent_id, locations.as_ref(), &mut payloads)
                .await
            {
                Ok(true) => report.work_items_queued += 1,
                Ok(false) => {
                    debug!(operation_id = %operation_id, agent_id = %agent_id, "agent has none of the requested apps");
                    report.agents_without_apps.push(agent_id.clone());
                }
                Err(e) => {
                    warn!(operation_id = %operation_id, agent_id = %agent_id, error = %e, "work item not delivered");
                    self.mark_failed(operation_id, agent_id).await;
                    report.agents_failed.push(AgentFailure {
                        agent_id: agent_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            operation_id = %operation_id,
            queued = report.work_items_queued,
            without_apps = report.agents_without_apps.len(),
            failed = report.agents_failed.len(),
            "operation dispatched"
        );
        Ok(report)
    }

    fn validate_request(request: &CreateOperationRequest) -> Result<()> {
        if request.kind.requires_apps() && request.app_ids.is_empty() {
            return Err(PatchError::Validation {
                message: format!("{} requires at least one application", request.kind),
            }
            .into());
        }
        if request.agent_ids.is_empty() && request.tag_id.is_none() {
            return Err(PatchError::Validation {
                message: "either agent ids or a tag id must be supplied".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Explicit agents first, then tag members, without duplicates
    async fn resolve_targets(&self, request: &CreateOperationRequest) -> Result<Vec<AgentId>> {
        let mut targets = request.agent_ids.clone();
        if let Some(tag_id) = &request.tag_id {
            targets.extend(self.agents.agent_ids_for_tag(tag_id).await?);
        }

        let mut seen = HashSet::new();
        targets.retain(|agent_id| seen.insert(agent_id.clone()));
        Ok(targets)
    }

    async fn file_locations(&self, request: &CreateOperationRequest) -> Result<Option<FileLocations>> {
        if !request.kind.requires_apps() || request.kind.is_uninstall() {
            return Ok(None);
        }
        Ok(Some(FileLocations {
            package_base_url: self.views.package_base_url(&request.view).await?,
            file_servers: self.views.file_servers(&request.view).await?,
        }))
    }

    fn build_operation(request: &CreateOperationRequest, targets: &[AgentId]) -> Operation {
        Operation {
            id: Uuid::new_v4(),
            kind: request.kind,
            plugin: PATCHING_PLUGIN.to_string(),
            view: request.view.clone(),
            created_by: request.created_by.clone(),
            created_at: Utc::now(),
            performed_on: if request.tag_id.is_some() {
                PerformedOn::Tag
            } else {
                PerformedOn::Agent
            },
            tag_id: request.tag_id.clone(),
            agent_ids: targets.to_vec(),
            app_ids: request.app_ids.clone(),
            throttle: request.throttle,
            restart: request.restart,
            counters: OperationCounters {
                agents_total: u32::try_from(targets.len()).unwrap_or(u32::MAX),
                ..OperationCounters::default()
            },
        }
    }

    /// Queues the agent's work item; `Ok(false)` when it has nothing to do
    async fn dispatch_agent(
        &self,
        operation_id: Uuid,
        request: &CreateOperationRequest,
        agent_id: &AgentId,
        locations: Option<&FileLocations>,
        payloads: &mut HashMap<AppId, Option<AppPayload>>,
    ) -> Result<bool> {
        let catalog = request.kind.catalog();

        let mut apps = Vec::new();
        if request.kind.requires_apps() {
            let valid = self
                .bindings
                .valid_app_ids(catalog, agent_id, &request.app_ids)
                .await?;
            for app_id in valid {
                if !payloads.contains_key(&app_id) {
                    let payload = self.build_payload(catalog, &app_id, locations).await?;
                    payloads.insert(app_id.clone(), payload);
                }
                if let Some(Some(payload)) = payloads.get(&app_id) {
                    apps.push(payload.clone());
                }
            }
            if apps.is_empty() {
                return Ok(false);
            }
        }

        let rows = apps
            .iter()
            .map(|app| AppOperationRow::pending(app.app_id.clone(), &app.name, &app.version))
            .collect();
        self.operations
            .insert_agent_operation(AgentOperation::new(operation_id, agent_id.clone(), rows))
            .await?;
        self.operations
            .shift_counters(operation_id, None, AgentOperationStatus::PendingPickUp)
            .await?;

        let app_ids: Vec<AppId> = apps.iter().map(|app| app.app_id.clone()).collect();
        let item = self
            .agent_queue
            .push(WorkOrder {
                operation_id,
                kind: request.kind,
                agent_id: agent_id.clone(),
                apps,
                cpu_throttle: request.throttle.cpu,
                net_throttle_kbs: request.throttle.net_kbs,
                restart: request.restart,
            })
            .await?;

        self.mark_pending(catalog, agent_id, &app_ids).await;
        debug!(
            operation_id = %operation_id,
            agent_id = %agent_id,
            order_id = item.order_id,
            apps = app_ids.len(),
            "work item queued"
        );
        Ok(true)
    }

    /// Payload for one app; `None` when the catalog row is gone
    async fn build_payload(
        &self,
        catalog: CatalogKind,
        app_id: &AppId,
        locations: Option<&FileLocations>,
    ) -> Result<Option<AppPayload>> {
        let Some(app) = self.applications.get(catalog, app_id).await? else {
            warn!(app_id = %app_id, "bound application missing from catalog");
            return Ok(None);
        };

        let files = match locations {
            Some(locations) => {
                let resolver =
                    UriResolver::new(&locations.package_base_url, &locations.file_servers);
                self.artifacts
                    .files_for_app(app_id)
                    .await?
                    .iter()
                    .map(|file| resolver.resolve(app_id, &file.descriptor()))
                    .collect()
            }
            None => Vec::new(),
        };

        Ok(Some(AppPayload {
            app_id: app.app_id,
            name: app.name,
            version: app.version,
            cli_options: app.cli_options,
            files,
        }))
    }

    async fn mark_pending(&self, catalog: CatalogKind, agent_id: &AgentId, app_ids: &[AppId]) {
        for app_id in app_ids {
            if let Err(e) = self
                .bindings
                .set_status(catalog, agent_id, app_id, AppStatus::Pending, None)
                .await
            {
                warn!(agent_id = %agent_id, app_id = %app_id, error = %e, "binding not flipped to pending");
            }
        }
    }

    async fn mark_failed(&self, operation_id: Uuid, agent_id: &AgentId) {
        let now = Utc::now();
        let previous = match self
            .operations
            .transition_agent(operation_id, agent_id, AgentOperationStatus::Failed, now)
            .await
        {
            Ok(previous) => previous,
            Err(e) => {
                warn!(operation_id = %operation_id, agent_id = %agent_id, error = %e, "agent record not updated");
                return;
            }
        };

        // a missing record was never counted as pending pickup
        let counted = self
            .operations
            .shift_counters(operation_id, previous, AgentOperationStatus::Failed)
            .await;
        if let Err(e) = counted {
            warn!(operation_id = %operation_id, agent_id = %agent_id, error = %e, "operation counters not updated");
        }
    }
}
