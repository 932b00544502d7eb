use crate::application::dto::{AppResult, ResultOutcome};
use crate::patching::domain::{
    AgentId, AgentOperationStatus, AppId, AppStatus, Operation, OperationKind,
};
use crate::ports::outbound::{
    AgentDirectory, BindingRepository, Job, OperationRepository, WorkQueue,
};
use crate::shared::error::PatchError;
use crate::shared::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// RecordResultUseCase - applies an agent's install/uninstall/reboot result
///
/// # Type Parameters
/// * `BR` - BindingRepository implementation
/// * `OR` - OperationRepository implementation
/// * `AD` - AgentDirectory implementation
/// * `WQ` - WorkQueue implementation
pub struct RecordResultUseCase<BR, OR, AD, WQ> {
    bindings: Arc<BR>,
    operations: Arc<OR>,
    agents: Arc<AD>,
    work_queue: Arc<WQ>,
}

impl<BR, OR, AD, WQ> RecordResultUseCase<BR, OR, AD, WQ>
where
    BR: BindingRepository,
    OR: OperationRepository,
    AD: AgentDirectory,
    WQ: WorkQueue,
{
    pub fn new(
        bindings: Arc<BR>,
        operations: Arc<OR>,
        agents: Arc<AD>,
        work_queue: Arc<WQ>,
    ) -> Self {
        Self {
            bindings,
            operations,
            agents,
            work_queue,
        }
    }

    pub async fn execute(&self, result: AppResult) -> Result<ResultOutcome> {
        let now = Utc::now();

        // Step 1: The result must belong to a known operation
        let operation = self
            .operations
            .get(result.operation_id)
            .await?
            .ok_or_else(|| PatchError::Validation {
                message: format!("unknown operation '{}'", result.operation_id),
            })?;
        let catalog = operation.kind.catalog();

        // Step 2: Move the binding to where the result leaves the app
        let binding_status = match &result.app_id {
            Some(app_id) if operation.kind.requires_apps() => {
                self.update_binding(&operation, &result.agent_id, app_id, result.success, now)
                    .await?
            }
            _ => None,
        };

        // Step 3: Record the per-app row and settle the agent when nothing is pending
        let agent_status = self.settle_agent(&operation, &result, now).await?;

        // Step 4: Reboot bookkeeping
        if result.reboot_required {
            self.agents.set_needs_reboot(&result.agent_id, true).await?;
        } else if operation.kind == OperationKind::Reboot && result.success {
            self.agents.set_needs_reboot(&result.agent_id, false).await?;
        }

        // Step 5: Inventory changes the agent noticed while installing
        let apps_added = result.apps_to_add.len();
        if apps_added > 0 {
            self.work_queue
                .enqueue(Job::IngestInventory {
                    agent_id: result.agent_id.clone(),
                    catalog,
                    apps: result.apps_to_add.clone(),
                    cutoff: now,
                    delete_afterwards: false,
                })
                .await?;
        }

        let mut apps_deleted = 0;
        for removed in &result.apps_to_delete {
            let app_id = AppId::derive(&removed.name, &removed.version);
            if self
                .bindings
                .delete(catalog, &result.agent_id, &app_id)
                .await?
            {
                apps_deleted += 1;
            }
        }

        info!(
            operation_id = %operation.id,
            agent_id = %result.agent_id,
            success = result.success,
            binding_status = ?binding_status,
            agent_status = ?agent_status,
            "result recorded"
        );
        Ok(ResultOutcome {
            binding_status,
            agent_status,
            apps_added,
            apps_deleted,
        })
    }

    async fn update_binding(
        &self,
        operation: &Operation,
        agent_id: &AgentId,
        app_id: &AppId,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<AppStatus>> {
        let status = binding_status_after(operation.kind, success);
        let install_date = (status == AppStatus::Installed && success).then_some(now);

        let updated = self
            .bindings
            .set_status(operation.kind.catalog(), agent_id, app_id, status, install_date)
            .await?;
        if !updated {
            warn!(agent_id = %agent_id, app_id = %app_id, "result for an app the agent is not bound to");
            return Ok(None);
        }
        Ok(Some(status))
    }

    async fn settle_agent(
        &self,
        operation: &Operation,
        result: &AppResult,
        now: DateTime<Utc>,
    ) -> Result<Option<AgentOperationStatus>> {
        let settled = match &result.app_id {
            Some(app_id) => self
                .operations
                .record_app_result(
                    operation.id,
                    &result.agent_id,
                    app_id,
                    result.success,
                    result.error.clone(),
                    now,
                )
                .await?
                .and_then(|record| record.settled_status()),
            // reboots carry no app rows, so the result settles the agent directly
            None if result.success => Some(AgentOperationStatus::Completed),
            None => Some(AgentOperationStatus::Failed),
        };
        let Some(to) = settled else {
            return Ok(None);
        };

        let Some(previous) = self
            .operations
            .transition_agent(operation.id, &result.agent_id, to, now)
            .await?
        else {
            return Ok(None);
        };
        self.operations
            .shift_counters(operation.id, Some(previous), to)
            .await?;
        Ok(Some(to))
    }
}

/// Binding status an install or uninstall result leaves behind
fn binding_status_after(kind: OperationKind, success: bool) -> AppStatus {
    match (kind.is_uninstall(), success) {
        (false, true) | (true, false) => AppStatus::Installed,
        (false, false) | (true, true) => AppStatus::Available,
    }
}
