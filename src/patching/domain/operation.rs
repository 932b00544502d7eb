use super::catalog::CatalogKind;
use super::ids::{AgentId, AppId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Plugin name stamped on every operation created by this crate
pub const PATCHING_PLUGIN: &str = "patching";

/// What an operation asks agents to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    InstallOsApps,
    InstallCustomApps,
    InstallSupportedApps,
    InstallAgentUpdate,
    Uninstall,
    Reboot,
}

impl OperationKind {
    /// Catalog whose bindings the operation works on
    pub fn catalog(self) -> CatalogKind {
        match self {
            OperationKind::InstallOsApps | OperationKind::Uninstall | OperationKind::Reboot => {
                CatalogKind::Os
            }
            OperationKind::InstallCustomApps => CatalogKind::Custom,
            OperationKind::InstallSupportedApps => CatalogKind::Supported,
            OperationKind::InstallAgentUpdate => CatalogKind::AgentUpdate,
        }
    }

    /// Reboots go to every target agent; everything else needs bound apps
    pub fn requires_apps(self) -> bool {
        !matches!(self, OperationKind::Reboot)
    }

    pub fn is_uninstall(self) -> bool {
        matches!(self, OperationKind::Uninstall)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::InstallOsApps => "install_os_apps",
            OperationKind::InstallCustomApps => "install_custom_apps",
            OperationKind::InstallSupportedApps => "install_supported_apps",
            OperationKind::InstallAgentUpdate => "install_agent_update",
            OperationKind::Uninstall => "uninstall",
            OperationKind::Reboot => "reboot",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "install_os_apps" => Ok(OperationKind::InstallOsApps),
            "install_custom_apps" => Ok(OperationKind::InstallCustomApps),
            "install_supported_apps" => Ok(OperationKind::InstallSupportedApps),
            "install_agent_update" => Ok(OperationKind::InstallAgentUpdate),
            "uninstall" => Ok(OperationKind::Uninstall),
            "reboot" => Ok(OperationKind::Reboot),
            other => Err(format!("Invalid operation kind: {}", other)),
        }
    }
}

/// CPU priority the agent should run the operation at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuThrottle {
    Idle,
    BelowNormal,
    #[default]
    Normal,
    AboveNormal,
    High,
}

/// Restart behaviour after the operation completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    #[default]
    None,
    Needed,
    Force,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThrottleOptions {
    #[serde(default)]
    pub cpu: CpuThrottle,
    /// Download rate limit in KB/s, 0 means unlimited
    #[serde(default)]
    pub net_kbs: u64,
}

/// Whether the operation targeted explicit agents or a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformedOn {
    Agent,
    Tag,
}

/// Aggregate progress across all target agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCounters {
    pub agents_total: u32,
    pub agents_pending_pickup: u32,
    pub agents_pending_results: u32,
    pub agents_completed: u32,
    pub agents_completed_with_errors: u32,
    pub agents_failed: u32,
    pub agents_expired: u32,
}

impl OperationCounters {
    /// Moves one agent into `to`, out of `from` when it was already counted
    ///
    /// Decrements saturate at zero.
    pub fn shift(&mut self, from: Option<AgentOperationStatus>, to: AgentOperationStatus) {
        if let Some(from) = from {
            let slot = self.slot_mut(from);
            *slot = slot.saturating_sub(1);
        }
        *self.slot_mut(to) += 1;
    }

    fn slot_mut(&mut self, status: AgentOperationStatus) -> &mut u32 {
        match status {
            AgentOperationStatus::PendingPickUp => &mut self.agents_pending_pickup,
            AgentOperationStatus::PickedUp => &mut self.agents_pending_results,
            AgentOperationStatus::Completed => &mut self.agents_completed,
            AgentOperationStatus::CompletedWithErrors => &mut self.agents_completed_with_errors,
            AgentOperationStatus::Failed => &mut self.agents_failed,
            AgentOperationStatus::Expired => &mut self.agents_expired,
        }
    }

    /// True once no agent is waiting on pickup or results
    pub fn is_finished(&self) -> bool {
        self.agents_pending_pickup == 0 && self.agents_pending_results == 0
    }
}

/// Operator-issued request, immutable except for its counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub kind: OperationKind,
    pub plugin: String,
    pub view: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub performed_on: PerformedOn,
    pub tag_id: Option<String>,
    pub agent_ids: Vec<AgentId>,
    pub app_ids: Vec<AppId>,
    pub throttle: ThrottleOptions,
    pub restart: RestartPolicy,
    pub counters: OperationCounters,
}

/// Progress of one agent within an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentOperationStatus {
    PendingPickUp,
    PickedUp,
    Completed,
    CompletedWithErrors,
    Failed,
    Expired,
}

impl AgentOperationStatus {
    pub fn is_final(self) -> bool {
        matches!(
            self,
            AgentOperationStatus::Completed
                | AgentOperationStatus::CompletedWithErrors
                | AgentOperationStatus::Failed
                | AgentOperationStatus::Expired
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppResultStatus {
    Pending,
    Completed,
    Failed,
}

/// Result row for one application on one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppOperationRow {
    pub app_id: AppId,
    pub name: String,
    pub version: String,
    pub status: AppResultStatus,
    pub errors: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AppOperationRow {
    pub fn pending(app_id: AppId, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            app_id,
            name: name.into(),
            version: version.into(),
            status: AppResultStatus::Pending,
            errors: None,
            completed_at: None,
        }
    }
}

/// Per-agent record of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOperation {
    pub operation_id: Uuid,
    pub agent_id: AgentId,
    pub status: AgentOperationStatus,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub apps: Vec<AppOperationRow>,
}

impl AgentOperation {
    pub fn new(operation_id: Uuid, agent_id: AgentId, apps: Vec<AppOperationRow>) -> Self {
        Self {
            operation_id,
            agent_id,
            status: AgentOperationStatus::PendingPickUp,
            picked_up_at: None,
            completed_at: None,
            apps,
        }
    }

    pub fn apps_total(&self) -> usize {
        self.apps.len()
    }

    pub fn apps_pending(&self) -> usize {
        self.count(AppResultStatus::Pending)
    }

    pub fn apps_completed(&self) -> usize {
        self.count(AppResultStatus::Completed)
    }

    pub fn apps_failed(&self) -> usize {
        self.count(AppResultStatus::Failed)
    }

    fn count(&self, status: AppResultStatus) -> usize {
        self.apps.iter().filter(|row| row.status == status).count()
    }

    /// Records one application result, returning false when the app was not part of this record
    pub fn record_app(
        &mut self,
        app_id: &AppId,
        success: bool,
        errors: Option<String>,
        at: DateTime<Utc>,
    ) -> bool {
        let Some(row) = self.apps.iter_mut().find(|row| &row.app_id == app_id) else {
            return false;
        };
        row.status = if success {
            AppResultStatus::Completed
        } else {
            AppResultStatus::Failed
        };
        row.errors = errors;
        row.completed_at = Some(at);
        true
    }

    /// Final status once every app has reported, `None` while results are outstanding
    pub fn settled_status(&self) -> Option<AgentOperationStatus> {
        if self.apps_pending() > 0 {
            return None;
        }
        let failed = self.apps_failed();
        Some(if failed == 0 {
            AgentOperationStatus::Completed
        } else if failed == self.apps_total() {
            AgentOperationStatus::Failed
        } else {
            AgentOperationStatus::CompletedWithErrors
        })
    }
}
