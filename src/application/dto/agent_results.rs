use crate::patching::domain::{
    AgentId, AgentOperationStatus, AgentWorkItem, AppId, AppStatus, ReportedApp,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (name, version) pair the agent no longer has
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemovedApp {
    pub name: String,
    pub version: String,
}

/// AppResult - an agent's report for one application of an operation
///
/// Reboot operations carry no application, so `app_id` is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppResult {
    pub operation_id: Uuid,
    pub agent_id: AgentId,
    #[serde(default)]
    pub app_id: Option<AppId>,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reboot_required: bool,
    #[serde(default)]
    pub apps_to_add: Vec<ReportedApp>,
    #[serde(default)]
    pub apps_to_delete: Vec<RemovedApp>,
}

/// ResultOutcome - what recording an [`AppResult`] changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultOutcome {
    pub binding_status: Option<AppStatus>,
    /// Set when this result settled the agent's part of the operation
    pub agent_status: Option<AgentOperationStatus>,
    pub apps_added: usize,
    pub apps_deleted: usize,
}

/// CheckInResponse - the work handed to an agent when it checks in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInResponse {
    pub agent_id: AgentId,
    pub delivered: Vec<AgentWorkItem>,
    /// Operations whose items lapsed before the agent collected them
    pub expired: Vec<Uuid>,
}
