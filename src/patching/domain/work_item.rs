use super::ids::{AgentId, AppId};
use super::operation::{CpuThrottle, OperationKind, RestartPolicy, PATCHING_PLUGIN};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file with every location the agent may fetch it from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFile {
    pub file_name: String,
    /// Origin location on the package server
    pub file_uri: String,
    /// Mirrors first, origin last
    pub file_uris: Vec<String>,
    pub file_size: u64,
    pub file_hash: Option<String>,
}

/// One application inside a work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPayload {
    pub app_id: AppId,
    pub name: String,
    pub version: String,
    pub cli_options: Option<String>,
    pub files: Vec<ResolvedFile>,
}

/// Work assembled by the dispatcher, before the agent queue stamps it
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrder {
    pub operation_id: Uuid,
    pub kind: OperationKind,
    pub agent_id: AgentId,
    pub apps: Vec<AppPayload>,
    pub cpu_throttle: CpuThrottle,
    pub net_throttle_kbs: u64,
    pub restart: RestartPolicy,
}

impl WorkOrder {
    /// Assigns queue position and expiry windows
    pub fn stamp(
        self,
        order_id: u64,
        created_at: DateTime<Utc>,
        server_ttl: Duration,
        agent_ttl: Duration,
    ) -> AgentWorkItem {
        let server_expires_at = created_at + server_ttl;
        AgentWorkItem {
            order_id,
            operation_id: self.operation_id,
            kind: self.kind,
            plugin: PATCHING_PLUGIN.to_string(),
            agent_id: self.agent_id,
            apps: self.apps,
            cpu_throttle: self.cpu_throttle,
            net_throttle_kbs: self.net_throttle_kbs,
            restart: self.restart,
            created_at,
            server_expires_at,
            agent_expires_at: server_expires_at + agent_ttl,
        }
    }
}

/// Order delivered to one agent for one operation
///
/// `order_id` and the expiry stamps are assigned by the agent work queue on push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentWorkItem {
    pub order_id: u64,
    pub operation_id: Uuid,
    pub kind: OperationKind,
    pub plugin: String,
    pub agent_id: AgentId,
    pub apps: Vec<AppPayload>,
    pub cpu_throttle: CpuThrottle,
    pub net_throttle_kbs: u64,
    pub restart: RestartPolicy,
    pub created_at: DateTime<Utc>,
    pub server_expires_at: DateTime<Utc>,
    pub agent_expires_at: DateTime<Utc>,
}

impl AgentWorkItem {
    /// True once the server side TTL has lapsed without pickup
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.server_expires_at
    }
}
