use crate::patching::domain::{AgentId, AppId, OperationKind, RestartPolicy, ThrottleOptions};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// CreateOperationRequest - an operator's install, uninstall or reboot request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateOperationRequest {
    pub kind: OperationKind,
    #[serde(default)]
    pub app_ids: Vec<AppId>,
    #[serde(default)]
    pub agent_ids: Vec<AgentId>,
    #[serde(default)]
    pub tag_id: Option<String>,
    #[serde(default)]
    pub throttle: ThrottleOptions,
    #[serde(default)]
    pub restart: RestartPolicy,
    #[serde(default = "default_view")]
    pub view: String,
    #[serde(default = "default_created_by")]
    pub created_by: String,
}

fn default_view() -> String {
    "default".to_string()
}

fn default_created_by() -> String {
    "admin".to_string()
}

impl CreateOperationRequest {
    pub fn new(kind: OperationKind, app_ids: Vec<AppId>, agent_ids: Vec<AgentId>) -> Self {
        Self {
            kind,
            app_ids,
            agent_ids,
            tag_id: None,
            throttle: ThrottleOptions::default(),
            restart: RestartPolicy::default(),
            view: default_view(),
            created_by: default_created_by(),
        }
    }

    pub fn with_tag(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    pub fn with_throttle(mut self, throttle: ThrottleOptions) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }
}

/// An agent that was targeted but could not be given its work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentFailure {
    pub agent_id: AgentId,
    pub reason: String,
}

/// DispatchReport - outcome of one operation fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub operation_id: Uuid,
    pub work_items_queued: usize,
    /// Agents bound to none of the requested apps
    pub agents_without_apps: Vec<AgentId>,
    pub agents_failed: Vec<AgentFailure>,
}

impl DispatchReport {
    pub fn new(operation_id: Uuid) -> Self {
        Self {
            operation_id,
            work_items_queued: 0,
            agents_without_apps: Vec::new(),
            agents_failed: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = r#"{"kind": "install_os_apps", "agent_ids": ["a1"], "app_ids": ["abc"]}"#;
        let request: CreateOperationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, OperationKind::InstallOsApps);
        assert_eq!(request.view, "default");
        assert_eq!(request.created_by, "admin");
        assert_eq!(request.throttle.net_kbs, 0);
        assert_eq!(request.restart, RestartPolicy::None);
        assert!(request.tag_id.is_none());
    }
}
