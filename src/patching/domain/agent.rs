use super::ids::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Operating system family reported by an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsCode {
    Windows,
    Linux,
    Darwin,
    #[default]
    Unknown,
}

impl OsCode {
    pub fn parse(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "windows" => OsCode::Windows,
            "linux" => OsCode::Linux,
            "darwin" | "mac" | "macos" => OsCode::Darwin,
            _ => OsCode::Unknown,
        }
    }

    /// Linux packages share one dependency directory across applications
    pub fn shares_dependencies(&self) -> bool {
        matches!(self, OsCode::Linux)
    }
}

/// Fleet member as seen by the patching core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub os_code: OsCode,
    pub os_string: String,
    pub views: BTreeSet<String>,
    #[serde(default)]
    pub needs_reboot: bool,
}

impl Agent {
    pub fn new(agent_id: AgentId, os_code: OsCode, os_string: impl Into<String>) -> Self {
        Self {
            agent_id,
            os_code,
            os_string: os_string.into(),
            views: BTreeSet::new(),
            needs_reboot: false,
        }
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.views.insert(view.into());
        self
    }

    /// The view an agent reports under when it belongs to several
    pub fn primary_view(&self) -> Option<&str> {
        self.views.iter().next().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_code_parse() {
        assert_eq!(OsCode::parse("Linux"), OsCode::Linux);
        assert_eq!(OsCode::parse("windows"), OsCode::Windows);
        assert_eq!(OsCode::parse("darwin"), OsCode::Darwin);
        assert_eq!(OsCode::parse("plan9"), OsCode::Unknown);
    }

    #[test]
    fn test_only_linux_shares_dependencies() {
        assert!(OsCode::Linux.shares_dependencies());
        assert!(!OsCode::Windows.shares_dependencies());
        assert!(!OsCode::Darwin.shares_dependencies());
    }

    #[test]
    fn test_primary_view() {
        let agent = Agent::new(AgentId::new("a1"), OsCode::Linux, "Ubuntu 22.04")
            .with_view("tenant-b")
            .with_view("tenant-a");
        assert_eq!(agent.primary_view(), Some("tenant-a"));
    }
}
