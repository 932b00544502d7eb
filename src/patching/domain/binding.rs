use super::catalog::CatalogKind;
use super::ids::{AgentId, AppId, BindingId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-agent state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Available,
    Pending,
    Installed,
}

impl AppStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppStatus::Available => "available",
            AppStatus::Pending => "pending",
            AppStatus::Installed => "installed",
        }
    }
}

impl FromStr for AppStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(AppStatus::Available),
            "pending" => Ok(AppStatus::Pending),
            "installed" => Ok(AppStatus::Installed),
            other => Err(format!(
                "Invalid status: {}. Expected 'available', 'pending' or 'installed'",
                other
            )),
        }
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One (agent, application) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationBinding {
    pub id: BindingId,
    pub agent_id: AgentId,
    pub app_id: AppId,
    pub catalog: CatalogKind,
    pub view: String,
    pub status: AppStatus,
    pub install_date: Option<DateTime<Utc>>,
    pub dependencies: Vec<String>,
    pub is_update: bool,
    pub last_modified: DateTime<Utc>,
}

impl ApplicationBinding {
    pub fn new(
        agent_id: AgentId,
        app_id: AppId,
        catalog: CatalogKind,
        view: impl Into<String>,
        status: AppStatus,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BindingId::derive(&agent_id, &app_id),
            agent_id,
            app_id,
            catalog,
            view: view.into(),
            status,
            install_date: None,
            dependencies: Vec::new(),
            is_update: true,
            last_modified,
        }
    }

    pub fn with_install_date(mut self, install_date: Option<DateTime<Utc>>) -> Self {
        self.install_date = install_date;
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!("available".parse::<AppStatus>().unwrap(), AppStatus::Available);
        assert_eq!("Installed".parse::<AppStatus>().unwrap(), AppStatus::Installed);
        assert_eq!(" pending ".parse::<AppStatus>().unwrap(), AppStatus::Pending);
        assert!("removed".parse::<AppStatus>().is_err());
    }

    #[test]
    fn test_binding_id_follows_agent_and_app() {
        let agent = AgentId::new("agent-1");
        let app = AppId::derive("curl", "7.0");
        let binding = ApplicationBinding::new(
            agent.clone(),
            app.clone(),
            CatalogKind::Os,
            "default",
            AppStatus::Available,
            Utc::now(),
        );
        assert_eq!(binding.id, BindingId::derive(&agent, &app));
        assert!(binding.install_date.is_none());
    }
}
