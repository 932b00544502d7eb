use super::agent::OsCode;
use super::application::{
    Application, FilesDownloadStatus, RebootRequired, Severity, VulnerabilityInfo,
};
use super::artifact::FileDescriptor;
use super::binding::AppStatus;
use super::catalog::CatalogKind;
use super::ids::AppId;
use crate::patching::policies::SeverityPolicy;
use crate::shared::error::PatchError;
use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length for application names (security limit)
const MAX_APP_NAME_LENGTH: usize = 255;

/// Maximum length for application versions (security limit)
const MAX_APP_VERSION_LENGTH: usize = 100;

/// NewType wrapper for a reported application name with validation
///
/// Vendor names routinely contain spaces and punctuation
/// (`Security Update for Windows (KB5034441)`), so only length and control
/// characters are restricted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

impl AppName {
    /// Surrounding whitespace is dropped before validation
    pub fn new(name: String) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            anyhow::bail!("Application name cannot be empty");
        }

        if name.len() > MAX_APP_NAME_LENGTH {
            anyhow::bail!(
                "Application name is too long ({} bytes). Maximum allowed: {} bytes",
                name.len(),
                MAX_APP_NAME_LENGTH
            );
        }

        if name.chars().any(char::is_control) {
            anyhow::bail!("Application name contains control characters");
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NewType wrapper for a reported application version with validation
///
/// Vendor versions carry spaces too (`14.0.23026 (x64)`, `2.0 beta`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppVersion(String);

impl AppVersion {
    pub fn new(version: String) -> Result<Self> {
        let version = version.trim().to_string();
        if version.is_empty() {
            anyhow::bail!("Application version cannot be empty");
        }

        if version.len() > MAX_APP_VERSION_LENGTH {
            anyhow::bail!(
                "Application version is too long ({} bytes). Maximum allowed: {} bytes",
                version.len(),
                MAX_APP_VERSION_LENGTH
            );
        }

        if version.chars().any(char::is_control) {
            anyhow::bail!("Application version contains control characters");
        }

        Ok(Self(version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One application as an agent reports it, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedApp {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub kb: String,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub support_url: String,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub install_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reboot_required: RebootRequired,
    #[serde(default)]
    pub cli_options: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, alias = "file_data")]
    pub files: Vec<FileDescriptor>,
}

impl ReportedApp {
    pub fn new(name: impl Into<String>, version: impl Into<String>, status: &str) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            status: status.to_string(),
            ..Self::default()
        }
    }

    pub fn with_files(mut self, files: Vec<FileDescriptor>) -> Self {
        self.files = files;
        self
    }

    /// Validates the report into an [`InventoryEntry`]
    ///
    /// Entries with an empty name are not applications at all and yield
    /// `Ok(None)`; anything else that cannot be trusted yields
    /// [`PatchError::ReconciliationSkip`].
    pub fn validate(self) -> std::result::Result<Option<InventoryEntry>, PatchError> {
        if self.name.trim().is_empty() {
            return Ok(None);
        }

        let skip = |reason: String| PatchError::ReconciliationSkip {
            name: self.name.clone(),
            reason,
        };

        let name = AppName::new(self.name.clone()).map_err(|e| skip(e.to_string()))?;
        let version = AppVersion::new(self.version.clone()).map_err(|e| skip(e.to_string()))?;
        let status = self.status.parse::<AppStatus>().map_err(skip)?;

        for file in &self.files {
            file.validate()
                .map_err(|e| skip(format!("file '{}': {}", file.file_name, e)))?;
        }

        let app_id = AppId::derive(name.as_str(), version.as_str());
        let severity = SeverityPolicy::normalize(&self.vendor_severity);

        Ok(Some(InventoryEntry {
            app_id,
            name,
            version,
            status,
            severity,
            kb: self.kb,
            vendor_name: self.vendor_name,
            vendor_severity: self.vendor_severity,
            description: self.description,
            support_url: self.support_url,
            release_date: self.release_date,
            install_date: self.install_date,
            reboot_required: self.reboot_required,
            cli_options: self.cli_options.filter(|o| !o.trim().is_empty()),
            dependencies: self.dependencies,
            files: self.files,
        }))
    }
}

/// A validated inventory entry ready for reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    pub app_id: AppId,
    pub name: AppName,
    pub version: AppVersion,
    pub status: AppStatus,
    pub severity: Severity,
    pub kb: String,
    pub vendor_name: String,
    pub vendor_severity: String,
    pub description: String,
    pub support_url: String,
    pub release_date: Option<DateTime<Utc>>,
    pub install_date: Option<DateTime<Utc>>,
    pub reboot_required: RebootRequired,
    pub cli_options: Option<String>,
    pub dependencies: Vec<String>,
    pub files: Vec<FileDescriptor>,
}

impl InventoryEntry {
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Builds the catalog row a first sighting of this entry inserts
    ///
    /// The row starts visible in `view` only, not hidden, with the initial
    /// download status derived from the files and reported status.
    pub fn to_application(
        &self,
        catalog: CatalogKind,
        os_code: OsCode,
        view: &str,
        vulnerability: VulnerabilityInfo,
    ) -> Application {
        Application {
            app_id: self.app_id.clone(),
            catalog,
            name: self.name.as_str().to_string(),
            version: self.version.as_str().to_string(),
            kb: self.kb.clone(),
            vendor_name: self.vendor_name.clone(),
            vendor_severity: self.vendor_severity.clone(),
            severity: self.severity,
            description: self.description.clone(),
            support_url: self.support_url.clone(),
            release_date: self.release_date,
            reboot_required: self.reboot_required,
            cli_options: self.cli_options.clone(),
            os_code,
            views: [view.to_string()].into_iter().collect(),
            hidden: false,
            vulnerability,
            files_download_status: FilesDownloadStatus::initial(self.has_files(), self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_ignored() {
        let report = ReportedApp::new("   ", "1.0", "available");
        assert!(report.validate().unwrap().is_none());
    }

    #[test]
    fn test_valid_entry_derives_app_id() {
        let report = ReportedApp::new("curl", "7.0", "Available");
        let entry = report.validate().unwrap().unwrap();
        assert_eq!(entry.app_id, AppId::derive("curl", "7.0"));
        assert_eq!(entry.status, AppStatus::Available);
        assert_eq!(entry.severity, Severity::Optional);
    }

    #[test]
    fn test_names_with_spaces_are_accepted() {
        let report = ReportedApp::new(
            "Security Update for Windows (KB5034441)",
            "1",
            "installed",
        );
        assert!(report.validate().unwrap().is_some());
    }

    #[test]
    fn test_versions_with_spaces_are_accepted() {
        let report = ReportedApp::new(
            "Microsoft Visual C++ 2015 Redistributable",
            "14.0.23026 (x64)",
            "installed",
        );
        let entry = report.validate().unwrap().unwrap();
        assert_eq!(entry.version.as_str(), "14.0.23026 (x64)");
    }

    #[test]
    fn test_control_characters_in_version_are_skipped() {
        let report = ReportedApp::new("curl", "7.\u{7}0", "available");
        assert!(matches!(
            report.validate(),
            Err(PatchError::ReconciliationSkip { .. })
        ));
    }

    #[test]
    fn test_padded_name_collapses_onto_trimmed_entry() {
        let padded = ReportedApp::new(" curl ", " 7.0", "installed")
            .validate()
            .unwrap()
            .unwrap();
        assert_eq!(padded.name.as_str(), "curl");
        assert_eq!(padded.version.as_str(), "7.0");
        assert_eq!(padded.app_id, AppId::derive("curl", "7.0"));
    }

    #[test]
    fn test_unknown_status_is_skipped() {
        let report = ReportedApp::new("curl", "7.0", "removed");
        let err = report.validate().unwrap_err();
        assert!(matches!(err, PatchError::ReconciliationSkip { .. }));
        assert!(err.to_string().contains("curl"));
    }

    #[test]
    fn test_empty_version_is_skipped() {
        let report = ReportedApp::new("curl", "", "available");
        assert!(matches!(
            report.validate(),
            Err(PatchError::ReconciliationSkip { .. })
        ));
    }

    #[test]
    fn test_overlong_name_is_skipped() {
        let report = ReportedApp::new("a".repeat(300), "1.0", "available");
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_traversing_file_name_is_skipped() {
        let report = ReportedApp::new("curl", "7.0", "available")
            .with_files(vec![FileDescriptor::new("../etc/passwd")]);
        let err = report.validate().unwrap_err();
        assert!(err.to_string().contains("../etc/passwd"));
    }

    #[test]
    fn test_deserialize_accepts_file_data_alias() {
        let json = r#"{
            "name": "curl",
            "version": "7.0",
            "status": "available",
            "vendor_severity": "Critical",
            "file_data": [{"file_name": "curl.deb", "file_size": 100}]
        }"#;
        let report: ReportedApp = serde_json::from_str(json).unwrap();
        let entry = report.validate().unwrap().unwrap();
        assert_eq!(entry.files.len(), 1);
        assert_eq!(entry.severity, Severity::Critical);
        assert!(entry.has_files());
    }

    #[test]
    fn test_to_application_starts_in_reporting_view() {
        let entry = ReportedApp::new("curl", "7.0", "installed")
            .validate()
            .unwrap()
            .unwrap();
        let app = entry.to_application(
            CatalogKind::Os,
            OsCode::Linux,
            "default",
            VulnerabilityInfo::default(),
        );
        assert_eq!(app.app_id, entry.app_id);
        assert!(app.views.contains("default"));
        assert!(!app.hidden);
        assert_eq!(
            app.files_download_status,
            FilesDownloadStatus::FileNotRequired
        );
    }
}
