use super::agent::OsCode;
use super::binding::AppStatus;
use super::catalog::CatalogKind;
use super::ids::AppId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Download state of the files an application needs
///
/// `MissingUri → FilePendingDownload → FileIsDownloading → terminal`, where the
/// terminal states record why a batch did or did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilesDownloadStatus {
    MissingUri,
    FilePendingDownload,
    FileIsDownloading,
    FileCompletedDownload,
    FileSizeMismatch,
    FileFailedDownload,
    InvalidUri,
    AgentWillDownloadFromVendor,
    FileNotRequired,
}

impl FilesDownloadStatus {
    /// Numeric status code exposed to API consumers
    pub fn code(self) -> u32 {
        match self {
            FilesDownloadStatus::FileCompletedDownload => 5004,
            FilesDownloadStatus::FileIsDownloading => 5005,
            FilesDownloadStatus::FileNotRequired => 5006,
            FilesDownloadStatus::FilePendingDownload => 5007,
            FilesDownloadStatus::FileFailedDownload => 5008,
            FilesDownloadStatus::MissingUri => 5009,
            FilesDownloadStatus::InvalidUri => 5010,
            FilesDownloadStatus::FileSizeMismatch => 5012,
            FilesDownloadStatus::AgentWillDownloadFromVendor => 5016,
        }
    }

    /// Status a freshly inserted catalog row starts from
    pub fn initial(has_files: bool, status: AppStatus) -> Self {
        match (has_files, status) {
            (true, _) => FilesDownloadStatus::FilePendingDownload,
            (false, AppStatus::Installed) => FilesDownloadStatus::FileNotRequired,
            (false, _) => FilesDownloadStatus::MissingUri,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            FilesDownloadStatus::MissingUri
                | FilesDownloadStatus::FilePendingDownload
                | FilesDownloadStatus::FileIsDownloading
        )
    }
}

impl fmt::Display for FilesDownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilesDownloadStatus::MissingUri => "missing_uri",
            FilesDownloadStatus::FilePendingDownload => "file_pending_download",
            FilesDownloadStatus::FileIsDownloading => "file_is_downloading",
            FilesDownloadStatus::FileCompletedDownload => "file_completed_download",
            FilesDownloadStatus::FileSizeMismatch => "file_size_mismatch",
            FilesDownloadStatus::FileFailedDownload => "file_failed_download",
            FilesDownloadStatus::InvalidUri => "invalid_uri",
            FilesDownloadStatus::AgentWillDownloadFromVendor => "agent_will_download_from_vendor",
            FilesDownloadStatus::FileNotRequired => "file_not_required",
        };
        write!(f, "{} ({})", label, self.code())
    }
}

/// Normalized severity shown to operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Optional,
    Recommended,
    Critical,
}

/// Whether installing the application may require a reboot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebootRequired {
    #[default]
    Possible,
    No,
    Required,
}

/// Vulnerability cross-references resolved for an application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityInfo {
    pub cve_ids: Vec<String>,
    pub bulletin_id: String,
    pub categories: Vec<String>,
}

impl VulnerabilityInfo {
    pub fn is_empty(&self) -> bool {
        self.cve_ids.is_empty() && self.bulletin_id.is_empty() && self.categories.is_empty()
    }
}

/// Catalog row shared by every agent that reports the same (name, version)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub app_id: AppId,
    pub catalog: CatalogKind,
    pub name: String,
    pub version: String,
    pub kb: String,
    pub vendor_name: String,
    pub vendor_severity: String,
    pub severity: Severity,
    pub description: String,
    pub support_url: String,
    pub release_date: Option<DateTime<Utc>>,
    pub reboot_required: RebootRequired,
    pub cli_options: Option<String>,
    pub os_code: OsCode,
    pub views: BTreeSet<String>,
    pub hidden: bool,
    pub vulnerability: VulnerabilityInfo,
    pub files_download_status: FilesDownloadStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_with_files() {
        assert_eq!(
            FilesDownloadStatus::initial(true, AppStatus::Available),
            FilesDownloadStatus::FilePendingDownload
        );
        assert_eq!(
            FilesDownloadStatus::initial(true, AppStatus::Installed),
            FilesDownloadStatus::FilePendingDownload
        );
    }

    #[test]
    fn test_initial_status_without_files() {
        assert_eq!(
            FilesDownloadStatus::initial(false, AppStatus::Available),
            FilesDownloadStatus::MissingUri
        );
        assert_eq!(
            FilesDownloadStatus::initial(false, AppStatus::Installed),
            FilesDownloadStatus::FileNotRequired
        );
        assert_eq!(
            FilesDownloadStatus::initial(false, AppStatus::Pending),
            FilesDownloadStatus::MissingUri
        );
    }

    #[test]
    fn test_status_codes_are_stable() {
        assert_eq!(FilesDownloadStatus::FileCompletedDownload.code(), 5004);
        assert_eq!(FilesDownloadStatus::FileSizeMismatch.code(), 5012);
        assert_eq!(FilesDownloadStatus::AgentWillDownloadFromVendor.code(), 5016);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!FilesDownloadStatus::FileIsDownloading.is_terminal());
        assert!(!FilesDownloadStatus::FilePendingDownload.is_terminal());
        assert!(FilesDownloadStatus::FileFailedDownload.is_terminal());
        assert!(FilesDownloadStatus::FileNotRequired.is_terminal());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Recommended);
        assert!(Severity::Recommended > Severity::Optional);
    }
}
