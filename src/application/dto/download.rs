use crate::patching::domain::{AppId, CatalogKind, FileDescriptor, FilesDownloadStatus, OsCode};
use crate::patching::services::FileOutcome;
use serde::Serialize;

/// DownloadRequest - acquire every file one application needs
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub app_id: AppId,
    pub catalog: CatalogKind,
    pub os_code: OsCode,
    pub os_string: String,
    pub files: Vec<FileDescriptor>,
    /// KB/s, 0 means unlimited
    pub throttle_kbs: u64,
}

/// Per-file outcome inside a [`DownloadReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub outcome: FileOutcome,
}

/// DownloadReport - final status of one download pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub app_id: AppId,
    pub status: FilesDownloadStatus,
    pub files: Vec<FileReport>,
}

impl DownloadReport {
    pub fn downloaded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.outcome == FileOutcome::Downloaded)
            .count()
    }
}
