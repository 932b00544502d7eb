use crate::patching::domain::FilesDownloadStatus;
use serde::Serialize;
use std::fmt;

/// What happened to one file of a download batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// Fetched and verified, or already present
    Downloaded,
    /// Fetched but hash or size did not match
    Mismatch,
    /// Network or filesystem failure
    Failed,
    /// URI present but unusable
    InvalidUri,
    /// No URI and not present locally
    MissingUri,
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileOutcome::Downloaded => "downloaded",
            FileOutcome::Mismatch => "mismatch",
            FileOutcome::Failed => "failed",
            FileOutcome::InvalidUri => "invalid_uri",
            FileOutcome::MissingUri => "missing_uri",
        };
        write!(f, "{}", label)
    }
}

/// Folds per-file outcomes into the application's download status
///
/// Priority: all downloaded, then mismatch, then failure, then invalid URI.
/// A mismatch outranks a failure so tampered content is never reported as
/// a mere network problem.
pub struct DownloadAggregator;

impl DownloadAggregator {
    pub fn aggregate(outcomes: &[FileOutcome]) -> FilesDownloadStatus {
        let has = |wanted: FileOutcome| outcomes.iter().any(|o| *o == wanted);

        if !outcomes.is_empty() && outcomes.iter().all(|o| *o == FileOutcome::Downloaded) {
            FilesDownloadStatus::FileCompletedDownload
        } else if has(FileOutcome::Mismatch) {
            FilesDownloadStatus::FileSizeMismatch
        } else if has(FileOutcome::Failed) {
            FilesDownloadStatus::FileFailedDownload
        } else if has(FileOutcome::InvalidUri) {
            FilesDownloadStatus::InvalidUri
        } else {
            FilesDownloadStatus::MissingUri
        }
    }
}
