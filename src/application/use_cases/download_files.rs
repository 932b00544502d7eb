use crate::application::dto::{DownloadReport, DownloadRequest, FileReport};
use crate::patching::domain::{AppId, FileDescriptor, FilesDownloadStatus, OsCode, PackageLayout};
use crate::patching::policies::VendorManagedOs;
use crate::patching::services::{validate_fetch_uri, DownloadAggregator, FileOutcome, IntegrityCheck};
use crate::ports::outbound::{ApplicationRepository, FileFetcher, PackageFiles};
use crate::shared::error::PatchError;
use crate::shared::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// DownloadFilesUseCase - acquires and verifies one application's files
///
/// Every file is attempted even when an earlier one fails; the per-file
/// outcomes are folded into the application's `FilesDownloadStatus`.
/// Re-running after a partial failure only fetches what is still missing,
/// because a file already present at its storage path counts as downloaded.
///
/// # Type Parameters
/// * `AR` - ApplicationRepository implementation
/// * `FF` - FileFetcher implementation
/// * `PF` - PackageFiles implementation
pub struct DownloadFilesUseCase<AR, FF, PF> {
    applications: Arc<AR>,
    fetcher: Arc<FF>,
    package_files: Arc<PF>,
    layout: PackageLayout,
    vendor_managed: VendorManagedOs,
}

impl<AR, FF, PF> DownloadFilesUseCase<AR, FF, PF>
where
    AR: ApplicationRepository,
    FF: FileFetcher,
    PF: PackageFiles,
{
    pub fn new(
        applications: Arc<AR>,
        fetcher: Arc<FF>,
        package_files: Arc<PF>,
        layout: PackageLayout,
        vendor_managed: VendorManagedOs,
    ) -> Self {
        Self {
            applications,
            fetcher,
            package_files,
            layout,
            vendor_managed,
        }
    }

    pub async fn execute(&self, request: DownloadRequest) -> Result<DownloadReport> {
        // Step 1: Nothing to fetch; either the vendor delivers or the status stands
        if request.files.is_empty() {
            return self.without_files(&request).await;
        }

        // Step 2: Mark the application as in flight
        self.applications
            .set_download_status(
                request.catalog,
                &request.app_id,
                FilesDownloadStatus::FileIsDownloading,
            )
            .await?;

        // Step 3: Attempt every file, scoping failures to that file
        let mut files = Vec::with_capacity(request.files.len());
        for descriptor in &request.files {
            let outcome = self
                .acquire(&request.os_code, &request.app_id, descriptor, request.throttle_kbs)
                .await;
            files.push(FileReport {
                file_name: descriptor.file_name.clone(),
                outcome,
            });
        }

        // Step 4: Fold outcomes and persist the final status
        let outcomes: Vec<FileOutcome> = files.iter().map(|f| f.outcome).collect();
        let status = DownloadAggregator::aggregate(&outcomes);
        self.applications
            .set_download_status(request.catalog, &request.app_id, status)
            .await?;

        let report = DownloadReport {
            app_id: request.app_id,
            status,
            files,
        };
        info!(
            app_id = %report.app_id,
            status = %status,
            downloaded = report.downloaded(),
            total = report.files.len(),
            "download pass finished"
        );
        Ok(report)
    }

    async fn without_files(&self, request: &DownloadRequest) -> Result<DownloadReport> {
        let status = if self.vendor_managed.matches(&request.os_string) {
            let status = FilesDownloadStatus::AgentWillDownloadFromVendor;
            self.applications
                .set_download_status(request.catalog, &request.app_id, status)
                .await?;
            info!(app_id = %request.app_id, os = %request.os_string, "agent downloads from vendor");
            status
        } else {
            self.applications
                .get(request.catalog, &request.app_id)
                .await?
                .map(|app| app.files_download_status)
                .unwrap_or(FilesDownloadStatus::MissingUri)
        };

        Ok(DownloadReport {
            app_id: request.app_id.clone(),
            status,
            files: Vec::new(),
        })
    }

    /// Acquires one file and reduces every failure to a [`FileOutcome`]
    async fn acquire(
        &self,
        os_code: &OsCode,
        app_id: &AppId,
        descriptor: &FileDescriptor,
        throttle_kbs: u64,
    ) -> FileOutcome {
        match self.try_acquire(os_code, app_id, descriptor, throttle_kbs).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let outcome = classify(&e);
                warn!(
                    app_id = %app_id,
                    file = %descriptor.file_name,
                    outcome = %outcome,
                    error = %e,
                    "file acquisition failed"
                );
                outcome
            }
        }
    }

    async fn try_acquire(
        &self,
        os_code: &OsCode,
        app_id: &AppId,
        descriptor: &FileDescriptor,
        throttle_kbs: u64,
    ) -> Result<FileOutcome> {
        descriptor.validate()?;

        let storage = self
            .layout
            .storage_path(os_code, app_id, &descriptor.file_name);

        // Already on disk: no network, only the shared-dependency link
        if self.package_files.exists(&storage).await {
            debug!(app_id = %app_id, file = %descriptor.file_name, "file already present");
            self.link_shared(os_code, app_id, descriptor, &storage).await?;
            return Ok(FileOutcome::Downloaded);
        }

        let Some(uri) = descriptor.uri() else {
            return Ok(FileOutcome::MissingUri);
        };
        validate_fetch_uri(uri)?;

        if let Some(parent) = storage.parent() {
            self.package_files.ensure_dir(parent).await?;
        }
        let written = self.fetcher.fetch(uri, &storage, throttle_kbs).await?;

        let actual_hash = if IntegrityCheck::needs_hash(descriptor) {
            Some(self.package_files.sha256(&storage).await?)
        } else {
            None
        };
        if let Err(e) = IntegrityCheck::verify(descriptor, actual_hash.as_deref(), written) {
            // a retry must re-fetch rather than trust the corrupt copy
            self.package_files.remove(&storage).await?;
            return Err(e.into());
        }

        self.link_shared(os_code, app_id, descriptor, &storage).await?;
        debug!(app_id = %app_id, file = %descriptor.file_name, bytes = written, "file downloaded");
        Ok(FileOutcome::Downloaded)
    }

    /// Links a shared dependency into the application's own directory
    async fn link_shared(
        &self,
        os_code: &OsCode,
        app_id: &AppId,
        descriptor: &FileDescriptor,
        storage: &Path,
    ) -> Result<()> {
        if !os_code.shares_dependencies() {
            return Ok(());
        }
        self.package_files
            .ensure_dir(&self.layout.app_dir(app_id))
            .await?;
        self.package_files
            .ensure_symlink(storage, &self.layout.app_file(app_id, &descriptor.file_name))
            .await
    }
}

fn classify(error: &anyhow::Error) -> FileOutcome {
    match error.downcast_ref::<PatchError>() {
        Some(PatchError::IntegrityMismatch { .. }) => FileOutcome::Mismatch,
        Some(PatchError::InvalidReference { .. }) => FileOutcome::InvalidUri,
        _ => FileOutcome::Failed,
    }
}
