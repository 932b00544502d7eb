use crate::patching::domain::{AppId, Application, CatalogKind, FilesDownloadStatus};
use crate::shared::Result;
use async_trait::async_trait;

/// Whether a write created a row, changed an existing one, or was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The stored row was newer, so the write was dropped
    Stale,
}

/// ApplicationRepository port for the catalog rows shared across agents
///
/// The backing collection is selected by the catalog kind. Implementations
/// must apply `merge_or_insert` atomically per row.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn get(&self, catalog: CatalogKind, app_id: &AppId) -> Result<Option<Application>>;

    /// Inserts `app`, or merges it into the existing row
    ///
    /// On merge the existing row keeps its download status and hidden flag,
    /// gains `view` in its visibility set, and takes the vulnerability data
    /// from `app` when that data is non-empty.
    async fn merge_or_insert(
        &self,
        catalog: CatalogKind,
        app: Application,
        view: &str,
    ) -> Result<UpsertOutcome>;

    async fn set_download_status(
        &self,
        catalog: CatalogKind,
        app_id: &AppId,
        status: FilesDownloadStatus,
    ) -> Result<()>;
}
