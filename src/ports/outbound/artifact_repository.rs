use crate::patching::domain::{AppId, ArtifactFile};
use crate::shared::Result;
use async_trait::async_trait;

/// Counts returned by [`ArtifactRepository::put`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// ArtifactRepository port: the content-addressed file registry
///
/// Rows are keyed by file name. Reference sets only ever grow through
/// `put`; a file is eligible for removal only when both sets are empty.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn exists(&self, file_name: &str) -> Result<bool>;

    async fn get(&self, file_name: &str) -> Result<Option<ArtifactFile>>;

    /// Inserts new rows and unions references into existing ones
    async fn put(&self, files: Vec<ArtifactFile>) -> Result<PutSummary>;

    /// Every file referenced by `app_id`, ordered by file name
    async fn files_for_app(&self, app_id: &AppId) -> Result<Vec<ArtifactFile>>;
}
