use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;

/// PackageFiles port for the on-disk package tree
///
/// Calls run inside download jobs on the async runtime, so implementations
/// must not block the calling thread.
#[async_trait]
pub trait PackageFiles: Send + Sync {
    /// True when a regular file or a symlink exists at `path`
    async fn exists(&self, path: &Path) -> bool;

    async fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Hex SHA-256 of the file contents
    async fn sha256(&self, path: &Path) -> Result<String>;

    async fn size(&self, path: &Path) -> Result<u64>;

    /// Makes `link` a symlink to `target`, leaving an existing link alone
    async fn ensure_symlink(&self, target: &Path, link: &Path) -> Result<()>;

    /// Removes the file if present
    async fn remove(&self, path: &Path) -> Result<()>;
}
