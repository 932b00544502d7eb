use crate::ports::outbound::PackageFiles;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;
use tokio::fs;

/// LocalPackageFiles adapter over the local filesystem
///
/// Metadata and link operations go through `tokio::fs`. Hashing reads the
/// whole file, so it runs on the blocking pool. Symlinks are created with
/// `tokio::fs::symlink`; on other platforms the dependency file is copied
/// into the application directory instead.
pub struct LocalPackageFiles;

impl LocalPackageFiles {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalPackageFiles {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageFiles for LocalPackageFiles {
    async fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as present
        fs::symlink_metadata(path).await.is_ok()
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory {}", path.display()))
    }

    async fn sha256(&self, path: &Path) -> Result<String> {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || hash_file(&owned))
            .await
            .with_context(|| format!("Hashing task for {} did not finish", path.display()))?
    }

    async fn size(&self, path: &Path) -> Result<u64> {
        let metadata = fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        Ok(metadata.len())
    }

    async fn ensure_symlink(&self, target: &Path, link: &Path) -> Result<()> {
        if self.exists(link).await {
            return Ok(());
        }
        if let Some(parent) = link.parent() {
            self.ensure_dir(parent).await?;
        }
        create_link(target, link).await.with_context(|| {
            format!(
                "Failed to link {} -> {}",
                link.display(),
                target.display()
            )
        })
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

fn hash_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to hash {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(unix)]
async fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    fs::symlink(target, link).await
}

#[cfg(not(unix))]
async fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    fs::copy(target, link).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sha256_and_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("curl.deb");
        fs::write(&path, b"curl7.0").unwrap();

        let files = LocalPackageFiles::new();
        assert_eq!(
            files.sha256(&path).await.unwrap(),
            hex::encode(Sha256::digest(b"curl7.0"))
        );
        assert_eq!(files.size(&path).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_sha256_of_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let files = LocalPackageFiles::new();
        let err = files.sha256(&dir.path().join("gone.deb")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_the_runtime_free() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.bin");
        fs::write(&path, vec![7u8; 4 * 1024 * 1024]).unwrap();

        let files = LocalPackageFiles::new();
        let ticker = tokio::spawn(async {
            tokio::task::yield_now().await;
            true
        });
        let (digest, ticked) = tokio::join!(files.sha256(&path), ticker);
        assert_eq!(digest.unwrap().len(), 64);
        assert!(ticked.unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let files = LocalPackageFiles::new();
        assert!(files.remove(&dir.path().join("nothing")).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_symlink_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("deps").join("libssl.deb");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, b"ssl").unwrap();
        let link = dir.path().join("app").join("libssl.deb");

        let files = LocalPackageFiles::new();
        files.ensure_symlink(&target, &link).await.unwrap();
        files.ensure_symlink(&target, &link).await.unwrap();

        let metadata = fs::symlink_metadata(&link).unwrap();
        assert!(metadata.file_type().is_symlink());
        assert_eq!(fs::read(&link).unwrap(), b"ssl");
    }
}
