use super::agent::OsCode;
use super::ids::AppId;
use std::path::{Path, PathBuf};

/// Where package files live on disk
///
/// Every application gets `<packages_root>/<app_id>/`. Linux files are stored
/// once in the shared dependencies directory and symlinked into each
/// application directory that needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    packages_root: PathBuf,
    dependencies_dir: PathBuf,
}

impl PackageLayout {
    pub fn new(packages_root: PathBuf, dependencies_dir: Option<PathBuf>) -> Self {
        let dependencies_dir = dependencies_dir.unwrap_or_else(|| packages_root.join("dependencies"));
        Self {
            packages_root,
            dependencies_dir,
        }
    }

    pub fn packages_root(&self) -> &Path {
        &self.packages_root
    }

    pub fn dependencies_dir(&self) -> &Path {
        &self.dependencies_dir
    }

    pub fn app_dir(&self, app_id: &AppId) -> PathBuf {
        self.packages_root.join(app_id.as_str())
    }

    /// Path the application sees the file under
    pub fn app_file(&self, app_id: &AppId, file_name: &str) -> PathBuf {
        self.app_dir(app_id).join(file_name)
    }

    pub fn dependency_file(&self, file_name: &str) -> PathBuf {
        self.dependencies_dir.join(file_name)
    }

    /// Where the bytes are physically stored for the given OS family
    pub fn storage_path(&self, os_code: &OsCode, app_id: &AppId, file_name: &str) -> PathBuf {
        if os_code.shares_dependencies() {
            self.dependency_file(file_name)
        } else {
            self.app_file(app_id, file_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dependencies_dir() {
        let layout = PackageLayout::new(PathBuf::from("/srv/packages"), None);
        assert_eq!(
            layout.dependencies_dir(),
            Path::new("/srv/packages/dependencies")
        );
    }

    #[test]
    fn test_storage_path_per_os() {
        let layout = PackageLayout::new(
            PathBuf::from("/srv/packages"),
            Some(PathBuf::from("/srv/deps")),
        );
        let app = AppId::from_hex("abc");
        assert_eq!(
            layout.storage_path(&OsCode::Linux, &app, "libssl.deb"),
            PathBuf::from("/srv/deps/libssl.deb")
        );
        assert_eq!(
            layout.storage_path(&OsCode::Windows, &app, "kb.msu"),
            PathBuf::from("/srv/packages/abc/kb.msu")
        );
        assert_eq!(
            layout.app_file(&app, "libssl.deb"),
            PathBuf::from("/srv/packages/abc/libssl.deb")
        );
    }
}
