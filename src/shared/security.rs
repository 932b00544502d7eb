use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum length of an artifact file name
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Validates that a path is not a symbolic link
///
/// # Security
/// This function uses `symlink_metadata()` instead of `metadata()` to ensure
/// we check the symlink itself, not the target it points to.
///
/// # Arguments
/// * `path` - The path to validate
/// * `operation` - Description of the operation (e.g., "read", "write") for error messages
///
/// # Errors
/// Returns an error if the path is a symbolic link or if metadata cannot be read
pub fn validate_not_symlink(path: &Path, operation: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read metadata for {} operation on {}: {}",
            operation,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, {} operations on symbolic links are not allowed.",
            path.display(),
            operation
        );
    }

    Ok(())
}

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Errors
/// Returns an error if:
/// - The path doesn't exist
/// - The path is a symbolic link
/// - The path is not a regular file
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!("Failed to read {} metadata: {}", file_description, e)
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    Ok(())
}

/// Validates an artifact file name before it is joined onto a packages directory
///
/// # Security
/// Agents report file names; a name containing path separators or `..`
/// would let a report write outside the application directory.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("File name cannot be empty");
    }

    if name.len() > MAX_FILE_NAME_LENGTH {
        anyhow::bail!(
            "File name is too long ({} bytes). Maximum allowed: {} bytes",
            name.len(),
            MAX_FILE_NAME_LENGTH
        );
    }

    if name.contains('/') || name.contains('\\') {
        anyhow::bail!("Security: file name '{}' contains path separators", name);
    }

    if name == "." || name.contains("..") {
        anyhow::bail!("Security: file name '{}' contains '..'", name);
    }

    if name.chars().any(char::is_control) {
        anyhow::bail!("Security: file name contains control characters");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_validate_not_symlink_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "test").unwrap();

        let result = validate_not_symlink(&file_path, "read");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_not_symlink_nonexistent() {
        let path = PathBuf::from("/nonexistent/file.txt");
        let result = validate_not_symlink(&path, "read");
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_not_symlink_rejects_link() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let result = validate_not_symlink(&link, "write");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("symbolic link"));
    }

    #[test]
    fn test_validate_regular_file_is_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_regular_file(temp_dir.path(), "scenario");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a regular file"));
    }

    #[test]
    fn test_validate_file_name_accepts_package_names() {
        assert!(validate_file_name("curl_7.81.0-1ubuntu1.15_amd64.deb").is_ok());
        assert!(validate_file_name("Windows6.1-KB2533623-x64.msu").is_ok());
    }

    #[test]
    fn test_validate_file_name_rejects_traversal() {
        assert!(validate_file_name("../etc/passwd").is_err());
        assert!(validate_file_name("a/b.deb").is_err());
        assert!(validate_file_name("a\\b.msu").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("").is_err());
    }
}
