use crate::shared::security::validate_regular_file;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum input file size for security (100 MB)
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// SafeFileReader adapter for reading operator-supplied files
///
/// Configuration and scenario files both come from the command line, so
/// they are read with the same checks: no symbolic links, regular files
/// only, and a size cap.
pub struct SafeFileReader;

impl SafeFileReader {
    pub fn new() -> Self {
        Self
    }

    /// Reads `path` as UTF-8 text after the security checks
    ///
    /// # Arguments
    /// * `path` - File to read
    /// * `file_type` - Human-readable description used in error messages
    pub fn read_to_string(&self, path: &Path, file_type: &str) -> Result<String> {
        validate_regular_file(path, file_type)?;

        let file_size = fs::metadata(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {} metadata: {}", file_type, e))?
            .len();
        if file_size > MAX_FILE_SIZE {
            anyhow::bail!(
                "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
                path.display(),
                file_size,
                MAX_FILE_SIZE
            );
        }

        fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file_type, e))
    }
}

impl Default for SafeFileReader {
    fn default() -> Self {
        Self::new()
    }
}
