use crate::patching::domain::FileDescriptor;
use crate::shared::error::PatchError;

/// Verifies a fetched file against what the agent reported
///
/// A SHA-256 hash is preferred when supplied; otherwise the byte size is
/// compared when it is non-zero; otherwise presence is enough.
pub struct IntegrityCheck;

impl IntegrityCheck {
    /// Whether verification needs the file's digest at all
    pub fn needs_hash(descriptor: &FileDescriptor) -> bool {
        descriptor.expected_hash().is_some()
    }

    pub fn verify(
        descriptor: &FileDescriptor,
        actual_hash: Option<&str>,
        actual_size: u64,
    ) -> Result<(), PatchError> {
        if let Some(expected) = descriptor.expected_hash() {
            let actual = actual_hash.unwrap_or_default();
            if !expected.eq_ignore_ascii_case(actual) {
                return Err(PatchError::IntegrityMismatch {
                    file_name: descriptor.file_name.clone(),
                    expected: expected.to_lowercase(),
                    actual: actual.to_lowercase(),
                });
            }
            return Ok(());
        }

        if descriptor.file_size > 0 && descriptor.file_size != actual_size {
            return Err(PatchError::IntegrityMismatch {
                file_name: descriptor.file_name.clone(),
                expected: format!("{} bytes", descriptor.file_size),
                actual: format!("{} bytes", actual_size),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_comparison_is_case_insensitive() {
        let descriptor = FileDescriptor::new("curl.deb").with_hash("ABCDEF");
        assert!(IntegrityCheck::verify(&descriptor, Some("abcdef"), 0).is_ok());
    }

    #[test]
    fn test_hash_mismatch_ignores_matching_size() {
        let descriptor = FileDescriptor::new("curl.deb")
            .with_hash("abc")
            .with_size(100);
        let err = IntegrityCheck::verify(&descriptor, Some("def"), 100).unwrap_err();
        assert!(err.is_integrity());
    }

    #[test]
    fn test_size_fallback() {
        let descriptor = FileDescriptor::new("curl.deb").with_size(100);
        assert!(!IntegrityCheck::needs_hash(&descriptor));
        assert!(IntegrityCheck::verify(&descriptor, None, 100).is_ok());
        assert!(IntegrityCheck::verify(&descriptor, None, 99).is_err());
    }

    #[test]
    fn test_presence_is_enough_without_hash_or_size() {
        let descriptor = FileDescriptor::new("curl.deb");
        assert!(IntegrityCheck::verify(&descriptor, None, 12345).is_ok());
    }
}
