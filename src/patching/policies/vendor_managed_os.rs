/// OS families whose agents fetch packages from their own vendor repositories
pub const DEFAULT_VENDOR_MANAGED_OS: &[&str] = &["Red Hat Enterprise Linux Server"];

/// Matches an agent's OS string against the vendor-managed list
///
/// Matching is a case-insensitive substring test, so
/// `Red Hat Enterprise Linux Server release 7.9` matches the default entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorManagedOs {
    patterns: Vec<String>,
}

impl VendorManagedOs {
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, os_string: &str) -> bool {
        let os = os_string.to_lowercase();
        self.patterns.iter().any(|p| os.contains(p.as_str()))
    }
}

impl Default for VendorManagedOs {
    fn default() -> Self {
        Self::new(
            DEFAULT_VENDOR_MANAGED_OS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}
