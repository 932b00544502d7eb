use crate::patching::domain::OsCode;

/// Which bulletin feed to consult for a reported application
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VulnerabilityQuery {
    /// Microsoft bulletins are keyed by KB article
    ByKb { kb: String },
    /// Ubuntu security notices are keyed by package name and version
    ByNameVersion { name: String, version: String },
}

/// Decides whether and how an application's vulnerabilities are looked up
pub struct VulnerabilityRouting;

impl VulnerabilityRouting {
    pub fn route(
        os_code: &OsCode,
        os_string: &str,
        name: &str,
        version: &str,
        kb: &str,
    ) -> Option<VulnerabilityQuery> {
        let os = os_string.to_lowercase();

        if matches!(os_code, OsCode::Windows) || os.contains("windows") {
            let kb = kb.trim();
            if kb.is_empty() {
                return None;
            }
            return Some(VulnerabilityQuery::ByKb { kb: kb.to_string() });
        }

        if os.contains("ubuntu") || os.contains("mint") {
            return Some(VulnerabilityQuery::ByNameVersion {
                name: name.to_string(),
                version: version.to_string(),
            });
        }

        None
    }
}
