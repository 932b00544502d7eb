use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Catalog-wide application identity, derived from name and version
///
/// Two reports of the same (name, version) pair always collapse onto the
/// same catalog row, whichever agent or vendor they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Derives the id as the hex SHA-256 of `name`, a NUL byte, then `version`
    ///
    /// The separator keeps `("libfoo1", "2.0")` and `("libfoo", "12.0")` apart.
    /// Surrounding whitespace on either field is ignored.
    pub fn derive(name: &str, version: &str) -> Self {
        Self(sha256_hex(&[name.trim().as_bytes(), version.trim().as_bytes()]))
    }

    /// Wraps an id that was derived elsewhere (stored rows, operator requests)
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primary key of an agent-application binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(String);

impl BindingId {
    /// Derives the id as the hex SHA-256 of the agent id, a NUL byte, then the app id
    pub fn derive(agent_id: &AgentId, app_id: &AppId) -> Self {
        Self(sha256_hex(&[
            agent_id.as_str().as_bytes(),
            app_id.as_str().as_bytes(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a managed endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Content addressing helpers used by ingestion and dispatch
pub struct ContentAddresser;

impl ContentAddresser {
    pub fn app_id(name: &str, version: &str) -> AppId {
        AppId::derive(name, version)
    }

    pub fn binding_id(agent_id: &AgentId, app_id: &AppId) -> BindingId {
        BindingId::derive(agent_id, app_id)
    }
}

/// Hashes the parts with a NUL byte between each pair
fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_id_is_deterministic() {
        let a = ContentAddresser::app_id("pkgA", "1.0");
        let b = ContentAddresser::app_id("pkgA", "1.0");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_app_id_differs_for_distinct_pairs() {
        let base = ContentAddresser::app_id("pkgA", "1.0");
        assert_ne!(base, ContentAddresser::app_id("pkgA", "1.1"));
        assert_ne!(base, ContentAddresser::app_id("pkgB", "1.0"));
    }

    #[test]
    fn test_app_id_does_not_collide_across_field_boundary() {
        assert_ne!(
            ContentAddresser::app_id("libfoo1", "2.0"),
            ContentAddresser::app_id("libfoo", "12.0")
        );
        assert_ne!(
            ContentAddresser::app_id("ab", "c"),
            ContentAddresser::app_id("a", "bc")
        );
    }

    #[test]
    fn test_app_id_ignores_surrounding_whitespace() {
        assert_eq!(
            ContentAddresser::app_id(" curl", "7.0 "),
            ContentAddresser::app_id("curl", "7.0")
        );
    }

    #[test]
    fn test_app_id_matches_known_digest() {
        // sha256("curl\07.0")
        let id = ContentAddresser::app_id("curl", "7.0");
        let expected = hex::encode(Sha256::digest(b"curl\x007.0"));
        assert_eq!(id.as_str(), expected);
    }

    #[test]
    fn test_binding_id_is_deterministic_per_pair() {
        let agent = AgentId::new("agent-1");
        let app = ContentAddresser::app_id("curl", "7.0");
        let first = ContentAddresser::binding_id(&agent, &app);
        let second = ContentAddresser::binding_id(&agent, &app);
        assert_eq!(first, second);

        let other_agent = AgentId::new("agent-2");
        assert_ne!(first, ContentAddresser::binding_id(&other_agent, &app));
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let agent = AgentId::new("agent-1");
        assert_eq!(serde_json::to_string(&agent).unwrap(), "\"agent-1\"");
    }
}
