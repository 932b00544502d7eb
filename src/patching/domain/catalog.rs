use serde::{Deserialize, Serialize};
use std::fmt;

/// Which catalog an application belongs to
///
/// OS updates, custom uploads, supported third-party apps and agent updates
/// share one record shape and differ only in where they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Os,
    Custom,
    Supported,
    AgentUpdate,
}

/// Backing collection names for one catalog kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collections {
    pub applications: &'static str,
    pub bindings: &'static str,
}

const COLLECTIONS: [(CatalogKind, Collections); 4] = [
    (
        CatalogKind::Os,
        Collections {
            applications: "unique_applications",
            bindings: "apps_per_agent",
        },
    ),
    (
        CatalogKind::Custom,
        Collections {
            applications: "custom_apps",
            bindings: "custom_apps_per_agent",
        },
    ),
    (
        CatalogKind::Supported,
        Collections {
            applications: "supported_apps",
            bindings: "supported_apps_per_agent",
        },
    ),
    (
        CatalogKind::AgentUpdate,
        Collections {
            applications: "agent_update_apps",
            bindings: "agent_update_apps_per_agent",
        },
    ),
];

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Os,
        CatalogKind::Custom,
        CatalogKind::Supported,
        CatalogKind::AgentUpdate,
    ];

    /// Resolves the backing collections through the lookup table
    pub fn collections(self) -> Collections {
        COLLECTIONS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, collections)| *collections)
            .unwrap_or(COLLECTIONS[0].1)
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collections().applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_distinct_collections() {
        let mut seen = std::collections::HashSet::new();
        for kind in CatalogKind::ALL {
            let collections = kind.collections();
            assert!(seen.insert(collections.applications));
            assert!(seen.insert(collections.bindings));
        }
    }

    #[test]
    fn test_os_catalog_collections() {
        let collections = CatalogKind::Os.collections();
        assert_eq!(collections.applications, "unique_applications");
        assert_eq!(collections.bindings, "apps_per_agent");
    }

    #[test]
    fn test_catalog_kind_serde_names() {
        let json = serde_json::to_string(&CatalogKind::AgentUpdate).unwrap();
        assert_eq!(json, "\"agent_update\"");
    }
}
