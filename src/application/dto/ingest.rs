use crate::patching::domain::{AgentId, CatalogKind, ReportedApp};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// IngestRequest - one agent's inventory snapshot
///
/// `cutoff` is captured once when the pass starts and stamped on every
/// binding it writes, so the trailing stale sweep removes exactly the apps
/// this snapshot no longer reports.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub agent_id: AgentId,
    pub catalog: CatalogKind,
    pub apps: Vec<ReportedApp>,
    pub cutoff: DateTime<Utc>,
    /// Set to false for partial reports, which must not sweep stale bindings
    pub delete_afterwards: bool,
}

impl IngestRequest {
    pub fn new(agent_id: AgentId, apps: Vec<ReportedApp>, cutoff: DateTime<Utc>) -> Self {
        Self {
            agent_id,
            catalog: CatalogKind::Os,
            apps,
            cutoff,
            delete_afterwards: true,
        }
    }

    pub fn with_catalog(mut self, catalog: CatalogKind) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn partial(mut self) -> Self {
        self.delete_afterwards = false;
        self
    }
}

/// An inventory entry that was not reconciled, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// IngestReport - what one ingestion pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub applications_inserted: usize,
    pub applications_updated: usize,
    pub bindings_inserted: usize,
    pub bindings_updated: usize,
    /// Upserts dropped because a newer pass already wrote the binding
    pub bindings_stale: usize,
    pub bindings_deleted: usize,
    pub downloads_enqueued: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl IngestReport {
    /// `(inserted, updated, deleted)` binding counts
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.bindings_inserted,
            self.bindings_updated,
            self.bindings_deleted,
        )
    }

    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = IngestRequest::new(AgentId::new("a1"), vec![], Utc::now());
        assert_eq!(request.catalog, CatalogKind::Os);
        assert!(request.delete_afterwards);
        assert!(!request.partial().delete_afterwards);
    }

    #[test]
    fn test_counts_tuple() {
        let report = IngestReport {
            bindings_inserted: 2,
            bindings_updated: 1,
            bindings_deleted: 3,
            ..IngestReport::default()
        };
        assert_eq!(report.counts(), (2, 1, 3));
        assert!(!report.has_skips());
    }
}
