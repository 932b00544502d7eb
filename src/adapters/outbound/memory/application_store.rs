use crate::patching::domain::{AppId, Application, CatalogKind, FilesDownloadStatus};
use crate::ports::outbound::{ApplicationRepository, UpsertOutcome};
use crate::shared::error::PatchError;
use crate::shared::Result;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory catalog keyed by (catalog kind, app id)
///
/// Merges run under the row's shard lock, so concurrent ingestion of the
/// same application never loses a view or vulnerability update.
#[derive(Default)]
pub struct InMemoryApplicationRepository {
    rows: DashMap<(CatalogKind, AppId), Application>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, catalog: CatalogKind) -> usize {
        self.rows.iter().filter(|row| row.key().0 == catalog).count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn all(&self, catalog: CatalogKind) -> Vec<Application> {
        let mut apps: Vec<Application> = self
            .rows
            .iter()
            .filter(|row| row.key().0 == catalog)
            .map(|row| row.value().clone())
            .collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name).then(a.version.cmp(&b.version)));
        apps
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn get(&self, catalog: CatalogKind, app_id: &AppId) -> Result<Option<Application>> {
        Ok(self
            .rows
            .get(&(catalog, app_id.clone()))
            .map(|row| row.value().clone()))
    }

    async fn merge_or_insert(
        &self,
        catalog: CatalogKind,
        mut app: Application,
        view: &str,
    ) -> Result<UpsertOutcome> {
        match self.rows.entry((catalog, app.app_id.clone())) {
            Entry::Occupied(mut existing) => {
                let row = existing.get_mut();
                row.views.insert(view.to_string());
                if !app.vulnerability.is_empty() {
                    row.vulnerability = app.vulnerability;
                }
                Ok(UpsertOutcome::Updated)
            }
            Entry::Vacant(slot) => {
                app.catalog = catalog;
                app.views.insert(view.to_string());
                slot.insert(app);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn set_download_status(
        &self,
        catalog: CatalogKind,
        app_id: &AppId,
        status: FilesDownloadStatus,
    ) -> Result<()> {
        let mut row = self
            .rows
            .get_mut(&(catalog, app_id.clone()))
            .ok_or_else(|| PatchError::Storage {
                collection: catalog.collections().applications,
                details: format!("application {} not found", app_id),
            })?;
        row.files_download_status = status;
        Ok(())
    }
}
