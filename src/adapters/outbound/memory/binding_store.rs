use crate::patching::domain::{
    AgentId, AppId, AppStatus, ApplicationBinding, BindingId, CatalogKind,
};
use crate::ports::outbound::{BindingRepository, UpsertOutcome};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory binding store keyed by (catalog kind, binding id)
///
/// Per-agent queries scan the map; this adapter backs the CLI replay and the
/// test suite, not a production fleet.
#[derive(Default)]
pub struct InMemoryBindingRepository {
    rows: DashMap<(CatalogKind, BindingId), ApplicationBinding>,
}

impl InMemoryBindingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn key(catalog: CatalogKind, agent_id: &AgentId, app_id: &AppId) -> (CatalogKind, BindingId) {
        (catalog, BindingId::derive(agent_id, app_id))
    }
}

#[async_trait]
impl BindingRepository for InMemoryBindingRepository {
    async fn get(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        app_id: &AppId,
    ) -> Result<Option<ApplicationBinding>> {
        Ok(self
            .rows
            .get(&Self::key(catalog, agent_id, app_id))
            .map(|row| row.value().clone()))
    }

    async fn upsert(&self, binding: ApplicationBinding) -> Result<UpsertOutcome> {
        match self.rows.entry((binding.catalog, binding.id.clone())) {
            Entry::Occupied(mut existing) => {
                if binding.last_modified < existing.get().last_modified {
                    return Ok(UpsertOutcome::Stale);
                }
                existing.insert(binding);
                Ok(UpsertOutcome::Updated)
            }
            Entry::Vacant(slot) => {
                slot.insert(binding);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn delete_older_than(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        cutoff: DateTime<Utc>,
    ) -> Result<usize> {
        let mut deleted = 0;
        self.rows.retain(|(kind, _), binding| {
            let stale =
                *kind == catalog && &binding.agent_id == agent_id && binding.last_modified < cutoff;
            if stale {
                deleted += 1;
            }
            !stale
        });
        Ok(deleted)
    }

    async fn valid_app_ids(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        app_ids: &[AppId],
    ) -> Result<Vec<AppId>> {
        let mut valid = Vec::new();
        for app_id in app_ids {
            if valid.contains(app_id) {
                continue;
            }
            if self.rows.contains_key(&Self::key(catalog, agent_id, app_id)) {
                valid.push(app_id.clone());
            }
        }
        Ok(valid)
    }

    async fn set_status(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        app_id: &AppId,
        status: AppStatus,
        install_date: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let Some(mut row) = self.rows.get_mut(&Self::key(catalog, agent_id, app_id)) else {
            return Ok(false);
        };
        row.status = status;
        if install_date.is_some() {
            row.install_date = install_date;
        }
        Ok(true)
    }

    async fn delete(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        app_id: &AppId,
    ) -> Result<bool> {
        Ok(self
            .rows
            .remove(&Self::key(catalog, agent_id, app_id))
            .is_some())
    }

    async fn for_agent(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
    ) -> Result<Vec<ApplicationBinding>> {
        let mut bindings: Vec<ApplicationBinding> = self
            .rows
            .iter()
            .filter(|row| row.key().0 == catalog && &row.value().agent_id == agent_id)
            .map(|row| row.value().clone())
            .collect();
        bindings.sort_by(|a, b| a.app_id.cmp(&b.app_id));
        Ok(bindings)
    }
}
