use super::application_repository::UpsertOutcome;
use crate::patching::domain::{AgentId, AppId, AppStatus, ApplicationBinding, CatalogKind};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// BindingRepository port for per-agent application state
///
/// Rows are keyed by `BindingId`, and the catalog kind selects the backing
/// collection. Index-style lookups (`(agent_id, app_id)`, `(agent_id, status)`)
/// live behind named methods so callers never compose filters inline.
#[async_trait]
pub trait BindingRepository: Send + Sync {
    async fn get(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        app_id: &AppId,
    ) -> Result<Option<ApplicationBinding>>;

    /// Last-write-wins upsert on `last_modified`
    ///
    /// A binding older than the stored row is ignored and reported as
    /// [`UpsertOutcome::Stale`].
    async fn upsert(&self, binding: ApplicationBinding) -> Result<UpsertOutcome>;

    /// Removes every binding of `agent_id` last modified strictly before `cutoff`
    async fn delete_older_than(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        cutoff: DateTime<Utc>,
    ) -> Result<usize>;

    /// The subset of `app_ids` bound to the agent, in request order
    async fn valid_app_ids(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        app_ids: &[AppId],
    ) -> Result<Vec<AppId>>;

    /// Updates status (and install date when given); false if no such binding
    async fn set_status(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
        app_id: &AppId,
        status: AppStatus,
        install_date: Option<DateTime<Utc>>,
    ) -> Result<bool>;

    async fn delete(&self, catalog: CatalogKind, agent_id: &AgentId, app_id: &AppId)
        -> Result<bool>;

    async fn for_agent(
        &self,
        catalog: CatalogKind,
        agent_id: &AgentId,
    ) -> Result<Vec<ApplicationBinding>>;
}
