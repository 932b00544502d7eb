use crate::patching::domain::VulnerabilityInfo;
use crate::patching::policies::VulnerabilityQuery;
use crate::shared::Result;
use async_trait::async_trait;

/// VulnerabilityRepository port for bulletin lookups
///
/// Implementations must be `Send + Sync` so one instance can serve
/// concurrent ingestion jobs. A query with no matching bulletin returns
/// an empty [`VulnerabilityInfo`], not an error.
#[async_trait]
pub trait VulnerabilityRepository: Send + Sync {
    async fn lookup(&self, os_string: &str, query: &VulnerabilityQuery)
        -> Result<VulnerabilityInfo>;
}
