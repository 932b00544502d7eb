use crate::shared::Result;
use async_trait::async_trait;

/// ViewConfig port for per-tenant download locations
#[async_trait]
pub trait ViewConfig: Send + Sync {
    /// Mirror addresses (`host[:port]`) configured for the view
    async fn file_servers(&self, view: &str) -> Result<Vec<String>>;

    /// Origin URL packages are served under for the view
    async fn package_base_url(&self, view: &str) -> Result<String>;
}
