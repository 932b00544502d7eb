use crate::patching::domain::VulnerabilityInfo;
use crate::patching::policies::VulnerabilityQuery;
use crate::ports::outbound::VulnerabilityRepository;
use crate::shared::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Cache key for bulletin lookups
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct CacheKey {
    os_string: String,
    query: VulnerabilityQuery,
}

impl CacheKey {
    fn new(os_string: &str, query: &VulnerabilityQuery) -> Self {
        Self {
            os_string: os_string.to_string(),
            query: query.clone(),
        }
    }
}

/// CachingVulnerabilityRepository wraps a VulnerabilityRepository and memoizes lookups.
///
/// A fleet reports the same (os, name, version, kb) tuples over and over, so
/// only the first lookup per tuple reaches the bulletin feed. Failed lookups
/// are not cached.
pub struct CachingVulnerabilityRepository<R: VulnerabilityRepository> {
    inner: R,
    cache: Arc<DashMap<CacheKey, VulnerabilityInfo>>,
}

impl<R: VulnerabilityRepository> CachingVulnerabilityRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Returns the current cache size (for testing/monitoring)
    #[cfg(test)]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<R: VulnerabilityRepository> VulnerabilityRepository for CachingVulnerabilityRepository<R> {
    async fn lookup(
        &self,
        os_string: &str,
        query: &VulnerabilityQuery,
    ) -> Result<VulnerabilityInfo> {
        let key = CacheKey::new(os_string, query);

        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let info = self.inner.lookup(os_string, query).await?;
        self.cache.insert(key, info.clone());

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock feed that counts calls and fails on a chosen KB
    struct MockBulletinFeed {
        call_count: AtomicUsize,
    }

    impl MockBulletinFeed {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
            }
        }

        fn get_call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VulnerabilityRepository for MockBulletinFeed {
        async fn lookup(
            &self,
            _os_string: &str,
            query: &VulnerabilityQuery,
        ) -> Result<VulnerabilityInfo> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match query {
                VulnerabilityQuery::ByKb { kb } if kb == "KB-FAIL" => {
                    anyhow::bail!("feed unavailable")
                }
                VulnerabilityQuery::ByKb { kb } => Ok(VulnerabilityInfo {
                    cve_ids: vec![],
                    bulletin_id: format!("MS-{}", kb),
                    categories: vec![],
                }),
                VulnerabilityQuery::ByNameVersion { name, .. } => Ok(VulnerabilityInfo {
                    cve_ids: vec![format!("CVE-{}", name)],
                    bulletin_id: String::new(),
                    categories: vec![],
                }),
            }
        }
    }

    fn by_name(name: &str, version: &str) -> VulnerabilityQuery {
        VulnerabilityQuery::ByNameVersion {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    #[tokio::test]
    async fn test_caching_repository_returns_cached_value() {
        let caching_repo = CachingVulnerabilityRepository::new(MockBulletinFeed::new());

        let first = caching_repo
            .lookup("Ubuntu 22.04", &by_name("curl", "7.0"))
            .await
            .unwrap();
        let second = caching_repo
            .lookup("Ubuntu 22.04", &by_name("curl", "7.0"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(caching_repo.inner.get_call_count(), 1);
        assert_eq!(caching_repo.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_distinct_versions_and_os_cached_separately() {
        let caching_repo = CachingVulnerabilityRepository::new(MockBulletinFeed::new());

        caching_repo
            .lookup("Ubuntu 22.04", &by_name("curl", "7.0"))
            .await
            .unwrap();
        caching_repo
            .lookup("Ubuntu 22.04", &by_name("curl", "7.1"))
            .await
            .unwrap();
        caching_repo
            .lookup("Linux Mint 21", &by_name("curl", "7.0"))
            .await
            .unwrap();

        assert_eq!(caching_repo.inner.get_call_count(), 3);
        assert_eq!(caching_repo.cache_size(), 3);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let caching_repo = CachingVulnerabilityRepository::new(MockBulletinFeed::new());
        let query = VulnerabilityQuery::ByKb {
            kb: "KB-FAIL".to_string(),
        };

        assert!(caching_repo.lookup("Windows 10", &query).await.is_err());
        assert!(caching_repo.lookup("Windows 10", &query).await.is_err());

        assert_eq!(caching_repo.inner.get_call_count(), 2);
        assert_eq!(caching_repo.cache_size(), 0);
    }
}
