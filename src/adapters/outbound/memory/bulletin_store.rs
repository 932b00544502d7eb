use crate::patching::domain::VulnerabilityInfo;
use crate::patching::policies::VulnerabilityQuery;
use crate::ports::outbound::VulnerabilityRepository;
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// One security bulletin as loaded from a scenario or fixture
#[derive(Debug, Clone, Deserialize)]
pub struct Bulletin {
    pub bulletin_id: String,
    #[serde(default)]
    pub kb: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub cve_ids: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Bulletin lookups served from a fixed in-memory table
#[derive(Default)]
pub struct StaticVulnerabilityRepository {
    by_kb: HashMap<String, VulnerabilityInfo>,
    by_name_version: HashMap<(String, String), VulnerabilityInfo>,
}

impl StaticVulnerabilityRepository {
    pub fn new(bulletins: Vec<Bulletin>) -> Self {
        let mut repo = Self::default();
        for bulletin in bulletins {
            let info = VulnerabilityInfo {
                cve_ids: bulletin.cve_ids,
                bulletin_id: bulletin.bulletin_id,
                categories: bulletin.categories,
            };
            if let Some(kb) = bulletin.kb {
                repo.by_kb.insert(kb.to_uppercase(), info.clone());
            }
            if let (Some(name), Some(version)) = (bulletin.name, bulletin.version) {
                repo.by_name_version.insert((name, version), info);
            }
        }
        repo
    }
}

#[async_trait]
impl VulnerabilityRepository for StaticVulnerabilityRepository {
    async fn lookup(
        &self,
        _os_string: &str,
        query: &VulnerabilityQuery,
    ) -> Result<VulnerabilityInfo> {
        let found = match query {
            VulnerabilityQuery::ByKb { kb } => self.by_kb.get(&kb.to_uppercase()),
            VulnerabilityQuery::ByNameVersion { name, version } => self
                .by_name_version
                .get(&(name.clone(), version.clone())),
        };
        Ok(found.cloned().unwrap_or_default())
    }
}
