use crate::ports::outbound::ViewConfig;
use crate::shared::error::PatchError;
use crate::shared::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Download locations for one view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewLocations {
    pub package_base_url: String,
    pub file_servers: Vec<String>,
}

/// View configuration held in memory, usually built from the config file
#[derive(Default)]
pub struct StaticViewRegistry {
    views: HashMap<String, ViewLocations>,
}

impl StaticViewRegistry {
    pub fn new(views: HashMap<String, ViewLocations>) -> Self {
        Self { views }
    }

    fn locations(&self, view: &str) -> Result<&ViewLocations> {
        self.views.get(view).ok_or_else(|| {
            PatchError::Validation {
                message: format!("view '{}' has no download configuration", view),
            }
            .into()
        })
    }
}

#[async_trait]
impl ViewConfig for StaticViewRegistry {
    async fn file_servers(&self, view: &str) -> Result<Vec<String>> {
        Ok(self.locations(view)?.file_servers.clone())
    }

    async fn package_base_url(&self, view: &str) -> Result<String> {
        Ok(self.locations(view)?.package_base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_views() {
        let registry = StaticViewRegistry::new(HashMap::from([(
            "default".to_string(),
            ViewLocations {
                package_base_url: "https://patch.example.com/packages".to_string(),
                file_servers: vec!["10.0.0.5".to_string()],
            },
        )]));

        assert_eq!(
            registry.package_base_url("default").await.unwrap(),
            "https://patch.example.com/packages"
        );
        assert_eq!(registry.file_servers("default").await.unwrap().len(), 1);

        let err = registry.package_base_url("tenant-x").await.unwrap_err();
        assert!(err.to_string().contains("tenant-x"));
    }
}
