use super::ids::{AgentId, AppId};
use crate::shared::security::validate_file_name;
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A file an application needs, as reported by an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub file_name: String,
    #[serde(default)]
    pub file_hash: Option<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub file_uri: Option<String>,
}

impl FileDescriptor {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            file_hash: None,
            file_size: 0,
            file_uri: None,
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.file_hash = Some(hash.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.file_size = size;
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.file_uri = Some(uri.into());
        self
    }

    /// Hash to verify against, ignoring blank values agents sometimes send
    pub fn expected_hash(&self) -> Option<&str> {
        self.file_hash
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    pub fn uri(&self) -> Option<&str> {
        self.file_uri
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        validate_file_name(&self.file_name)
    }
}

/// Content-addressed artifact row with the sets of apps and agents using it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub file_name: String,
    pub file_hash: Option<String>,
    pub file_size: u64,
    pub file_uri: Option<String>,
    pub app_ids: BTreeSet<AppId>,
    pub agent_ids: BTreeSet<AgentId>,
}

impl ArtifactFile {
    pub fn from_descriptor(
        descriptor: &FileDescriptor,
        app_ids: BTreeSet<AppId>,
        agent_ids: BTreeSet<AgentId>,
    ) -> Self {
        Self {
            file_name: descriptor.file_name.clone(),
            file_hash: descriptor.expected_hash().map(str::to_string),
            file_size: descriptor.file_size,
            file_uri: descriptor.uri().map(str::to_string),
            app_ids,
            agent_ids,
        }
    }

    /// Adds references; existing references are never dropped
    pub fn merge_references(
        &mut self,
        app_ids: impl IntoIterator<Item = AppId>,
        agent_ids: impl IntoIterator<Item = AgentId>,
    ) {
        self.app_ids.extend(app_ids);
        self.agent_ids.extend(agent_ids);
    }

    /// A file may only be removed from disk once nothing references it
    pub fn is_unreferenced(&self) -> bool {
        self.app_ids.is_empty() && self.agent_ids.is_empty()
    }

    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            file_name: self.file_name.clone(),
            file_hash: self.file_hash.clone(),
            file_size: self.file_size,
            file_uri: self.file_uri.clone(),
        }
    }
}
