use crate::patching::domain::{AppId, ArtifactFile};
use crate::ports::outbound::{ArtifactRepository, PutSummary};
use crate::shared::Result;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory file registry keyed by file name
#[derive(Default)]
pub struct InMemoryArtifactRepository {
    files: DashMap<String, ArtifactFile>,
}

impl InMemoryArtifactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifactRepository {
    async fn exists(&self, file_name: &str) -> Result<bool> {
        Ok(self.files.contains_key(file_name))
    }

    async fn get(&self, file_name: &str) -> Result<Option<ArtifactFile>> {
        Ok(self.files.get(file_name).map(|row| row.value().clone()))
    }

    async fn put(&self, files: Vec<ArtifactFile>) -> Result<PutSummary> {
        let mut summary = PutSummary::default();
        for file in files {
            match self.files.entry(file.file_name.clone()) {
                Entry::Occupied(mut existing) => {
                    let row = existing.get_mut();
                    row.merge_references(file.app_ids, file.agent_ids);
                    if row.file_uri.is_none() {
                        row.file_uri = file.file_uri;
                    }
                    summary.updated += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(file);
                    summary.inserted += 1;
                }
            }
        }
        Ok(summary)
    }

    async fn files_for_app(&self, app_id: &AppId) -> Result<Vec<ArtifactFile>> {
        let mut files: Vec<ArtifactFile> = self
            .files
            .iter()
            .filter(|row| row.value().app_ids.contains(app_id))
            .map(|row| row.value().clone())
            .collect();
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }
}
