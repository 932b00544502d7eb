use async_trait::async_trait;
use fleet_patch::ports::outbound::FileFetcher;
use fleet_patch::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

/// Mock FileFetcher serving bytes from memory and recording every request
#[derive(Default)]
pub struct MockFileFetcher {
    contents: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockFileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(self, uri: &str, content: &[u8]) -> Self {
        self.set_content(uri, content);
        self
    }

    pub fn with_failure(self, uri: &str) -> Self {
        self.failing.lock().unwrap().insert(uri.to_string());
        self
    }

    /// Serve `content` at `uri` from now on, clearing any configured failure
    pub fn set_content(&self, uri: &str, content: &[u8]) {
        self.failing.lock().unwrap().remove(uri);
        self.contents
            .lock()
            .unwrap()
            .insert(uri.to_string(), content.to_vec());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, uri: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|called| called.as_str() == uri)
            .count()
    }
}

#[async_trait]
impl FileFetcher for MockFileFetcher {
    async fn fetch(&self, uri: &str, destination: &Path, _throttle_kbs: u64) -> Result<u64> {
        self.calls.lock().unwrap().push(uri.to_string());

        if self.failing.lock().unwrap().contains(uri) {
            return Err(PatchError::TransientFetch {
                uri: uri.to_string(),
                details: "connection reset".to_string(),
            }
            .into());
        }

        let content = self.contents.lock().unwrap().get(uri).cloned();
        match content {
            Some(bytes) => {
                std::fs::write(destination, &bytes)?;
                Ok(bytes.len() as u64)
            }
            None => Err(PatchError::TransientFetch {
                uri: uri.to_string(),
                details: "HTTP 404".to_string(),
            }
            .into()),
        }
    }
}
