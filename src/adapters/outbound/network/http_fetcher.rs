use crate::patching::services::validate_fetch_uri;
use crate::ports::outbound::FileFetcher;
use crate::shared::error::PatchError;
use crate::shared::Result;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// GitHub release assets are only served as bytes with this Accept header
const GITHUB_API_PREFIX: &str = "https://api.github.com/";

/// HttpFileFetcher adapter streaming package files over HTTP(S)
///
/// Bytes are written to a uniquely named sibling temp file, flushed, then
/// renamed into place, so an interrupted transfer never leaves a file that
/// looks present. `file://` URIs are copied the same way.
pub struct HttpFileFetcher {
    client: reqwest::Client,
}

impl HttpFileFetcher {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("fleet-patch/{}", version);
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    fn temp_path(destination: &Path) -> PathBuf {
        let temp_name = format!(".tmp.{}", Uuid::new_v4());
        destination.with_file_name(
            destination
                .file_name()
                .map(|n| format!("{}{}", n.to_string_lossy(), temp_name))
                .unwrap_or(temp_name),
        )
    }

    async fn download_to(
        &self,
        url: &Url,
        temp_path: &Path,
        throttle_kbs: u64,
    ) -> std::result::Result<u64, PatchError> {
        let fetch_error = |details: String| PatchError::TransientFetch {
            uri: url.to_string(),
            details,
        };

        if url.scheme() == "file" {
            let source = url
                .to_file_path()
                .map_err(|_| fetch_error("not a local path".to_string()))?;
            return fs::copy(&source, temp_path)
                .await
                .map_err(|e| fetch_error(e.to_string()));
        }

        let mut request = self.client.get(url.clone());
        if url.as_str().starts_with(GITHUB_API_PREFIX) {
            request = request.header(ACCEPT, "application/octet-stream");
        }

        let response = request.send().await.map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP status {}", status)));
        }

        let mut file = fs::File::create(temp_path)
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        let mut stream = response.bytes_stream();
        let mut throttle = Throttle::new(throttle_kbs);
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| fetch_error(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| fetch_error(e.to_string()))?;
            written += chunk.len() as u64;
            throttle.pace(written).await;
        }

        file.sync_all().await.map_err(|e| fetch_error(e.to_string()))?;
        Ok(written)
    }
}

#[async_trait]
impl FileFetcher for HttpFileFetcher {
    async fn fetch(&self, uri: &str, destination: &Path, throttle_kbs: u64) -> Result<u64> {
        let url = validate_fetch_uri(uri)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = Self::temp_path(destination);
        match self.download_to(&url, &temp_path, throttle_kbs).await {
            Ok(written) => {
                fs::rename(&temp_path, destination).await?;
                tracing::debug!(uri = %url, bytes = written, path = %destination.display(), "file fetched");
                Ok(written)
            }
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                Err(e.into())
            }
        }
    }
}

/// Sleeps just enough to keep the average rate under the limit
struct Throttle {
    bytes_per_sec: u64,
    started: Instant,
}

impl Throttle {
    fn new(throttle_kbs: u64) -> Self {
        Self {
            bytes_per_sec: throttle_kbs.saturating_mul(1024),
            started: Instant::now(),
        }
    }

    fn delay_for(&self, written: u64, elapsed: Duration) -> Option<Duration> {
        if self.bytes_per_sec == 0 {
            return None;
        }
        let expected = Duration::from_secs_f64(written as f64 / self.bytes_per_sec as f64);
        expected.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    async fn pace(&mut self, written: u64) {
        if let Some(delay) = self.delay_for(written, self.started.elapsed()) {
            tokio::time::sleep(delay).await;
        }
    }
}
