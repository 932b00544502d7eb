use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;

/// FileFetcher port for pulling package bytes from a vendor or mirror
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Fetches `uri` into `destination`, returning the number of bytes written
    ///
    /// `throttle_kbs` caps the transfer rate in KB/s; 0 means unlimited.
    /// The destination must never hold a partial file, even on failure.
    async fn fetch(&self, uri: &str, destination: &Path, throttle_kbs: u64) -> Result<u64>;
}
