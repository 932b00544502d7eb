mod download_aggregator;
mod integrity_check;
mod uri_resolver;

pub use download_aggregator::{DownloadAggregator, FileOutcome};
pub use integrity_check::IntegrityCheck;
pub use uri_resolver::{validate_fetch_uri, UriResolver};
