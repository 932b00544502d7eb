/// Network adapters for package downloads and bulletin lookups
mod caching_vulnerability_repository;
mod http_fetcher;

pub use caching_vulnerability_repository::CachingVulnerabilityRepository;
pub use http_fetcher::HttpFileFetcher;
