/// Mock implementations for testing
mod mock_file_fetcher;
mod mock_progress_reporter;

pub use mock_file_fetcher::MockFileFetcher;
pub use mock_progress_reporter::MockProgressReporter;
