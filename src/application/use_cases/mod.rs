/// Use cases module containing application business logic orchestration
mod check_in;
mod dispatch_operation;
mod download_files;
mod ingest_inventory;
mod record_result;

pub use check_in::CheckInUseCase;
pub use dispatch_operation::DispatchOperationUseCase;
pub use download_files::DownloadFilesUseCase;
pub use ingest_inventory::{IngestInventoryUseCase, DEFAULT_VIEW};
pub use record_result::RecordResultUseCase;
