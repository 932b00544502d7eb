/// Background work queue adapters
mod recording_queue;
mod tokio_queue;

pub use recording_queue::RecordingWorkQueue;
pub use tokio_queue::{TokioWorkQueue, WorkerPool};
