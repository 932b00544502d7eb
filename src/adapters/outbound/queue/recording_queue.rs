use crate::ports::outbound::{Job, JobHandler, WorkQueue};
use crate::shared::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// RecordingWorkQueue adapter that holds jobs until drained explicitly
///
/// Used by tests to inspect what was enqueued, and to run background work
/// deterministically on the caller's task.
#[derive(Default)]
pub struct RecordingWorkQueue {
    jobs: Mutex<VecDeque<Job>>,
}

impl RecordingWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs currently waiting, oldest first
    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }

    /// Runs queued jobs in order until the queue is empty
    ///
    /// Jobs enqueued while draining run too. A failing job is logged and
    /// does not stop the drain. Returns how many jobs ran.
    pub async fn drain_into<H: JobHandler + ?Sized>(&self, handler: &H) -> usize {
        let mut ran = 0;
        loop {
            let next = self.jobs.lock().await.pop_front();
            let Some(job) = next else {
                break;
            };
            let label = job.to_string();
            if let Err(e) = handler.handle(job).await {
                tracing::error!(job = %label, error = %e, "job failed");
            }
            ran += 1;
        }
        ran
    }
}

#[async_trait]
impl WorkQueue for RecordingWorkQueue {
    async fn enqueue(&self, job: Job) -> Result<()> {
        self.jobs.lock().await.push_back(job);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patching::domain::{AgentId, CatalogKind};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JobHandler for FailingHandler {
        async fn handle(&self, _job: Job) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("boom")
        }
    }

    fn ingest_job() -> Job {
        Job::IngestInventory {
            agent_id: AgentId::new("a1"),
            catalog: CatalogKind::Os,
            apps: vec![],
            cutoff: Utc::now(),
            delete_afterwards: true,
        }
    }

    #[tokio::test]
    async fn test_records_in_order_and_drains_past_failures() {
        let queue = RecordingWorkQueue::new();
        queue.enqueue(ingest_job()).await.unwrap();
        queue.enqueue(ingest_job()).await.unwrap();
        assert_eq!(queue.len().await, 2);
        assert_eq!(queue.jobs().await[0].kind(), "ingest_inventory");

        let handler = FailingHandler {
            calls: AtomicUsize::new(0),
        };
        let ran = queue.drain_into(&handler).await;

        assert_eq!(ran, 2);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
        assert!(queue.is_empty().await);
    }
}
