use crate::ports::outbound::{Job, JobHandler, WorkQueue};
use crate::shared::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

/// TokioWorkQueue adapter running jobs on the tokio runtime
///
/// `enqueue` only pushes onto a channel. A [`WorkerPool`] drains the channel,
/// running at most `max_concurrent_jobs` jobs at once, each bounded by the
/// job timeout. A job that times out is dropped where it stands; whatever
/// status it last wrote stays as is and nothing retries it.
#[derive(Clone)]
pub struct TokioWorkQueue {
    sender: mpsc::UnboundedSender<Job>,
    in_flight: Arc<watch::Sender<usize>>,
}

/// Receiving half of a [`TokioWorkQueue`]
pub struct WorkerPool {
    receiver: mpsc::UnboundedReceiver<Job>,
    in_flight: Arc<watch::Sender<usize>>,
    max_concurrent_jobs: usize,
    job_timeout: Duration,
}

impl TokioWorkQueue {
    /// Creates the queue and the worker pool that will drain it
    ///
    /// The pool is started separately so the job handler can itself hold a
    /// handle to the queue.
    pub fn new(max_concurrent_jobs: usize, job_timeout: Duration) -> (Self, WorkerPool) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (in_flight, _) = watch::channel(0usize);
        let in_flight = Arc::new(in_flight);

        let queue = Self {
            sender,
            in_flight: Arc::clone(&in_flight),
        };
        let pool = WorkerPool {
            receiver,
            in_flight,
            max_concurrent_jobs: max_concurrent_jobs.max(1),
            job_timeout,
        };
        (queue, pool)
    }

    /// Jobs accepted but not yet finished
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Waits until every accepted job, including ones they enqueue, has finished
    pub async fn wait_idle(&self) {
        let mut receiver = self.in_flight.subscribe();
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

#[async_trait]
impl WorkQueue for TokioWorkQueue {
    async fn enqueue(&self, job: Job) -> Result<()> {
        self.in_flight.send_modify(|count| *count += 1);
        if let Err(e) = self.sender.send(job) {
            self.in_flight
                .send_modify(|count| *count = count.saturating_sub(1));
            anyhow::bail!("work queue is closed: {} was not accepted", e.0);
        }
        Ok(())
    }
}

impl WorkerPool {
    /// Starts draining the queue into `handler`
    pub fn start<H: JobHandler + 'static>(self, handler: Arc<H>) -> JoinHandle<()> {
        let WorkerPool {
            mut receiver,
            in_flight,
            max_concurrent_jobs,
            job_timeout,
        } = self;
        let permits = Arc::new(Semaphore::new(max_concurrent_jobs));

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                    break;
                };
                let handler = Arc::clone(&handler);
                let guard = JobGuard {
                    _permit: permit,
                    in_flight: Arc::clone(&in_flight),
                };

                tokio::spawn(async move {
                    // released on every exit path, panics included
                    let _guard = guard;
                    let label = job.to_string();
                    match tokio::time::timeout(job_timeout, handler.handle(job)).await {
                        Ok(Ok(())) => tracing::debug!(job = %label, "job finished"),
                        Ok(Err(e)) => tracing::error!(job = %label, error = %e, "job failed"),
                        Err(_) => tracing::warn!(
                            job = %label,
                            timeout_secs = job_timeout.as_secs(),
                            "job timed out and was abandoned"
                        ),
                    }
                });
            }
        })
    }
}

/// Holds a job's concurrency permit and its slot in the in-flight count
struct JobGuard {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<watch::Sender<usize>>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}
