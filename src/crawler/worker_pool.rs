use crate::crawler::crawl_error::CrawlError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::select;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub(crate) type Job = BoxFuture<'static, ()>;

/// A fixed number of worker tasks draining one job queue.
///
/// The queue is unbounded: jobs of one pool submit into the other pool, and a
/// bounded queue could leave both pools blocked on each other.
pub(crate) struct WorkerPool {
    name: &'static str,
    job_tx: mpsc::UnboundedSender<Job>,
    shutdown_token: CancellationToken,
}

impl WorkerPool {
    /// Spawns `num_workers` workers on the current tokio runtime.
    pub(crate) fn new(name: &'static str, num_workers: usize, shutdown_token: CancellationToken) -> Self {
        let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        for worker_index in 0..num_workers {
            tokio::task::spawn(Self::run_worker(
                name,
                worker_index,
                Arc::clone(&job_rx),
                shutdown_token.clone(),
            ));
        }
        debug!("Started {} pool with {} worker(s)", name, num_workers);
        Self {
            name,
            job_tx,
            shutdown_token,
        }
    }

    /// Queues `job`. A rejected job is dropped without being polled.
    pub(crate) fn submit(&self, job: Job) -> Result<(), CrawlError> {
        if self.shutdown_token.is_cancelled() {
            return Err(CrawlError::PoolClosed(self.name));
        }
        self.job_tx
            .send(job)
            .map_err(|_| CrawlError::PoolClosed(self.name))
    }

    /// Stops every worker sharing this pool's token. Jobs still queued are
    /// dropped once the last worker exits; running jobs finish on their own.
    pub(crate) fn shutdown(&self) {
        self.shutdown_token.cancel();
    }

    async fn run_worker(
        name: &'static str,
        worker_index: usize,
        job_rx: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
        shutdown_token: CancellationToken,
    ) {
        loop {
            let job = select! {
                biased;
                _ = shutdown_token.cancelled() => None,
                job = async { job_rx.lock().await.recv().await } => job,
            };
            match job {
                Some(job) => {
                    // A panicking job must not take its worker down with it.
                    if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                        warn!("{} worker {} recovered from a panicking job", name, worker_index);
                    }
                }
                None => break,
            }
        }
        debug!("{} worker {} stopped", name, worker_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn runs_at_most_num_workers_jobs_at_once() {
        let pool = WorkerPool::new("test", 3, CancellationToken::new());
        let running = Arc::new(AtomicUsize::new(0));
        let max_running = Arc::new(AtomicUsize::new(0));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        for _ in 0..12 {
            let running = Arc::clone(&running);
            let max_running = Arc::clone(&max_running);
            let done_tx = done_tx.clone();
            pool.submit(
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    max_running.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    let _ = done_tx.send(());
                }
                .boxed(),
            )
            .unwrap();
        }
        for _ in 0..12 {
            done_rx.recv().await.unwrap();
        }
        assert!(max_running.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn worker_survives_panicking_job() {
        let pool = WorkerPool::new("test", 1, CancellationToken::new());
        pool.submit(async { panic!("job failed"); }.boxed()).unwrap();

        let (done_tx, done_rx) = oneshot::channel::<()>();
        pool.submit(
            async move {
                let _ = done_tx.send(());
            }
            .boxed(),
        )
        .unwrap();

        tokio::time::timeout(Duration::from_secs(1), done_rx)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_rejected_and_job_dropped() {
        let pool = WorkerPool::new("test", 1, CancellationToken::new());
        pool.shutdown();

        let (tx, rx) = oneshot::channel::<()>();
        let result = pool.submit(
            async move {
                let _ = tx.send(());
            }
            .boxed(),
        );
        assert!(matches!(result, Err(CrawlError::PoolClosed("test"))));
        // The sender was dropped along with the job, never sent.
        assert!(rx.await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_abandons_queued_jobs() {
        let pool = WorkerPool::new("test", 1, CancellationToken::new());
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let (started_tx, started_rx) = oneshot::channel::<()>();
        pool.submit(
            async move {
                let _ = started_tx.send(());
                let _ = release_rx.await;
            }
            .boxed(),
        )
        .unwrap();
        started_rx.await.unwrap();

        let (queued_tx, queued_rx) = oneshot::channel::<()>();
        pool.submit(
            async move {
                let _ = queued_tx.send(());
            }
            .boxed(),
        )
        .unwrap();

        pool.shutdown();
        release_tx.send(()).unwrap();

        let queued = tokio::time::timeout(Duration::from_secs(1), queued_rx)
            .await
            .unwrap();
        assert!(queued.is_err());
    }
}
