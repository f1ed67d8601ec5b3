use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts outstanding jobs of one crawl.
///
/// Every job holds a `WorkUnit`; a producer must register its successor's unit
/// before submitting the successor, otherwise the count could touch zero while
/// work is still being handed over.
#[derive(Debug, Default)]
pub(crate) struct CompletionTracker {
    outstanding: AtomicUsize,
    zero_notify: Notify,
}

/// A registered unit of work. Dropping it deregisters the unit.
#[derive(Debug)]
pub(crate) struct WorkUnit {
    tracker: Arc<CompletionTracker>,
}

impl CompletionTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(self: &Arc<Self>) -> WorkUnit {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        WorkUnit {
            tracker: Arc::clone(self),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Resolves once no registered unit remains.
    pub async fn wait_for_zero(&self) {
        loop {
            let notified = self.zero_notify.notified();
            tokio::pin!(notified);
            // Enable before the check so an `arrive` racing with it is not lost.
            notified.as_mut().enable();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn arrive(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.zero_notify.notify_waiters();
        }
    }
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        self.tracker.arrive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_returns_immediately_when_nothing_registered() {
        let tracker = CompletionTracker::new();
        tokio::time::timeout(Duration::from_secs(1), tracker.wait_for_zero())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dropping_units_counts_down() {
        let tracker = CompletionTracker::new();
        let first = tracker.register();
        let second = tracker.register();
        assert_eq!(tracker.outstanding(), 2);
        drop(first);
        assert_eq!(tracker.outstanding(), 1);
        drop(second);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn waiter_wakes_after_chained_handover() {
        let tracker = CompletionTracker::new();
        let seed = tracker.register();

        // Each step registers the next unit before releasing its own.
        let chain = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move {
                let mut current = seed;
                for _ in 0..100 {
                    let next = tracker.register();
                    tokio::task::yield_now().await;
                    drop(current);
                    current = next;
                }
                drop(current);
            })
        };

        tokio::time::timeout(Duration::from_secs(5), tracker.wait_for_zero())
            .await
            .unwrap();
        assert_eq!(tracker.outstanding(), 0);
        chain.await.unwrap();
    }
}
