use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Caps the number of in-flight fetches per host.
///
/// Semaphores are created on first use of a host and are never removed, so
/// throttling stays in effect across every crawl made by the same crawler.
pub(crate) struct HostThrottle {
    per_host_limit: usize,
    host_semaphores: DashMap<String, Arc<Semaphore>>,
}

/// One unit of a host's concurrency budget. Dropping it releases the permit.
#[derive(Debug)]
pub(crate) struct HostPermit {
    host: String,
    _permit: OwnedSemaphorePermit,
}

impl Drop for HostPermit {
    fn drop(&mut self) {
        debug!("Released permit for host {}", self.host);
    }
}

impl HostThrottle {
    pub fn new(per_host_limit: usize) -> Self {
        Self {
            per_host_limit,
            host_semaphores: DashMap::new(),
        }
    }

    /// Waits until `host` has spare capacity and takes one permit.
    pub async fn acquire(&self, host: &str) -> Result<HostPermit, AcquireError> {
        let semaphore = self.semaphore_for(host);
        let permit = semaphore.acquire_owned().await?;
        debug!("Acquired permit for host {}", host);
        Ok(HostPermit {
            host: host.to_string(),
            _permit: permit,
        })
    }

    #[allow(dead_code)]
    pub fn available_permits(&self, host: &str) -> usize {
        self.host_semaphores
            .get(host)
            .map(|semaphore| semaphore.available_permits())
            .unwrap_or(self.per_host_limit)
    }

    #[allow(dead_code)]
    pub fn hosts_tracked(&self) -> usize {
        self.host_semaphores.len()
    }

    fn semaphore_for(&self, host: &str) -> Arc<Semaphore> {
        // The entry guard holds the shard lock, so concurrent first uses of a
        // host observe the same semaphore.
        self.host_semaphores
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_host_limit)))
            .clone()
    }
}
