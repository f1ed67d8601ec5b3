use crate::crawler::crawl_error::{CrawlError, FetchError, UrlError};
use crate::crawler::crawl_result::CrawlResult;
use crate::crawler::crawler_config::CrawlerConfig;
use crate::crawler::fetcher::{Document, Fetcher};
use crate::crawler::host_throttle::HostThrottle;
use crate::crawler::seed::{CrawlContext, WorkUnit};
use crate::crawler::worker_pool::WorkerPool;
use anyhow::anyhow;
use futures::{FutureExt, StreamExt};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Depth-limited crawler with separate download and extraction pools.
///
/// Clones share the same pools, host throttle and shutdown signal.
#[derive(Clone)]
pub struct Crawler {
    shared: Arc<Shared>,
    shutdown_token: CancellationToken,
}

/// Everything a job needs, shared across crawls for the crawler's lifetime.
struct Shared {
    fetcher: Arc<dyn Fetcher>,
    host_throttle: HostThrottle,
    download_pool: WorkerPool,
    extract_pool: WorkerPool,
}

impl Crawler {
    /// Must be called from within a tokio runtime; the pool workers are
    /// spawned immediately.
    pub fn new(fetcher: Arc<dyn Fetcher>, config: CrawlerConfig) -> Self {
        let shutdown_token = CancellationToken::new();
        let shared = Shared {
            fetcher,
            host_throttle: HostThrottle::new(config.per_host_limit()),
            download_pool: WorkerPool::new(
                "download",
                config.download_workers(),
                shutdown_token.clone(),
            ),
            extract_pool: WorkerPool::new(
                "extract",
                config.extract_workers(),
                shutdown_token.clone(),
            ),
        };
        Self {
            shared: Arc::new(shared),
            shutdown_token,
        }
    }

    pub fn with_limits(
        fetcher: Arc<dyn Fetcher>,
        download_workers: usize,
        extract_workers: usize,
        per_host_limit: usize,
    ) -> Result<Self, CrawlError> {
        let config = CrawlerConfig::new(download_workers, extract_workers, per_host_limit)?;
        Ok(Self::new(fetcher, config))
    }

    /// Fetches `seed` and follows links until `depth` fetch hops are used up.
    ///
    /// Per-URL failures are reported inside the returned `CrawlResult`. An
    /// `Err` means the crawl itself could not run or was interrupted by
    /// `shutdown` while waiting.
    pub async fn crawl(&self, seed: &str, depth: usize) -> Result<CrawlResult, CrawlError> {
        if depth == 0 {
            return Err(CrawlError::InvalidDepth);
        }
        if self.shutdown_token.is_cancelled() {
            return Err(CrawlError::ShutDown);
        }

        info!("Crawling {} to depth {}", seed, depth);
        let context = Arc::new(CrawlContext::new());
        context.visited().insert(seed);
        self.shared.submit_download(&context, seed.to_string(), depth);

        // Shutdown wins over completion: jobs abandoned by a stopping pool
        // also bring the tracker to zero.
        select! {
            biased;
            _ = self.shutdown_token.cancelled() => {
                warn!("Crawl of {} interrupted by shutdown", seed);
                return Err(CrawlError::Interrupted);
            }
            _ = context.tracker().wait_for_zero() => {}
        }

        let result = context.results().take().await;
        info!(
            "Finished crawling {}: {} downloaded, {} errors",
            seed,
            result.downloaded().len(),
            result.errors().len()
        );
        Ok(result)
    }

    /// Stops both pools. Queued jobs are abandoned and running jobs are left
    /// to finish unobserved; a `crawl` still waiting returns `Interrupted`.
    pub fn shutdown(&self) {
        if !self.shutdown_token.is_cancelled() {
            info!("Shutting down crawler");
        }
        self.shared.download_pool.shutdown();
        self.shared.extract_pool.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }
}

impl Shared {
    fn submit_download(self: &Arc<Self>, context: &Arc<CrawlContext>, url: String, depth: usize) {
        let unit = context.tracker().register();
        let shared = Arc::clone(self);
        let job_context = Arc::clone(context);
        let job = async move { shared.download(&job_context, url, depth, unit).await }.boxed();
        if let Err(e) = self.download_pool.submit(job) {
            debug!("Download not scheduled: {}", e);
        }
    }

    fn submit_extract(
        self: &Arc<Self>,
        context: &Arc<CrawlContext>,
        document: Box<dyn Document>,
        depth: usize,
    ) {
        let unit = context.tracker().register();
        let shared = Arc::clone(self);
        let job_context = Arc::clone(context);
        let job = async move { shared.extract(&job_context, document, depth, unit).await }.boxed();
        if let Err(e) = self.extract_pool.submit(job) {
            debug!("Extraction not scheduled: {}", e);
        }
    }

    async fn download(
        self: &Arc<Self>,
        context: &Arc<CrawlContext>,
        url: String,
        depth: usize,
        unit: WorkUnit,
    ) {
        let host = match host_of(&url) {
            Ok(host) => host,
            Err(error) => {
                warn!("Skipping {}: {}", url, error);
                context.results().record_error(&url, error).await;
                drop(unit);
                return;
            }
        };

        let permit = match self.host_throttle.acquire(&host).await {
            Ok(permit) => permit,
            Err(e) => {
                let error = UrlError::Fetch(FetchError::Other(anyhow!(e)));
                context.results().record_error(&url, error).await;
                drop(unit);
                return;
            }
        };

        debug!("Downloading {} (depth {})", url, depth);
        let fetched = match AssertUnwindSafe(self.fetcher.fetch(&url)).catch_unwind().await {
            Ok(fetched) => fetched,
            Err(_) => Err(FetchError::Other(anyhow!("Fetcher panicked"))),
        };
        drop(permit);

        match fetched {
            Ok(document) => {
                context.results().record_download(&url).await;
                if depth > 1 {
                    self.submit_extract(context, document, depth - 1);
                }
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                context.results().record_error(&url, UrlError::Fetch(e)).await;
            }
        }
        drop(unit);
    }

    async fn extract(
        self: &Arc<Self>,
        context: &Arc<CrawlContext>,
        document: Box<dyn Document>,
        depth: usize,
        unit: WorkUnit,
    ) {
        let mut links = document.extract_links();
        while let Some(link) = links.next().await {
            match link {
                Ok(link) => {
                    if context.visited().insert(&link) {
                        self.submit_download(context, link, depth);
                    }
                }
                Err(e) => {
                    debug!("Link extraction stopped early: {}", e);
                    break;
                }
            }
        }
        drop(unit);
    }
}

fn host_of(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::MalformedUrl {
        reason: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| UrlError::MalformedUrl {
            reason: format!("no host in {}", url),
        })
}
