use crate::crawler::crawl_error::UrlError;
use crate::crawler::crawl_result::CrawlResult;
use crate::crawler::seed::completion_tracker::CompletionTracker;
use dashmap::DashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// URLs already scheduled for download during one crawl.
#[derive(Debug, Default)]
pub(crate) struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the caller that inserted `url` first.
    pub fn insert(&self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }
}

/// Collects downloads and per-URL failures as jobs finish.
#[derive(Debug, Default)]
pub(crate) struct ResultAggregator {
    result: Mutex<CrawlResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_download(&self, url: &str) {
        self.result.lock().await.add_downloaded(url.to_string());
    }

    pub async fn record_error(&self, url: &str, error: UrlError) {
        self.result.lock().await.add_error(url.to_string(), error);
    }

    /// Moves everything recorded so far out of the aggregator.
    pub async fn take(&self) -> CrawlResult {
        std::mem::take(&mut *self.result.lock().await)
    }
}

/// State owned by a single `crawl` call and shared by its jobs.
#[derive(Debug)]
pub(crate) struct CrawlContext {
    visited: VisitedSet,
    results: ResultAggregator,
    tracker: Arc<CompletionTracker>,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self {
            visited: VisitedSet::new(),
            results: ResultAggregator::new(),
            tracker: CompletionTracker::new(),
        }
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn results(&self) -> &ResultAggregator {
        &self.results
    }

    pub fn tracker(&self) -> &Arc<CompletionTracker> {
        &self.tracker
    }
}
