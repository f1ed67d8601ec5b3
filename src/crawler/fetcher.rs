use crate::crawler::crawl_error::{ExtractionError, FetchError};
use futures::stream::BoxStream;

/// Retrieves the document behind a URL.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Document>, FetchError>;
}

/// A fetched page that can be asked for its outbound links.
pub trait Document: Send + Sync {
    /// Lazily yields the document's links in order. The stream is finite and
    /// may end early with an `Err`; nothing after an `Err` is consumed.
    fn extract_links(&self) -> BoxStream<'_, Result<String, ExtractionError>>;
}
