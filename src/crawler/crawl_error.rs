/// Errors that end a whole `crawl` call or reject crawler construction.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("Invalid crawler configuration: {0}")]
    InvalidConfig(String),

    #[error("Crawl depth must be at least 1")]
    InvalidDepth,

    #[error("Crawler has been shut down")]
    ShutDown,

    #[error("Interrupted while waiting for the crawl to complete")]
    Interrupted,

    #[error("Worker pool '{0}' is no longer accepting jobs")]
    PoolClosed(&'static str),
}

/// Failure reported by a `Fetcher` for a single URL.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP Error Status Code = {0}")]
    HttpStatus(u16),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    MimeParse(#[from] mime::FromStrError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure while pulling links out of an already fetched document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Document body is not valid UTF-8")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Per-URL failure recorded in a `CrawlResult`.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("Malformed URL: {reason}")]
    MalformedUrl { reason: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl UrlError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, UrlError::MalformedUrl { .. })
    }
}
