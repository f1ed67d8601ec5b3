pub mod crawler;

pub use crawler::{
    CrawlError, CrawlResult, Crawler, CrawlerConfig, Document, ExtractionError, FetchError,
    Fetcher, HtmlDocument, PageFetcher, UrlError,
};
