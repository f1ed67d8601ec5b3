mod crawl_error;
mod crawl_result;
mod crawler_config;
mod fetcher;
mod host_throttle;
mod page;
mod seed;
mod web_crawler;
mod worker_pool;

pub use crawl_error::{CrawlError, ExtractionError, FetchError, UrlError};
pub use crawl_result::CrawlResult;
pub use crawler_config::CrawlerConfig;
pub use fetcher::{Document, Fetcher};
pub use page::{HtmlDocument, PageFetcher};
pub use web_crawler::Crawler;
