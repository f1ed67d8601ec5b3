use crate::crawler::crawl_error::UrlError;
use std::collections::HashMap;

/// Outcome of one `crawl` call. A URL appears in at most one of
/// `downloaded` and `errors`.
#[derive(Debug, Default)]
pub struct CrawlResult {
    downloaded: Vec<String>,
    errors: HashMap<String, UrlError>,
}

impl CrawlResult {
    /// Successfully fetched URLs, in the order their fetches completed.
    pub fn downloaded(&self) -> &[String] {
        &self.downloaded
    }

    pub fn errors(&self) -> &HashMap<String, UrlError> {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.downloaded.is_empty() && self.errors.is_empty()
    }

    pub(crate) fn add_downloaded(&mut self, url: String) {
        self.downloaded.push(url);
    }

    pub(crate) fn add_error(&mut self, url: String, error: UrlError) {
        self.errors.insert(url, error);
    }
}
