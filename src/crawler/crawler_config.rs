use crate::crawler::crawl_error::CrawlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlerConfig {
    download_workers: usize,
    extract_workers: usize,
    per_host_limit: usize,
}

impl CrawlerConfig {
    pub fn new(
        download_workers: usize,
        extract_workers: usize,
        per_host_limit: usize,
    ) -> Result<Self, CrawlError> {
        if download_workers == 0 {
            return Err(CrawlError::InvalidConfig(
                "download_workers must be at least 1".to_string(),
            ));
        }
        if extract_workers == 0 {
            return Err(CrawlError::InvalidConfig(
                "extract_workers must be at least 1".to_string(),
            ));
        }
        if per_host_limit == 0 {
            return Err(CrawlError::InvalidConfig(
                "per_host_limit must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            download_workers,
            extract_workers,
            per_host_limit,
        })
    }

    pub fn download_workers(&self) -> usize {
        self.download_workers
    }

    pub fn extract_workers(&self) -> usize {
        self.extract_workers
    }

    pub fn per_host_limit(&self) -> usize {
        self.per_host_limit
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            download_workers: 1,
            extract_workers: 1,
            per_host_limit: 1,
        }
    }
}
