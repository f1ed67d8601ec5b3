use crate::crawler::crawl_error::FetchError;
use crate::crawler::fetcher::{Document, Fetcher};
use crate::crawler::page::HtmlDocument;
use anyhow::anyhow;
use tracing::debug;
use url::Url;

/// Fetches HTML pages over HTTP(S).
#[derive(Clone, Default)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Fetcher for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Document>, FetchError> {
        let url_to_fetch =
            Url::parse(url).map_err(|e| FetchError::Other(anyhow!("Invalid URL {}: {}", url, e)))?;

        let response = self.client.get(url_to_fetch.clone()).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let content_type_str = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        let content_type: mime::Mime = content_type_str.parse()?;
        match (content_type.type_(), content_type.subtype()) {
            (mime::TEXT, mime::HTML) => {}
            _ => {
                debug!("Skipping non-HTML content type {} at {}", content_type, url);
                return Err(FetchError::UnsupportedContentType(content_type_str));
            }
        }

        // Links are resolved against the final URL so redirects keep relative
        // links pointing at the right place.
        let base_url = response.url().clone();
        let body = response.bytes().await?;
        Ok(Box::new(HtmlDocument::new(base_url, body.to_vec())))
    }
}
