use crate::crawler::crawl_error::ExtractionError;
use crate::crawler::fetcher::Document;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use url::Url;

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    url: Url,
    body: Vec<u8>,
}

impl HtmlDocument {
    pub fn new(url: Url, body: Vec<u8>) -> Self {
        Self { url, body }
    }

    fn collect_links(&self, html_text: &str) -> Vec<String> {
        let document = scraper::Html::parse_document(html_text);
        let link_selector = match scraper::Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return Vec::new(),
        };

        let mut links = Vec::new();
        for element in document.select(&link_selector) {
            if let Some(link) = element.value().attr("href") {
                if link.starts_with('#')
                    || link.starts_with("mailto:")
                    || link.starts_with("javascript:")
                    || link.starts_with("tel:")
                {
                    continue;
                }
                if let Ok(link_url) = self.url.join(link) {
                    links.push(link_url.to_string());
                }
            }
        }
        links
    }
}

impl Document for HtmlDocument {
    fn extract_links(&self) -> BoxStream<'_, Result<String, ExtractionError>> {
        // `scraper::Html` is not `Send`, so parsing happens up front and only
        // the collected links are streamed.
        match std::str::from_utf8(&self.body) {
            Ok(html_text) => stream::iter(self.collect_links(html_text).into_iter().map(Ok)).boxed(),
            Err(e) => stream::once(async move { Err::<String, _>(ExtractionError::from(e)) }).boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn links_of(base: &str, html: &str) -> Vec<Result<String, ExtractionError>> {
        let document = HtmlDocument::new(Url::parse(base).unwrap(), html.as_bytes().to_vec());
        document.extract_links().collect().await
    }

    #[tokio::test]
    async fn resolves_links_in_document_order() {
        let html = r#"<html><body>
            <a href="/docs">Docs</a>
            <a href="https://other.example/page">Other</a>
            <a href="sibling.html">Sibling</a>
        </body></html>"#;
        let links = links_of("https://site.example/dir/index.html", html)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect::<Vec<_>>();
        assert_eq!(
            links,
            vec![
                "https://site.example/docs".to_string(),
                "https://other.example/page".to_string(),
                "https://site.example/dir/sibling.html".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn skips_fragment_and_non_http_links() {
        let html = r##"<a href="#top">Top</a>
            <a href="mailto:someone@site.example">Mail</a>
            <a href="javascript:void(0)">Script</a>
            <a href="tel:+15555550100">Phone</a>
            <a>No href</a>
            <a href="/kept">Kept</a>"##;
        let links = links_of("https://site.example/", html).await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_ref().unwrap(), "https://site.example/kept");
    }

    #[tokio::test]
    async fn keeps_duplicate_links() {
        let html = r#"<a href="/a">1</a><a href="/a">2</a>"#;
        let links = links_of("https://site.example/", html).await;
        assert_eq!(links.len(), 2);
    }

    #[tokio::test]
    async fn invalid_utf8_body_yields_extraction_error() {
        let document = HtmlDocument::new(
            Url::parse("https://site.example/").unwrap(),
            vec![0x3c, 0x61, 0xff, 0xfe],
        );
        let links = document.extract_links().collect::<Vec<_>>().await;
        assert_eq!(links.len(), 1);
        assert!(matches!(links[0], Err(ExtractionError::InvalidEncoding(_))));
    }
}
