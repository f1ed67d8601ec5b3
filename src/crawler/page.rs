mod html_document;
mod page_fetcher;

pub use html_document::HtmlDocument;
pub use page_fetcher::PageFetcher;
