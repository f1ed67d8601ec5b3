mod completion_tracker;
mod crawl_context;

pub(crate) use completion_tracker::WorkUnit;
pub(crate) use crawl_context::CrawlContext;
