use clap::Parser;
use rusty_crawler::{Crawler, CrawlerConfig, PageFetcher};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineArgs {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum number of fetch hops, counting the seed
    #[arg(default_value_t = 1)]
    depth: usize,

    /// Number of concurrent downloads
    #[arg(default_value_t = 1)]
    downloads: usize,

    /// Number of concurrent link extractions
    #[arg(default_value_t = 1)]
    extractors: usize,

    /// Maximum concurrent downloads per host
    #[arg(default_value_t = 1)]
    per_host: usize,
}

async fn main_impl(args: &CommandLineArgs) -> anyhow::Result<()> {
    let crawler_config = CrawlerConfig::new(args.downloads, args.extractors, args.per_host)?;
    let crawler = Crawler::new(Arc::new(PageFetcher::new()), crawler_config);

    {
        let crawler = crawler.clone();
        ctrlc::set_handler(move || {
            eprintln!("Received Ctrl+C, shutting down...");
            crawler.shutdown();
        })?;
    }

    let crawl_result = crawler.crawl(&args.url, args.depth).await;
    crawler.shutdown();
    let crawl_result = crawl_result?;

    println!("Downloaded {} page(s):", crawl_result.downloaded().len());
    for url in crawl_result.downloaded() {
        println!("    {}", url);
    }

    if !crawl_result.errors().is_empty() {
        println!("Errors ({}):", crawl_result.errors().len());
        let mut errors = crawl_result.errors().iter().collect::<Vec<_>>();
        errors.sort_by(|lhs, rhs| lhs.0.cmp(rhs.0));
        for (url, error) in errors {
            println!("    {}: {}", url, error);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLineArgs::parse();

    if let Err(e) = main_impl(&args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
