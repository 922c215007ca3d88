// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, controlled by RUST_LOG, written to stderr)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated crawl settings
mod crawl; // src/crawl/ - frontier, rate limiter, crawler
mod extract; // src/extract/ - content records and link discovery
mod fetch; // src/fetch/ - HTTP fetching
mod sink; // src/sink/ - record storage and export

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;

use cli::{Cli, Commands};
use config::CrawlConfig;
use crawl::{CancelHandle, CrawlSummary, Crawler};
use extract::Extractor;
use fetch::{Fetcher, HttpFetcher};
use sink::{ExportFormat, ExportStatus, RecordSink};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so that --json output on stdout stays parseable.
// Default level is info; RUST_LOG=debug shows link discovery details.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            base_url,
            max_depth,
            delay,
            output,
            format,
            marker,
            concurrency,
            timeout,
            user_agent,
            json,
        } => {
            let config = CrawlConfig::new(&base_url, max_depth, delay)?
                .with_content_marker(marker)
                .with_concurrency(concurrency)?
                .with_request_timeout(Duration::from_secs(timeout))
                .with_user_agent(user_agent);

            handle_crawl(config, output, format, json).await
        }
        Commands::Extract {
            url,
            base_url,
            marker,
            timeout,
        } => handle_extract(&url, base_url.as_deref(), &marker, timeout).await,
    }
}

// Handles the 'crawl' subcommand
//
// The crawl itself never fails: unreachable pages are logged and skipped.
// Only writing the output file can turn into an error here.
async fn handle_crawl(
    config: CrawlConfig,
    output: PathBuf,
    format: Option<ExportFormat>,
    json: bool,
) -> Result<i32> {
    if !json {
        println!("🔍 Crawling: {}", config.base_url);
        println!("📊 Max depth: {}, delay: {:?}", config.max_depth, config.delay);
    }

    let fetcher = HttpFetcher::new(config.request_timeout, &config.user_agent)
        .context("could not build HTTP client")?;

    // Ctrl-C: stop dispatching, let in-flight fetches finish, then export
    let cancel = CancelHandle::new();
    let crawler = Crawler::new(config, Arc::new(fetcher)).with_cancel_handle(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight requests");
            cancel.cancel();
        }
    });

    let seed = crawler.config().base_url.clone();
    let mut sink = RecordSink::new();
    let summary = crawler.run(&seed, &mut sink).await;

    print_summary(&summary, json)?;

    let format = format.unwrap_or_else(|| ExportFormat::from_path(&output));
    match sink.export(&output, format)? {
        ExportStatus::Written { path, rows } => {
            if !json {
                println!("💾 Saved {} article(s) to {}", rows, path.display());
            }
        }
        ExportStatus::NothingToExport => {
            if !json {
                println!("⚠️  No articles found, nothing to export");
            }
        }
    }

    Ok(0)
}

// Handles the 'extract' subcommand: one fetch, no crawling, JSON to stdout
async fn handle_extract(
    url: &str,
    base_url: Option<&str>,
    marker: &str,
    timeout: u64,
) -> Result<i32> {
    let page = Url::parse(url).with_context(|| format!("invalid URL '{}'", url))?;
    let base = match base_url {
        Some(base) => Url::parse(base).with_context(|| format!("invalid base URL '{}'", base))?,
        None => page.clone(),
    };

    let fetcher = HttpFetcher::new(Duration::from_secs(timeout), config::DEFAULT_USER_AGENT)
        .context("could not build HTTP client")?;
    let body = fetcher
        .fetch(&page)
        .await
        .with_context(|| format!("failed to fetch {}", page))?;

    let extraction = Extractor::new(base, marker).extract(&page, &body);
    println!("{}", serde_json::to_string_pretty(&extraction)?);

    Ok(0)
}

// Prints the summary either as a table or JSON
fn print_summary(summary: &CrawlSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!();
    println!("{:<8} {:<80}", "DEPTH", "URL");
    println!("{}", "=".repeat(88));
    for entry in &summary.dispatched {
        println!("{:<8} {:<80}", entry.depth, entry.url);
    }
    println!();

    println!("📊 Summary:");
    println!("   📄 Pages fetched: {}", summary.pages_fetched);
    println!("   ❌ Failed: {}", summary.pages_failed);
    println!("   📰 Articles: {}", summary.records);
    if summary.cancelled {
        println!("   ⏹️  Stopped early (interrupted)");
    }

    Ok(())
}
