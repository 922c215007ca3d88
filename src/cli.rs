// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is described by Rust structs and
// enums, and clap generates the parsing, --help and --version for us.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{
    DEFAULT_DELAY_SECS, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::extract::DEFAULT_CONTENT_MARKER;
use crate::sink::ExportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "news-crawler",
    version,
    about = "Crawl a news site and save its articles to CSV or JSON",
    long_about = "news-crawler follows the internal links of a site up to a maximum depth, \
                  extracts the headline and paragraphs of every article page it visits, \
                  and saves them as a table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site and export the articles found
    ///
    /// Example: news-crawler crawl https://www.thedailystar.net --max-depth 2
    Crawl {
        /// Base URL of the site; internal links are resolved against it
        base_url: String,

        /// How many link hops to follow from the base URL (0 = base page only)
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Seconds to wait between two requests (fractions allowed)
        #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
        delay: f64,

        /// File the articles are written to
        #[arg(short, long, default_value = "news_data.csv")]
        output: PathBuf,

        /// Output format (default: inferred from the output extension, CSV otherwise)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// URLs containing this text are treated as article pages
        #[arg(long, default_value = DEFAULT_CONTENT_MARKER)]
        marker: String,

        /// Maximum number of requests in flight at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// User-Agent header sent with every request
        #[arg(long, default_value = DEFAULT_USER_AGENT)]
        user_agent: String,

        /// Print the crawl summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fetch a single page and print what would be extracted from it
    ///
    /// Example: news-crawler extract https://example.com/news/today
    Extract {
        /// Page to fetch
        url: String,

        /// Base URL for resolving links (default: the page URL itself)
        #[arg(long)]
        base_url: Option<String>,

        /// URLs containing this text are treated as article pages
        #[arg(long, default_value = DEFAULT_CONTENT_MARKER)]
        marker: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
}
