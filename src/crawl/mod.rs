// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Features:
// - Depth-first traversal from a seed, bounded by max_depth
// - Each URL fetched at most once per run (visited set in the Frontier)
// - Minimum delay between requests (RateLimiter)
// - Optional concurrent fetches, still deduplicated by one coordinator
// - Cancellation that lets in-flight fetches finish
//
// Submodules:
// - frontier: visited set, depth bound and work stack
// - limiter: spacing between requests
// - cancel: run-level cancellation handle
// - session: the Crawler that ties everything together
// =============================================================================

mod cancel;
mod frontier;
mod limiter;
mod session;

pub use cancel::CancelHandle;
pub use session::{CrawlSummary, Crawler};
