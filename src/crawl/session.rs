// src/crawl/session.rs
// =============================================================================
// The crawl coordinator.
//
// How a run works:
// 1. The seed goes into a fresh Frontier at depth 0
// 2. While fewer than `concurrency` fetches are in flight, pop the next task
//    from the frontier, log it, and start visiting it
// 3. Visiting = wait for the rate limiter, fetch, tell the limiter the fetch
//    is over (so the next one waits a full delay after it), extract
// 4. When a visit finishes: keep its record (if any) and offer its links to
//    the frontier at depth + 1; a failed fetch is logged and yields no links
// 5. Stop when the frontier is empty and nothing is in flight
//
// Only this coordinator touches the Frontier and the RecordSink, so the
// visited-set check and the dispatch happen in one step without locks. The
// fetches themselves run concurrently through FuturesUnordered. With the
// default concurrency of 1 the crawl is strictly sequential and depth-first.
// =============================================================================

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::cancel::CancelHandle;
use super::frontier::{CrawlTask, Frontier};
use super::limiter::RateLimiter;
use crate::config::CrawlConfig;
use crate::extract::{normalize_url, Extraction, Extractor};
use crate::fetch::{FetchError, Fetcher};
use crate::sink::RecordSink;

// What one visit produced
#[derive(Debug)]
pub enum PageOutcome {
    Fetched { task: CrawlTask, extraction: Extraction },
    Failed { task: CrawlTask, error: FetchError },
}

// One line of the dispatch log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEntry {
    pub url: String,
    pub depth: usize,
}

impl From<&CrawlTask> for DispatchEntry {
    fn from(task: &CrawlTask) -> Self {
        Self {
            url: task.url.as_str().to_string(),
            depth: task.depth,
        }
    }
}

// What a finished run reports back
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlSummary {
    /// Every dispatched URL, in dispatch order
    pub dispatched: Vec<DispatchEntry>,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub records: usize,
    /// True when the run stopped early because it was cancelled
    pub cancelled: bool,
}

// Holds the collaborators of a crawl.
//
// Nothing here changes during a run: the frontier and rate limiter are
// created fresh by every call to run(), so one Crawler can run several
// independent crawls.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    extractor: Extractor,
    cancel: CancelHandle,
}

impl Crawler {
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let extractor = Extractor::new(config.base_url.clone(), config.content_marker.clone());
        Self {
            config,
            fetcher,
            extractor,
            cancel: CancelHandle::new(),
        }
    }

    // Replaces the crawler's cancel handle with one the caller already holds
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    // Crawls from `seed`, storing content records into `sink`.
    //
    // Fetch failures never abort the run; they are counted in the summary.
    pub async fn run(&self, seed: &Url, sink: &mut RecordSink) -> CrawlSummary {
        let mut frontier = Frontier::new(self.config.max_depth);
        let limiter = RateLimiter::new(self.config.delay);
        let mut summary = CrawlSummary::default();
        let mut in_flight = FuturesUnordered::new();

        info!(
            seed = %seed,
            max_depth = self.config.max_depth,
            delay = ?limiter.delay(),
            concurrency = self.config.concurrency.get(),
            "starting crawl"
        );
        frontier.offer(normalize_url(seed.clone()), 0);

        loop {
            while in_flight.len() < self.config.concurrency.get() {
                if self.cancel.is_cancelled() {
                    if !summary.cancelled {
                        warn!(
                            in_flight = in_flight.len(),
                            "crawl cancelled, draining in-flight fetches"
                        );
                    }
                    summary.cancelled = true;
                    break;
                }

                let Some(task) = frontier.next_dispatch() else {
                    break;
                };

                info!(url = %task.url, depth = task.depth, "crawling");
                summary.dispatched.push(DispatchEntry::from(&task));
                in_flight.push(self.visit(task, &limiter));
            }

            let Some(outcome) = in_flight.next().await else {
                break;
            };

            match outcome {
                PageOutcome::Fetched { task, extraction } => {
                    summary.pages_fetched += 1;

                    if let Some(record) = extraction.record {
                        summary.records += 1;
                        sink.record(record);
                    }

                    let found = extraction.links.len();
                    let queued = frontier.offer_links(extraction.links, task.depth + 1);
                    debug!(
                        url = %task.url,
                        found,
                        queued,
                        pending = frontier.pending(),
                        "links discovered"
                    );
                }
                PageOutcome::Failed { task, error } => {
                    summary.pages_failed += 1;
                    warn!(url = %task.url, error = %error, "failed to fetch page");
                }
            }
        }

        info!(
            dispatched = summary.dispatched.len(),
            visited = frontier.visited_count(),
            fetched = summary.pages_fetched,
            failed = summary.pages_failed,
            records = summary.records,
            "crawl finished"
        );

        summary
    }

    // Fetches and extracts one page
    async fn visit(&self, task: CrawlTask, limiter: &RateLimiter) -> PageOutcome {
        limiter.throttle().await;
        let fetched = self.fetcher.fetch(&task.url).await;
        limiter.finished().await;

        match fetched {
            Ok(body) => {
                let extraction = self.extractor.extract(&task.url, &body);
                PageOutcome::Fetched { task, extraction }
            }
            Err(error) => PageOutcome::Failed { task, error },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    // Serves pages from memory and records every request it receives
    #[derive(Default)]
    struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
        cancel_on_fetch: Option<CancelHandle>,
    }

    impl StaticFetcher {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.as_str().to_string());
            if let Some(cancel) = &self.cancel_on_fetch {
                cancel.cancel();
            }
            // Let other in-flight fetches make progress
            tokio::task::yield_now().await;
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or(FetchError::Status(404))
        }
    }

    // Takes `latency` to answer and logs when each fetch started and ended
    struct SlowFetcher {
        inner: StaticFetcher,
        latency: Duration,
        timings: Mutex<Vec<(Instant, Instant)>>,
    }

    #[async_trait]
    impl Fetcher for SlowFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            let start = Instant::now();
            tokio::time::sleep(self.latency).await;
            let body = self.inner.fetch(url).await;
            self.timings.lock().unwrap().push((start, Instant::now()));
            body
        }
    }

    fn config(base: &str, max_depth: usize) -> CrawlConfig {
        CrawlConfig::new(base, max_depth, 0.0).unwrap()
    }

    fn links(paths: &[&str]) -> String {
        paths
            .iter()
            .map(|p| format!(r#"<a href="{p}">{p}</a>"#))
            .collect()
    }

    // A small site with a cycle (/ <-> /news/a) and a chain /news/b -> /c -> /d -> /e
    fn site() -> StaticFetcher {
        StaticFetcher::default()
            .page(
                "https://example.test/",
                &format!("<h1>Home</h1>{}", links(&["/news/a", "/news/b", "/"])),
            )
            .page(
                "https://example.test/news/a",
                &format!("<h1>A</h1><p>alpha</p>{}", links(&["/", "/news/b"])),
            )
            .page(
                "https://example.test/news/b",
                &format!("<p>beta</p>{}", links(&["/c", "/missing"])),
            )
            .page("https://example.test/c", &links(&["/d"]))
            .page("https://example.test/d", &links(&["/e"]))
            .page("https://example.test/e", "<h1>E</h1>")
    }

    async fn crawl(
        fetcher: StaticFetcher,
        config: CrawlConfig,
    ) -> (CrawlSummary, RecordSink, Arc<StaticFetcher>) {
        let fetcher = Arc::new(fetcher);
        let crawler = Crawler::new(config, fetcher.clone());
        let seed = crawler.config().base_url.clone();
        let mut sink = RecordSink::new();
        let summary = crawler.run(&seed, &mut sink).await;
        (summary, sink, fetcher)
    }

    #[tokio::test]
    async fn test_seed_page_scenario() {
        let fetcher = StaticFetcher::default().page(
            "https://example.test/news/index",
            r#"<h1>Headline A</h1><p>First.</p><p>Second.</p><a href="/news/article2">more</a>"#,
        );

        let (summary, sink, _) = crawl(fetcher, config("https://example.test/news/index", 1)).await;

        assert_eq!(sink.len(), 1);
        let record = &sink.records()[0];
        assert_eq!(record.url, "https://example.test/news/index");
        assert_eq!(record.title, "Headline A");
        assert_eq!(record.content, "First.\nSecond.");
        assert_eq!(
            summary.dispatched,
            vec![
                DispatchEntry { url: "https://example.test/news/index".into(), depth: 0 },
                DispatchEntry { url: "https://example.test/news/article2".into(), depth: 1 },
            ]
        );
        // article2 is not served by the stub
        assert_eq!(summary.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_no_url_is_dispatched_twice() {
        let (summary, _, fetcher) = crawl(site(), config("https://example.test/", 10)).await;

        let unique: HashSet<_> = summary.dispatched.iter().map(|e| e.url.clone()).collect();
        assert_eq!(unique.len(), summary.dispatched.len());
        assert_eq!(fetcher.requests().len(), summary.dispatched.len());
    }

    #[tokio::test]
    async fn test_depth_first_order_and_depths() {
        let (summary, _, _) = crawl(site(), config("https://example.test/", 10)).await;

        let order: Vec<(&str, usize)> = summary
            .dispatched
            .iter()
            .map(|e| (e.url.as_str(), e.depth))
            .collect();
        assert_eq!(
            order,
            vec![
                ("https://example.test/", 0),
                ("https://example.test/news/a", 1),
                ("https://example.test/news/b", 2),
                ("https://example.test/c", 3),
                ("https://example.test/d", 4),
                ("https://example.test/e", 5),
                ("https://example.test/missing", 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_depth_bound_is_respected() {
        let (summary, _, fetcher) = crawl(site(), config("https://example.test/", 2)).await;

        assert!(summary.dispatched.iter().all(|e| e.depth <= 2));
        assert!(!fetcher.requests().contains(&"https://example.test/c".to_string()));
        assert_eq!(summary.dispatched.len(), 3);
    }

    #[tokio::test]
    async fn test_zero_depth_fetches_only_the_seed() {
        let (summary, _, fetcher) = crawl(site(), config("https://example.test/", 0)).await;

        assert_eq!(fetcher.requests(), vec!["https://example.test/".to_string()]);
        assert_eq!(summary.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_records_only_for_content_pages() {
        let (summary, sink, _) = crawl(site(), config("https://example.test/", 10)).await;

        let urls: Vec<&str> = sink.records().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.test/news/a", "https://example.test/news/b"]);
        assert_eq!(sink.records()[1].title, "No Title");
        assert_eq!(summary.records, 2);
        // /c has no marker but its link to /d was still followed
        assert!(summary.dispatched.iter().any(|e| e.url == "https://example.test/d"));
    }

    #[tokio::test]
    async fn test_fetch_failures_are_not_fatal() {
        let fetcher = StaticFetcher::default()
            .page("https://example.test/", &links(&["/broken", "/news/ok"]))
            .page("https://example.test/news/ok", "<h1>OK</h1>");

        let (summary, sink, _) = crawl(fetcher, config("https://example.test/", 3)).await;

        assert_eq!(summary.pages_failed, 1);
        assert_eq!(summary.pages_fetched, 2);
        assert_eq!(sink.len(), 1);
        assert!(!summary.cancelled);
    }

    #[tokio::test]
    async fn test_failed_seed_ends_the_run() {
        let (summary, sink, _) =
            crawl(StaticFetcher::default(), config("https://example.test/news", 3)).await;

        assert_eq!(summary.dispatched.len(), 1);
        assert_eq!(summary.pages_failed, 1);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_crawl_visits_each_url_once() {
        let config = config("https://example.test/", 10).with_concurrency(4).unwrap();

        let (summary, sink, fetcher) = crawl(site(), config).await;

        let mut requests = fetcher.requests();
        requests.sort();
        let mut expected = vec![
            "https://example.test/",
            "https://example.test/c",
            "https://example.test/d",
            "https://example.test/e",
            "https://example.test/missing",
            "https://example.test/news/a",
            "https://example.test/news/b",
        ];
        expected.sort();
        assert_eq!(requests, expected);
        assert_eq!(sink.len(), 2);
        assert!(summary.dispatched.iter().all(|e| e.depth <= 10));
    }

    #[tokio::test]
    async fn test_concurrent_crawl_respects_depth_bound() {
        let config = config("https://example.test/", 2).with_concurrency(4).unwrap();

        let (summary, _, fetcher) = crawl(site(), config).await;

        assert!(summary.dispatched.iter().all(|e| e.depth <= 2));
        assert!(!fetcher.requests().contains(&"https://example.test/c".to_string()));
        let unique: HashSet<_> = summary.dispatched.iter().map(|e| e.url.clone()).collect();
        assert_eq!(unique.len(), summary.dispatched.len());
        assert_eq!(fetcher.requests().len(), summary.dispatched.len());
    }

    #[tokio::test]
    async fn test_cancellation_stops_new_dispatches() {
        let cancel = CancelHandle::new();
        let fetcher = Arc::new(StaticFetcher {
            cancel_on_fetch: Some(cancel.clone()),
            ..site()
        });
        let crawler = Crawler::new(config("https://example.test/", 10), fetcher.clone())
            .with_cancel_handle(cancel);
        let seed = crawler.config().base_url.clone();
        let mut sink = RecordSink::new();

        let summary = crawler.run(&seed, &mut sink).await;

        assert!(summary.cancelled);
        assert_eq!(summary.dispatched.len(), 1);
        // The in-flight seed fetch was allowed to finish
        assert_eq!(summary.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_delay_spaces_requests() {
        let config = CrawlConfig::new("https://example.test/", 10, 0.03).unwrap();
        let started = Instant::now();

        let (summary, _, _) = crawl(site(), config).await;

        // Seven fetches, six gaps
        assert_eq!(summary.dispatched.len(), 7);
        assert!(started.elapsed() >= Duration::from_millis(180));
    }

    #[tokio::test]
    async fn test_delay_is_measured_from_the_end_of_each_fetch() {
        let delay = Duration::from_millis(100);
        let fetcher = Arc::new(SlowFetcher {
            inner: StaticFetcher::default()
                .page("https://example.test/", &links(&["/a"]))
                .page("https://example.test/a", &links(&["/b"]))
                .page("https://example.test/b", ""),
            latency: Duration::from_millis(80),
            timings: Mutex::new(Vec::new()),
        });
        let config = CrawlConfig::new("https://example.test/", 5, delay.as_secs_f64()).unwrap();
        let crawler = Crawler::new(config, fetcher.clone());
        let seed = crawler.config().base_url.clone();

        let summary = crawler.run(&seed, &mut RecordSink::new()).await;

        assert_eq!(summary.pages_fetched, 3);
        let timings = fetcher.timings.lock().unwrap().clone();
        assert_eq!(timings.len(), 3);
        for pair in timings.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            assert!(
                next_start.duration_since(prev_end) >= delay,
                "only {:?} between two fetches",
                next_start.duration_since(prev_end)
            );
        }
    }

    #[tokio::test]
    async fn test_runs_are_independent() {
        let fetcher = Arc::new(site());
        let crawler = Crawler::new(config("https://example.test/", 10), fetcher.clone());
        let seed = crawler.config().base_url.clone();

        let mut first = RecordSink::new();
        let mut second = RecordSink::new();
        let a = crawler.run(&seed, &mut first).await;
        let b = crawler.run(&seed, &mut second).await;

        assert_eq!(a.dispatched, b.dispatched);
        assert_eq!(first.records(), second.records());
        assert_eq!(fetcher.requests().len(), 14);
    }
}
