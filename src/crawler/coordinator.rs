//! Crawler coordinator - main crawl orchestration logic
//!
//! A run seeds the frontier with the start URL, spawns a fixed pool of
//! workers, and waits for the frontier to drain. Each worker loops:
//! - Dequeue a job (waiting while others may still queue work)
//! - Claim its URL against the visited set and the page budget
//! - Fetch, parse, sink the text, classify links, queue children
//!
//! Per-job failures, panics included, stop at the worker loop. The run
//! itself always returns a stats snapshot, annotated with an error if the
//! pool could not finish cleanly.

use crate::config::{Config, RunLimits};
use crate::crawler::classifier::LinkClassifier;
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::frontier::{Claim, CrawlJob, Frontier};
use crate::crawler::parser::{DocumentParser, HtmlDocumentParser};
use crate::output::{CrawlStats, FileTextSink, NullSink, PageTextSink, StatsSnapshot};
use crate::robots::RobotsPolicy;
use crate::state::JobOutcome;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::CensusError;
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use url::Url;

/// Configured crawl, ready to run once
pub struct Crawler {
    limits: RunLimits,
    transport: Arc<dyn HttpTransport>,
    robots: Option<Arc<RobotsPolicy>>,
    parser: Arc<dyn DocumentParser>,
    sink: Arc<dyn PageTextSink>,
}

/// State shared by every worker of one run
struct CrawlContext {
    limits: RunLimits,
    frontier: Frontier,
    stats: Mutex<CrawlStats>,
    fetcher: PageFetcher,
    classifier: LinkClassifier,
    parser: Arc<dyn DocumentParser>,
    sink: Arc<dyn PageTextSink>,
}

impl CrawlContext {
    fn stats(&self) -> std::sync::MutexGuard<'_, CrawlStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Crawler {
    /// Creates a crawler with the HTML parser and no text sink
    pub fn new(limits: RunLimits, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            limits,
            transport,
            robots: None,
            parser: Arc::new(HtmlDocumentParser::new()),
            sink: Arc::new(NullSink),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn PageTextSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Uses an existing robots policy instead of one built from the limits
    pub fn with_robots(mut self, robots: Arc<RobotsPolicy>) -> Self {
        self.robots = Some(robots);
        self
    }

    /// Runs the crawl to completion and returns the final statistics
    pub async fn run(self) -> StatsSnapshot {
        let started_at = Utc::now();
        let robots = self.robots.unwrap_or_else(|| {
            Arc::new(RobotsPolicy::from_limits(self.transport.clone(), &self.limits))
        });
        let fetcher = PageFetcher::new(self.transport, robots, &self.limits);

        let ctx = Arc::new(CrawlContext {
            frontier: Frontier::new(self.limits.max_pages()),
            stats: Mutex::new(CrawlStats::new()),
            fetcher,
            classifier: LinkClassifier::from_limits(&self.limits),
            parser: self.parser,
            sink: self.sink,
            limits: self.limits,
        });

        tracing::info!(
            "Starting crawl of {} from {} (max {} pages, depth {}, {} workers)",
            ctx.limits.target_domain(),
            ctx.limits.start_url(),
            ctx.limits.max_pages(),
            ctx.limits.max_depth(),
            ctx.limits.concurrency()
        );

        let error = match AssertUnwindSafe(drive(ctx.clone())).catch_unwind().await {
            Ok(Ok(())) => None,
            Ok(Err(message)) => Some(message),
            Err(panic) => Some(format!("crawl aborted: {}", panic_message(&*panic))),
        };

        if let Err(e) = ctx.sink.flush().await {
            tracing::warn!("Failed to flush page text sink: {}", e);
        }

        let mut snapshot = ctx.stats().snapshot();
        snapshot.started_at = Some(started_at);
        snapshot.finished_at = Some(Utc::now());
        snapshot.error = error;

        match &snapshot.error {
            None => tracing::info!(
                "Crawl {}: {} pages, {} links, {} broken, {} robots hosts",
                ctx.frontier.run_state(),
                snapshot.total_pages,
                snapshot.total_links,
                snapshot.broken_pages,
                ctx.fetcher.robots().cached_hosts()
            ),
            Some(error) => tracing::error!(
                "Crawl ended early after {} pages: {}",
                snapshot.total_pages,
                error
            ),
        }

        snapshot
    }
}

/// Seeds the frontier, runs the worker pool, and waits for it to drain
async fn drive(ctx: Arc<CrawlContext>) -> Result<(), String> {
    ctx.frontier.seed(ctx.limits.start_url().as_str());

    let mut workers = JoinSet::new();
    for worker_id in 0..ctx.limits.concurrency() {
        workers.spawn(worker_loop(ctx.clone(), worker_id));
    }

    // Workers return once the frontier is empty with nothing in flight
    while let Some(result) = workers.join_next().await {
        if let Err(e) = result {
            tracing::error!("Worker task failed: {}", e);
        }
    }

    match ctx.frontier.pending() {
        0 => Ok(()),
        pending => Err(format!("{} jobs left unprocessed", pending)),
    }
}

async fn worker_loop(ctx: Arc<CrawlContext>, worker_id: usize) {
    while let Some(job) = ctx.frontier.next().await {
        match AssertUnwindSafe(process(&ctx, &job)).catch_unwind().await {
            Ok(outcome) => {
                tracing::debug!(
                    "[worker {}] {} (depth {}): {}",
                    worker_id,
                    job.url,
                    job.depth,
                    outcome
                );
            }
            Err(panic) => {
                tracing::error!(
                    "[worker {}] Panic while processing {}: {}",
                    worker_id,
                    job.url,
                    panic_message(&*panic)
                );
            }
        }
        // Dropping `job` marks it done
    }
}

/// Processes one job end to end
async fn process(ctx: &CrawlContext, job: &CrawlJob) -> JobOutcome {
    let slot = match ctx.frontier.claim(&job.url).await {
        Claim::Granted(slot) => slot,
        Claim::AlreadyVisited => return JobOutcome::SkippedVisited,
        Claim::BudgetExhausted => return JobOutcome::SkippedBudget,
    };

    let url = match Url::parse(&job.url) {
        Ok(url) => url,
        Err(e) => {
            let error = FetchError::InvalidUrl(e.to_string());
            record_fetch_failure(ctx, &job.url, &error);
            return error.outcome();
        }
    };

    let html = match ctx.fetcher.fetch(&url).await {
        Ok(html) => html,
        Err(error) => {
            record_fetch_failure(ctx, &job.url, &error);
            return error.outcome();
        }
    };

    let document = ctx.parser.parse(&url, &html).unwrap_or_else(|e| {
        tracing::warn!("Failed to parse {}: {}", url, e);
        Default::default()
    });

    slot.commit();
    tracing::info!(
        "Processed {} (depth {}, {} links){}",
        url,
        job.depth,
        document.links.len(),
        document
            .title
            .as_deref()
            .map(|t| format!(": {}", t))
            .unwrap_or_default()
    );

    if !document.text.is_empty() {
        if let Err(e) = ctx.sink.write_page(url.as_str(), &document.text).await {
            tracing::warn!("Failed to write text for {}: {}", url, e);
        }
    }

    let classified = {
        let mut stats = ctx.stats();
        stats.record_page(ctx.classifier.is_internal_url(&url));
        ctx.classifier
            .classify(&url, job.depth, &document.links, &mut stats, |candidate| {
                ctx.frontier.is_known(candidate)
            })
    };

    tracing::debug!(
        "{}: {} to follow, {} not followed, {} files, {} external, {} unresolved",
        url,
        classified.follow.len(),
        classified.out_of_scope,
        classified.files,
        classified.external,
        classified.unresolved
    );

    let children = classified
        .follow
        .into_iter()
        .filter(|child| ctx.frontier.push(child.clone()))
        .count();

    if children > 0 {
        JobOutcome::Expanded { children }
    } else {
        JobOutcome::Leaf
    }
}

fn record_fetch_failure(ctx: &CrawlContext, url: &str, error: &FetchError) {
    if error.counts_as_broken() {
        tracing::warn!("Broken page {}: {}", url, error);
        ctx.stats().record_broken(url);
    } else if matches!(error, FetchError::RobotsDenied) {
        tracing::warn!("Skipping {}: {}", url, error);
    } else {
        tracing::debug!("Skipping {}: {}", url, error);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Runs a crawl described by `config` over the network
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(StatsSnapshot)` - The crawl ran; see `error` for a partial run
/// * `Err(CensusError)` - The configuration, HTTP client or sink could not
///   be set up
///
/// # Example
///
/// ```no_run
/// use web_census::config::load_config;
/// use web_census::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("census.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} pages", stats.total_pages);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<StatsSnapshot, CensusError> {
    let limits = RunLimits::from_config(&config)?;
    let transport = ReqwestTransport::from_config(&config.user_agent, limits.max_body_bytes())?;
    let mut crawler = Crawler::new(limits, Arc::new(transport));

    if let Some(path) = config.output.text_log() {
        tracing::info!("Writing page text to {}", path);
        crawler = crawler.with_sink(Arc::new(FileTextSink::open(path).await?));
    }

    Ok(crawler.run().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::parser::{ParseError, ParsedDocument};
    use crate::output::MemorySink;
    use crate::transport::stub::StubTransport;
    use crate::transport::{HttpResponse, TransportError};
    use std::time::Duration;

    fn limits(max_pages: usize, max_depth: u32, concurrency: usize) -> RunLimits {
        let mut config = Config::new("x.edu");
        config.crawler.max_pages = max_pages;
        config.crawler.max_depth = max_depth;
        config.crawler.concurrency = concurrency;
        config.crawler.request_delay = 0.0;
        RunLimits::from_config(&config).unwrap()
    }

    fn page(links: &[&str]) -> HttpResponse {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
            .collect();
        HttpResponse::html(format!("<html><body><p>Page</p>{}</body></html>", anchors))
    }

    #[tokio::test]
    async fn test_depth_limited_crawl() {
        let stub = Arc::new(
            StubTransport::new()
                .page(
                    "https://x.edu/",
                    page(&["/a", "/b", "https://other.org/", "/syllabus.pdf"]),
                )
                .page("https://x.edu/a", page(&["/c"]))
                .page("https://x.edu/b", page(&["/c"])),
        );

        let stats = Crawler::new(limits(100, 1, 2), stub.clone()).run().await;

        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.internal_pages, 3);
        assert_eq!(stats.files.pdf, 1);
        assert_eq!(stats.files.unique, vec!["https://x.edu/syllabus.pdf"]);
        assert_eq!(stats.external_links.total, 1);
        assert_eq!(stats.external_links.unique, vec!["other.org"]);
        assert_eq!(stats.subdomains, vec!["x.edu"]);
        assert_eq!(stats.broken_pages, 0);
        assert!(stats.error.is_none());
        // Depth-1 pages are not expanded
        assert_eq!(stub.calls_to("https://x.edu/c"), 0);
        // Files and external links are never fetched
        assert_eq!(stub.calls_to("https://x.edu/syllabus.pdf"), 0);
        assert_eq!(stub.calls_to("https://other.org/"), 0);
    }

    #[tokio::test]
    async fn test_page_budget_of_one() {
        let stub = Arc::new(
            StubTransport::new()
                .page("https://x.edu/", page(&["/p1", "/p2", "/p3", "/p4", "/p5"]))
                .page("https://x.edu/p1", page(&[]))
                .page("https://x.edu/p2", page(&[]))
                .page("https://x.edu/p3", page(&[]))
                .page("https://x.edu/p4", page(&[]))
                .page("https://x.edu/p5", page(&[])),
        );

        let stats = Crawler::new(limits(1, 3, 4), stub.clone()).run().await;

        assert_eq!(stats.total_pages, 1);
        assert_eq!(stats.total_links, 5);
        assert!(stats.error.is_none());
        assert_eq!(
            stub.calls(),
            vec!["https://x.edu/robots.txt", "https://x.edu/"]
        );
    }

    #[tokio::test]
    async fn test_unreachable_seed() {
        let stub = Arc::new(StubTransport::new().fail(
            "https://x.edu/",
            TransportError::Connect("connection refused".to_string()),
        ));

        let stats = Crawler::new(limits(10, 3, 2), stub).run().await;

        assert_eq!(stats.total_pages, 0);
        assert_eq!(stats.broken_pages, 1);
        assert_eq!(stats.error_links, vec!["https://x.edu/"]);
        assert!(stats.error.is_none());
        assert!(stats.finished_at >= stats.started_at);
    }

    #[tokio::test]
    async fn test_broken_pages_are_recorded_once() {
        let stub = Arc::new(
            StubTransport::new()
                .page("https://x.edu/", page(&["/gone", "/gone", "/ok"]))
                .page("https://x.edu/ok", page(&["/gone"])),
        );

        let stats = Crawler::new(limits(10, 3, 3), stub.clone()).run().await;

        assert_eq!(stats.total_pages, 2);
        assert_eq!(stats.broken_pages, 1);
        assert_eq!(stats.error_links, vec!["https://x.edu/gone"]);
        assert_eq!(stub.calls_to("https://x.edu/gone"), 1);
    }

    #[tokio::test]
    async fn test_robots_denied_pages_are_skipped() {
        let stub = Arc::new(
            StubTransport::new()
                .page(
                    "https://x.edu/robots.txt",
                    HttpResponse::text("User-agent: *\nDisallow: /private"),
                )
                .page("https://x.edu/", page(&["/private/grades", "/public"]))
                .page("https://x.edu/private/grades", page(&[]))
                .page("https://x.edu/public", page(&[])),
        );

        let stats = Crawler::new(limits(10, 3, 2), stub.clone()).run().await;

        assert_eq!(stats.total_pages, 2);
        assert_eq!(stats.broken_pages, 0);
        assert_eq!(stub.calls_to("https://x.edu/private/grades"), 0);
        assert_eq!(stub.calls_to("https://x.edu/robots.txt"), 1);
    }

    #[tokio::test]
    async fn test_non_html_pages_do_not_count() {
        let stub = Arc::new(
            StubTransport::new()
                .page("https://x.edu/", page(&["/feed"]))
                .page("https://x.edu/feed", HttpResponse::text("plain")),
        );

        let stats = Crawler::new(limits(10, 3, 2), stub.clone()).run().await;

        assert_eq!(stats.total_pages, 1);
        assert_eq!(stats.broken_pages, 0);
        assert_eq!(stub.calls_to("https://x.edu/feed"), 1);
    }

    #[tokio::test]
    async fn test_text_is_sunk_per_page() {
        let stub = Arc::new(
            StubTransport::new()
                .page("https://x.edu/", page(&["/empty"]))
                .page("https://x.edu/empty", HttpResponse::html("<html></html>")),
        );
        let sink = Arc::new(MemorySink::new());

        let stats = Crawler::new(limits(10, 3, 2), stub)
            .with_sink(sink.clone())
            .run()
            .await;

        assert_eq!(stats.total_pages, 2);
        // Pages without text are not written
        assert_eq!(
            sink.records(),
            vec![("https://x.edu/".to_string(), "Page\n/empty".to_string())]
        );
    }

    struct PanickingParser;

    impl DocumentParser for PanickingParser {
        fn parse(&self, url: &Url, html: &str) -> Result<ParsedDocument, ParseError> {
            if url.path() == "/boom" {
                panic!("parser exploded");
            }
            HtmlDocumentParser::new().parse(url, html)
        }
    }

    #[tokio::test]
    async fn test_panicking_job_is_isolated() {
        let stub = Arc::new(
            StubTransport::new()
                .page("https://x.edu/", page(&["/boom", "/ok"]))
                .page("https://x.edu/boom", page(&["/hidden"]))
                .page("https://x.edu/ok", page(&[])),
        );

        let stats = Crawler::new(limits(10, 3, 2), stub.clone())
            .with_parser(Arc::new(PanickingParser))
            .run()
            .await;

        assert!(stats.error.is_none());
        assert_eq!(stats.total_pages, 2);
        assert_eq!(stub.calls_to("https://x.edu/ok"), 1);
        assert_eq!(stub.calls_to("https://x.edu/hidden"), 0);
    }

    struct FailingParser;

    impl DocumentParser for FailingParser {
        fn parse(&self, url: &Url, _html: &str) -> Result<ParsedDocument, ParseError> {
            Err(ParseError::Document {
                url: url.to_string(),
                message: "unreadable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_parser_failure_counts_page_without_links() {
        let stub = Arc::new(StubTransport::new().page("https://x.edu/", page(&["/a"])));

        let stats = Crawler::new(limits(10, 3, 2), stub.clone())
            .with_parser(Arc::new(FailingParser))
            .run()
            .await;

        assert_eq!(stats.total_pages, 1);
        assert_eq!(stats.total_links, 0);
        assert_eq!(stub.calls_to("https://x.edu/a"), 0);
    }

    #[tokio::test]
    async fn test_budget_holds_under_concurrency() {
        let hrefs: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
        let links: Vec<&str> = hrefs.iter().map(String::as_str).collect();

        let mut stub = StubTransport::new()
            .with_latency(Duration::from_millis(5))
            .page("https://x.edu/", page(&links));
        for href in &hrefs {
            stub = stub.page(&format!("https://x.edu{}", href), page(&links));
        }
        let stub = Arc::new(stub);

        let stats = Crawler::new(limits(7, 5, 8), stub.clone()).run().await;

        assert_eq!(stats.total_pages, 7);
        assert!(stats.internal_pages <= stats.total_pages);
        assert!(stats.error.is_none());
        for href in &hrefs {
            assert!(stub.calls_to(&format!("https://x.edu{}", href)) <= 1);
        }
        assert_eq!(stub.calls_to("https://x.edu/"), 1);
    }

    #[tokio::test]
    async fn test_every_page_fetched_once_in_a_mesh() {
        let hrefs: Vec<String> = (0..12).map(|i| format!("/m{}", i)).collect();
        let links: Vec<&str> = hrefs.iter().map(String::as_str).collect();

        let mut stub = StubTransport::new()
            .with_latency(Duration::from_millis(2))
            .page("https://x.edu/", page(&links));
        for href in &hrefs {
            stub = stub.page(&format!("https://x.edu{}", href), page(&links));
        }
        let stub = Arc::new(stub);

        let stats = Crawler::new(limits(100, 5, 6), stub.clone()).run().await;

        assert_eq!(stats.total_pages, 13);
        for href in &hrefs {
            assert_eq!(stub.calls_to(&format!("https://x.edu{}", href)), 1);
        }
    }
}
