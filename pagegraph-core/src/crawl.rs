use crate::wiki::{article_prefix, default_namespaces};
use indicatif::{ProgressBar, ProgressStyle};
use pagegraph_scanner::config::default_concurrency;
use pagegraph_scanner::filter::{namespace_prefixes, outside_prefix};
use pagegraph_scanner::{CrawlConfig, CrawlOutcome, Crawler, HttpFetcher, SkipFilter};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub start_url: String,
    pub max_depth: i32,
    pub threads: usize,
    pub timeout_secs: u64,
    /// Only URLs starting with this prefix are crawled.
    pub scope_prefix: Option<String>,
    /// Namespaces under `scope_prefix` that are skipped.
    pub skip_namespaces: Vec<String>,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    /// Wiki defaults: depth 1, scoped to the start page's `/wiki/` prefix.
    pub fn new(start_url: impl Into<String>) -> Self {
        let start_url = start_url.into();
        let scope_prefix = article_prefix(&start_url);
        Self {
            start_url,
            max_depth: 1,
            threads: default_concurrency(),
            timeout_secs: 10,
            scope_prefix,
            skip_namespaces: default_namespaces(),
            show_progress_bars: true,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Skip rules for the given options. Without a scope prefix nothing is skipped.
pub fn build_skip_filter(options: &CrawlOptions) -> SkipFilter {
    let mut filter = SkipFilter::new();
    if let Some(ref prefix) = options.scope_prefix {
        filter.push(Arc::new(outside_prefix(prefix.clone())));
        if !options.skip_namespaces.is_empty() {
            filter.push(Arc::new(namespace_prefixes(prefix, &options.skip_namespaces)));
        }
    }
    filter
}

/// Execute a crawl with the given options
/// Returns the crawl outcome, partial if `cancel` fired
pub async fn execute_crawl(
    options: CrawlOptions,
    cancel: CancellationToken,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlOutcome, String> {
    let skip_filter = build_skip_filter(&options);
    let CrawlOptions {
        start_url,
        max_depth,
        threads,
        timeout_secs,
        show_progress_bars,
        ..
    } = options;

    let fetcher = HttpFetcher::with_timeout(timeout_secs)
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;
    let config = CrawlConfig::new(&start_url, max_depth)
        .map_err(|e| e.to_string())?
        .with_concurrency(threads)
        .with_skip_filter(skip_filter);
    debug!("Crawl config: {:?}", config);

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let requested = Arc::new(AtomicUsize::new(0));
    let pb_clone = progress_bar.clone();
    let count_clone = requested.clone();
    let crawler = Crawler::new(config, Arc::new(fetcher)).with_progress_callback(Arc::new(
        move |_worker_id: usize, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            let path = extract_url_path(&url);
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Crawling... {} pages requested ({})", count, path));
            }
            if let Some(ref callback) = progress_callback {
                callback(path);
            }
        },
    ));

    let outcome = crawler.run(cancel).await;

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    Ok(outcome)
}

/// Human-readable summary of a finished crawl
pub fn generate_crawl_summary(outcome: &CrawlOutcome) -> String {
    let mut summary = String::new();
    summary.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    summary.push_str("# Summary:\n");
    if outcome.cancelled {
        summary.push_str("  Crawl cancelled, result is partial\n");
    }
    summary.push_str(&format!("  Pages fetched: {}\n", outcome.pages_fetched));
    summary.push_str(&format!("  URLs seen: {}\n", outcome.urls_seen));
    summary.push_str(&format!("  Links found: {}\n", outcome.raw_edges));
    summary.push_str(&format!("  Edges written: {}\n", outcome.edges.len()));
    summary.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    summary
}
