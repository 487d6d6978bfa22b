use crate::config::CrawlConfig;
use crate::error::ScanError;
use crate::fetcher::Fetcher;
use crate::inflight::InFlight;
use crate::merge::merge;
use crate::result::{CrawlOutcome, CrawlTarget, Edge, FetchedPage, unique_links};
use crate::stages::{spawn_dedup, spawn_filter};
use crate::visited::{TitleIndex, VisitedSet};
use crate::worker::spawn_workers;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Called with `(worker_id, url)` whenever a worker starts a fetch.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    progress_callback: Option<ProgressCallback>,
}

/// Orchestrator-side state of one crawl.
struct Frontier {
    inject: Option<mpsc::UnboundedSender<CrawlTarget>>,
    in_flight: InFlight,
    titles: TitleIndex,
    raw_edges: Vec<Edge>,
    pages_fetched: usize,
}

impl Frontier {
    fn push(&self, targets: Vec<CrawlTarget>) {
        let Some(inject) = &self.inject else {
            return;
        };
        self.in_flight.add(targets.len());
        for target in targets {
            if inject.send(target).is_err() {
                self.in_flight.complete();
            }
        }
    }

    fn absorb(&mut self, page: FetchedPage) {
        if page.is_failed() {
            debug!("No title or links for {}", page.url);
        }
        let links = unique_links(page.links);
        self.titles.record(&page.url, &page.title);
        self.raw_edges
            .extend(links.iter().map(|link| Edge::new(page.url.as_str(), link.as_str())));
        self.pages_fetched += 1;

        if page.depth >= 0 {
            let depth = page.depth - 1;
            self.push(links.into_iter().map(|link| CrawlTarget::new(link, depth)).collect());
        }

        // children are counted before the page retires
        self.in_flight.complete();
    }
}

impl Crawler {
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            fetcher,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawls from the configured start URL and returns title-to-title edges.
    ///
    /// Returns when the frontier is exhausted or `cancel` fires. In the latter
    /// case the edges cover only the pages fetched so far.
    pub async fn crawl(&self, cancel: CancellationToken) -> Vec<Edge> {
        self.run(cancel).await.edges
    }

    pub async fn run(&self, cancel: CancellationToken) -> CrawlOutcome {
        let config = &self.config;
        info!(
            "Starting crawl of {} (depth {}) with {} workers",
            config.start_url, config.max_depth, config.concurrency
        );

        let pipeline = cancel.child_token();
        let visited = VisitedSet::new();
        let in_flight = InFlight::new();
        let capacity = config.channel_capacity;

        let (inject_tx, inject_rx) = mpsc::unbounded_channel();
        let (deduped, dedup_handle) = spawn_dedup(
            inject_rx,
            visited.clone(),
            in_flight.clone(),
            pipeline.clone(),
            capacity,
        );
        let (filtered, filter_handle) = spawn_filter(
            deduped,
            config.skip_filter.clone(),
            in_flight.clone(),
            pipeline.clone(),
            capacity,
        );
        let pool = spawn_workers(
            filtered,
            config.concurrency,
            self.fetcher.clone(),
            self.progress_callback.clone(),
            pipeline.clone(),
            capacity,
        );
        let (mut pages, merge_handles) = merge(pool.outputs, pipeline.clone(), capacity);

        let mut frontier = Frontier {
            inject: Some(inject_tx),
            in_flight: in_flight.clone(),
            titles: TitleIndex::new(),
            raw_edges: Vec::new(),
            pages_fetched: 0,
        };
        frontier.push(vec![CrawlTarget::new(config.start_url.clone(), config.max_depth)]);

        let mut cancelled = false;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Crawl cancelled after {} pages", frontier.pages_fetched);
                    cancelled = true;
                    break;
                }
                _ = in_flight.drained(), if frontier.inject.is_some() => {
                    debug!("Frontier exhausted, closing pipeline");
                    // dropping the last sender closes every stage in turn
                    frontier.inject = None;
                }
                next = pages.recv() => match next {
                    Some(page) => frontier.absorb(page),
                    None => break,
                },
            }
        }

        pipeline.cancel();
        frontier.inject = None;
        drop(pages);

        let handles = [dedup_handle, filter_handle]
            .into_iter()
            .chain(pool.handles)
            .chain(merge_handles);
        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!("{}", ScanError::from(e));
            }
        }

        let edges = reconcile(&frontier.raw_edges, &frontier.titles);
        info!(
            "Crawl complete. Fetched {} pages, {} of {} edges resolved",
            frontier.pages_fetched,
            edges.len(),
            frontier.raw_edges.len()
        );

        CrawlOutcome {
            edges,
            pages_fetched: frontier.pages_fetched,
            urls_seen: visited.len(),
            raw_edges: frontier.raw_edges.len(),
            cancelled,
        }
    }
}

/// Rewrites raw URL edges into title edges, dropping any edge with an end
/// that has no title.
pub fn reconcile(raw_edges: &[Edge], titles: &TitleIndex) -> Vec<Edge> {
    raw_edges.iter().filter_map(|edge| titles.resolve(edge)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SkipFilter;
    use crate::testing::StaticFetcher;
    use std::collections::HashSet;
    use std::time::Duration;

    const A: &str = "https://wiki.test/A";
    const B: &str = "https://wiki.test/B";
    const C: &str = "https://wiki.test/C";
    const D: &str = "https://wiki.test/D";

    fn crawler(fetcher: &Arc<StaticFetcher>, depth: i32, workers: usize) -> Crawler {
        let config = CrawlConfig::new(A, depth).unwrap().with_concurrency(workers);
        Crawler::new(config, fetcher.clone())
    }

    async fn run_to_end(crawler: &Crawler) -> CrawlOutcome {
        tokio::time::timeout(Duration::from_secs(5), crawler.run(CancellationToken::new()))
            .await
            .expect("crawl should terminate on its own")
    }

    #[tokio::test]
    async fn test_failed_page_drops_incoming_edges() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page(A, "Alpha", &[B, B, C])
                .page(B, "Beta", &[]),
        );

        let outcome = run_to_end(&crawler(&fetcher, 2, 4)).await;

        assert_eq!(outcome.edges, vec![Edge::new("Alpha", "Beta")]);
        // A->B and A->C; the duplicate B link is collapsed
        assert_eq!(outcome.raw_edges, 2);
        assert_eq!(outcome.pages_fetched, 3);
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn test_zero_depth_fetches_only_start() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page(A, "Alpha", &[B, C])
                .page(B, "Beta", &[])
                .page(C, "Gamma", &[]),
        );

        let outcome = run_to_end(&crawler(&fetcher, 0, 2)).await;

        assert!(outcome.edges.is_empty());
        assert_eq!(fetcher.calls(), vec![A.to_string()]);
        assert_eq!(outcome.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_depth_bounds_hops_from_start() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page(A, "Alpha", &[B])
                .page(B, "Beta", &[C])
                .page(C, "Gamma", &[D])
                .page(D, "Delta", &[]),
        );

        let outcome = run_to_end(&crawler(&fetcher, 1, 3)).await;

        let called: HashSet<String> = fetcher.calls().into_iter().collect();
        assert_eq!(called, HashSet::from([A.to_string(), B.to_string()]));
        assert_eq!(outcome.edges, vec![Edge::new("Alpha", "Beta")]);
    }

    #[tokio::test]
    async fn test_cycles_fetch_each_page_once() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page(A, "Alpha", &[B, C])
                .page(B, "Beta", &[A, C])
                .page(C, "Gamma", &[A, B]),
        );

        let outcome = run_to_end(&crawler(&fetcher, 10, 4)).await;

        let mut calls = fetcher.calls();
        calls.sort();
        assert_eq!(calls, vec![A.to_string(), B.to_string(), C.to_string()]);
        assert_eq!(outcome.urls_seen, 3);
        assert_eq!(outcome.edges.len(), 6);
        let unique: HashSet<Edge> = outcome.edges.iter().cloned().collect();
        assert_eq!(unique.len(), 6);
    }

    #[tokio::test]
    async fn test_skipped_urls_never_reach_workers() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page(A, "Alpha", &[B, "https://wiki.test/Special:Random", "https://other.test/X"])
                .page(B, "Beta", &[])
                .page("https://wiki.test/Special:Random", "Random", &[])
                .page("https://other.test/X", "X", &[]),
        );
        let filter = SkipFilter::new()
            .with_predicate(|url| !url.starts_with("https://wiki.test/"))
            .with_predicate(|url| url.contains("Special:"));
        let config = CrawlConfig::new(A, 3).unwrap().with_skip_filter(filter);

        let outcome = run_to_end(&Crawler::new(config, fetcher.clone())).await;

        let mut calls = fetcher.calls();
        calls.sort();
        assert_eq!(calls, vec![A.to_string(), B.to_string()]);
        assert_eq!(outcome.edges, vec![Edge::new("Alpha", "Beta")]);
        assert_eq!(outcome.raw_edges, 3);
    }

    #[tokio::test]
    async fn test_failed_start_page_yields_no_edges() {
        let fetcher = Arc::new(StaticFetcher::new());

        let outcome = run_to_end(&crawler(&fetcher, 3, 2)).await;

        assert!(outcome.edges.is_empty());
        assert_eq!(outcome.pages_fetched, 1);
        assert_eq!(fetcher.calls(), vec![A.to_string()]);
    }

    #[tokio::test]
    async fn test_wide_fan_out_with_small_channels() {
        let children: Vec<String> = (0..200).map(|i| format!("https://wiki.test/P{}", i)).collect();
        let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
        let mut fetcher = StaticFetcher::new().page(A, "Alpha", &child_refs);
        for (i, child) in children.iter().enumerate() {
            // every child links back to the start and to its neighbour
            let next = &children[(i + 1) % children.len()];
            fetcher = fetcher.page(child, &format!("Page {}", i), &[A, next.as_str()]);
        }
        let fetcher = Arc::new(fetcher);
        let config = CrawlConfig::new(A, 2)
            .unwrap()
            .with_concurrency(3)
            .with_channel_capacity(1);

        let outcome = run_to_end(&Crawler::new(config, fetcher.clone())).await;

        assert_eq!(fetcher.calls().len(), 201);
        assert_eq!(outcome.edges.len(), 200 + 200 * 2);
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_fetch() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page(A, "Alpha", &[B, C])
                .page(B, "Beta", &[])
                .page(C, "Gamma", &[]),
        );
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let count_clone = count.clone();
        let crawler = crawler(&fetcher, 1, 2).with_progress_callback(Arc::new(move |_, _| {
            count_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }));

        run_to_end(&crawler).await;

        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancel_returns_partial_result() {
        let children: Vec<String> = (1..=10).map(|i| format!("https://wiki.test/P{}", i)).collect();
        let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
        let mut fetcher = StaticFetcher::new()
            .page(A, "Alpha", &child_refs)
            .page(&children[0], "One", &[]);
        for child in &children[1..] {
            fetcher = fetcher.hang(child);
        }
        let fetcher = Arc::new(fetcher);
        let crawler = crawler(&fetcher, 1, 3);
        let cancel = CancellationToken::new();

        let run = {
            let cancel = cancel.clone();
            async move { crawler.run(cancel).await }
        };
        let trigger = async {
            // all workers stuck means A and P1 have already been handed back
            while fetcher.stalled() < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        };

        let (outcome, ()) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(run, trigger)
        })
        .await
        .expect("cancelled crawl should return promptly");

        assert!(outcome.cancelled);
        assert_eq!(outcome.pages_fetched, 2);
        assert_eq!(outcome.edges, vec![Edge::new("Alpha", "One")]);
        // in-flight fetches were dropped with their workers
        assert_eq!(fetcher.stalled(), 0);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let fetcher = Arc::new(StaticFetcher::new().page(A, "Alpha", &[B]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let edges = tokio::time::timeout(Duration::from_secs(5), crawler(&fetcher, 2, 2).crawl(cancel))
            .await
            .unwrap();

        assert!(edges.is_empty());
    }

    #[test]
    fn test_reconcile_keeps_raw_order() {
        let titles = TitleIndex::new();
        titles.record(A, "Alpha");
        titles.record(B, "Beta");
        titles.record(C, "Gamma");
        let raw = vec![
            Edge::new(A, C),
            Edge::new(A, D),
            Edge::new(B, A),
            Edge::new(A, B),
        ];

        assert_eq!(
            reconcile(&raw, &titles),
            vec![
                Edge::new("Alpha", "Gamma"),
                Edge::new("Beta", "Alpha"),
                Edge::new("Alpha", "Beta"),
            ]
        );
    }
}
