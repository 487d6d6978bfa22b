use crate::fetcher::{Fetcher, PageContent};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory fetcher for pipeline tests. Unknown URLs fail; URLs marked with
/// `hang` never complete.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, PageContent>,
    hanging: HashSet<String>,
    calls: Mutex<Vec<String>>,
    stalled: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, title: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            PageContent {
                title: title.to_string(),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    pub fn hang(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Fetches currently blocked on a hanging URL.
    pub fn stalled(&self) -> usize {
        self.stalled.load(Ordering::SeqCst)
    }
}

struct StallGuard(Arc<AtomicUsize>);

impl StallGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for StallGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> PageContent {
        self.calls.lock().unwrap().push(url.to_string());

        if self.hanging.contains(url) {
            let _guard = StallGuard::new(self.stalled.clone());
            std::future::pending::<()>().await;
        }

        self.pages.get(url).cloned().unwrap_or_default()
    }
}
