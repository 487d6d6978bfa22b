use crate::result::Edge;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// URLs accepted by the dedup stage during one crawl. Only grows.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as seen. Returns `true` only for the call that inserted it,
    /// so check and insert happen under one lock.
    pub fn add(&self, url: &str) -> bool {
        let mut visited = self.lock();
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Page titles keyed by URL, recorded for every page a worker returned.
/// A failed fetch is stored with an empty title.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, url: &str, title: &str) {
        self.lock().insert(url.to_string(), title.to_string());
    }

    /// Rewrites a raw URL edge into a title edge. `None` when either end was
    /// never fetched or came back without a title.
    pub fn resolve(&self, raw: &Edge) -> Option<Edge> {
        let titles = self.lock();
        let from = titles.get(&raw.from).filter(|t| !t.is_empty())?;
        let to = titles.get(&raw.to).filter(|t| !t.is_empty())?;
        Some(Edge::new(from.as_str(), to.as_str()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
