use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Counts targets that have been injected but not yet retired.
///
/// A target retires when dedup or filter drops it, or when the orchestrator
/// consumes its fetched page. The first transition to zero fires `drained`;
/// callers must add a page's children before retiring the page.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    count: Arc<AtomicUsize>,
    drained: CancellationToken,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        self.count.fetch_add(n, Ordering::SeqCst);
    }

    pub fn complete(&self) {
        let previous = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.drained.cancel();
        }
    }

    pub fn pending(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn is_drained(&self) -> bool {
        self.drained.is_cancelled()
    }

    /// Resolves once the count has dropped to zero.
    pub async fn drained(&self) {
        self.drained.cancelled().await
    }
}
