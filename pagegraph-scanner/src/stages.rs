use crate::filter::SkipFilter;
use crate::inflight::InFlight;
use crate::result::CrawlTarget;
use crate::visited::VisitedSet;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Runs `fut` unless `cancel` fires first. Cancellation wins ties.
pub(crate) async fn or_cancel<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Sends `item` downstream. `false` means the stage should stop, either
/// because of cancellation or because the receiver is gone.
pub(crate) async fn forward<T>(cancel: &CancellationToken, tx: &mpsc::Sender<T>, item: T) -> bool {
    matches!(or_cancel(cancel, tx.send(item)).await, Some(Ok(())))
}

/// Forwards each URL the first time it is seen and drops every repeat.
pub(crate) fn spawn_dedup(
    mut input: mpsc::UnboundedReceiver<CrawlTarget>,
    visited: VisitedSet,
    in_flight: InFlight,
    cancel: CancellationToken,
    capacity: usize,
) -> (mpsc::Receiver<CrawlTarget>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);

    let handle = tokio::spawn(async move {
        while let Some(Some(target)) = or_cancel(&cancel, input.recv()).await {
            if !visited.add(&target.url) {
                trace!("Already visited {}", target.url);
                in_flight.complete();
                continue;
            }
            if !forward(&cancel, &tx, target).await {
                break;
            }
        }
        debug!("Dedup stage stopped");
    });

    (rx, handle)
}

/// Drops targets matched by the skip filter and targets out of depth budget.
pub(crate) fn spawn_filter(
    mut input: mpsc::Receiver<CrawlTarget>,
    filter: SkipFilter,
    in_flight: InFlight,
    cancel: CancellationToken,
    capacity: usize,
) -> (mpsc::Receiver<CrawlTarget>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);

    let handle = tokio::spawn(async move {
        while let Some(Some(target)) = or_cancel(&cancel, input.recv()).await {
            if target.is_exhausted() || filter.should_skip(&target.url) {
                trace!("Skipping {} (depth {})", target.url, target.depth);
                in_flight.complete();
                continue;
            }
            if !forward(&cancel, &tx, target).await {
                break;
            }
        }
        debug!("Filter stage stopped");
    });

    (rx, handle)
}
