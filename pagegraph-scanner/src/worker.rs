use crate::crawler::ProgressCallback;
use crate::fetcher::Fetcher;
use crate::result::{CrawlTarget, FetchedPage};
use crate::stages::{forward, or_cancel};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handles and per-worker output streams of a running pool.
pub(crate) struct WorkerPool {
    pub outputs: Vec<mpsc::Receiver<FetchedPage>>,
    pub handles: Vec<JoinHandle<()>>,
}

/// Starts `size` workers pulling from one shared queue. Each worker fetches
/// its targets one at a time and emits a page per target, in order.
pub(crate) fn spawn_workers(
    input: mpsc::Receiver<CrawlTarget>,
    size: usize,
    fetcher: Arc<dyn Fetcher>,
    progress_callback: Option<ProgressCallback>,
    cancel: CancellationToken,
    capacity: usize,
) -> WorkerPool {
    let input = Arc::new(Mutex::new(input));
    let mut outputs = Vec::with_capacity(size);
    let mut handles = Vec::with_capacity(size);

    for worker_id in 0..size {
        let (tx, rx) = mpsc::channel(capacity);
        let input = input.clone();
        let fetcher = fetcher.clone();
        let progress_cb = progress_callback.clone();
        let cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            debug!("Worker {} started", worker_id);

            loop {
                let next = {
                    let mut queue = input.lock().await;
                    or_cancel(&cancel, queue.recv()).await
                };
                let Some(Some(target)) = next else {
                    break;
                };

                // never fetch past the depth budget; treated as a stop signal
                if target.is_exhausted() {
                    debug!("Worker {} received exhausted target {}, stopping", worker_id, target.url);
                    break;
                }

                if let Some(ref callback) = progress_cb {
                    callback(worker_id, target.url.clone());
                }

                let Some(content) = or_cancel(&cancel, fetcher.fetch(&target.url)).await else {
                    break;
                };
                let page = FetchedPage::new(target, content.title, content.links);

                if !forward(&cancel, &tx, page).await {
                    break;
                }
            }

            debug!("Worker {} finished", worker_id);
        });

        outputs.push(rx);
        handles.push(handle);
    }

    WorkerPool { outputs, handles }
}
