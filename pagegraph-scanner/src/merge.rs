use crate::stages::{forward, or_cancel};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Fans several streams into one. Each input keeps its own order; the
/// output closes after every input has closed.
pub(crate) fn merge<T: Send + 'static>(
    inputs: Vec<mpsc::Receiver<T>>,
    cancel: CancellationToken,
    capacity: usize,
) -> (mpsc::Receiver<T>, Vec<JoinHandle<()>>) {
    let (tx, rx) = mpsc::channel(capacity);

    let handles = inputs
        .into_iter()
        .map(|mut input| {
            let tx = tx.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                while let Some(Some(item)) = or_cancel(&cancel, input.recv()).await {
                    if !forward(&cancel, &tx, item).await {
                        break;
                    }
                }
            })
        })
        .collect();

    (rx, handles)
}
