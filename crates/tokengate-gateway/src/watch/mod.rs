//! Background watch: change batches -> debounce -> one `TokenStore::reload`.
//!
//! The task owns the only reload trigger besides the initial load. The first
//! non-empty batch opens a debounce window; every batch that lands inside the
//! window is absorbed, and when it closes the store reloads exactly once.

pub mod source;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::store::TokenStore;

pub use source::{ChangeSource, ChannelSource, NotifySource, PollingDirSource};

/// Start the watch task on the current runtime. The store reports
/// `is_watching` from here until the task ends.
pub fn spawn<S>(
    store: Arc<TokenStore>,
    source: S,
    debounce: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    S: ChangeSource + 'static,
{
    store.set_watching(true);
    tokio::spawn(run_watch(store, source, debounce, cancel))
}

enum Window {
    Elapsed,
    SourceFailed(tokengate_core::TokenGateError),
    Cancelled,
}

async fn run_watch<S: ChangeSource>(
    store: Arc<TokenStore>,
    mut source: S,
    debounce: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        path = %store.path().display(),
        debounce_ms = debounce.as_millis() as u64,
        "token list watch started"
    );

    loop {
        let batch = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            b = source.next_batch() => b,
        };

        let mut changed = match batch {
            Ok(b) if b.is_empty() => continue,
            Ok(b) => b.len(),
            Err(e) => {
                tracing::warn!(error = %e, "token list watch failed, live reload disabled");
                break;
            }
        };

        let deadline = Instant::now() + debounce;
        let window = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Window::Cancelled,
                _ = tokio::time::sleep_until(deadline) => break Window::Elapsed,
                b = source.next_batch() => match b {
                    Ok(b) => changed += b.len(),
                    Err(e) => break Window::SourceFailed(e),
                },
            }
        };

        if let Window::Cancelled = window {
            break;
        }

        tracing::debug!(changed, "token list directory changed, reloading");
        let s = Arc::clone(&store);
        match tokio::task::spawn_blocking(move || s.reload()).await {
            Ok(outcome) => tracing::debug!(?outcome, "token list reload finished"),
            Err(e) => tracing::error!(error = %e, "token list reload task failed"),
        }

        if let Window::SourceFailed(e) = window {
            tracing::warn!(error = %e, "token list watch failed, live reload disabled");
            break;
        }
    }

    store.set_watching(false);
    tracing::info!("token list watch stopped");
}
