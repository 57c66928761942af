//! Change sources: where "something changed under this directory" comes from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use tokengate_core::error::{Result, TokenGateError};

/// Delivers batches of changed paths. The store does not care which path
/// changed, only that a non-empty batch arrived.
#[async_trait]
pub trait ChangeSource: Send {
    async fn next_batch(&mut self) -> Result<Vec<PathBuf>>;
}

/// Capacity of the event channel between the watcher thread and the task.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Filesystem change events for one directory (non-recursive), delivered by
/// the platform watcher (inotify, FSEvents, ReadDirectoryChangesW).
///
/// Watching the directory rather than the file catches editors and tools that
/// replace the file via rename.
pub struct NotifySource {
    // dropping the watcher stops event delivery
    _watcher: RecommendedWatcher,
    events: ChannelSource,
}

impl NotifySource {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let (tx, events) = ChannelSource::new(EVENT_CHANNEL_CAPACITY);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            // our own reads show up as access events
            Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
            Ok(event) => {
                // a full channel already holds a pending batch, which reloads anyway
                let _ = tx.try_send(event.paths);
            }
            Err(e) => tracing::warn!(error = %e, "token list watch event error"),
        })
        .map_err(|e| TokenGateError::WatchProvider(format!("create watcher failed: {e}")))?;

        watcher.watch(dir, RecursiveMode::NonRecursive).map_err(|e| {
            TokenGateError::WatchProvider(format!("watch {} failed: {e}", dir.display()))
        })?;

        Ok(Self {
            _watcher: watcher,
            events,
        })
    }
}

#[async_trait]
impl ChangeSource for NotifySource {
    async fn next_batch(&mut self) -> Result<Vec<PathBuf>> {
        self.events.next_batch().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

type DirState = BTreeMap<PathBuf, FileStamp>;

/// Scans a directory at a fixed interval and reports entries that were
/// added, removed, or changed size/mtime since the previous scan.
///
/// Fallback for platforms or mounts where `NotifySource` cannot start.
pub struct PollingDirSource {
    dir: PathBuf,
    interval: Duration,
    state: DirState,
}

impl PollingDirSource {
    /// Take the baseline scan. Fails if the directory cannot be read.
    pub fn new(dir: impl AsRef<Path>, interval: Duration) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let state = scan(&dir)?;
        Ok(Self { dir, interval, state })
    }
}

fn scan(dir: &Path) -> Result<DirState> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        TokenGateError::WatchProvider(format!("read dir {} failed: {e}", dir.display()))
    })?;

    let mut out = DirState::new();
    for entry in entries {
        // entries can vanish between listing and stat; the next scan sees it
        let Ok(entry) = entry else { continue };
        let Ok(meta) = entry.metadata() else { continue };
        out.insert(
            entry.path(),
            FileStamp {
                len: meta.len(),
                modified: meta.modified().ok(),
            },
        );
    }
    Ok(out)
}

fn diff(prev: &DirState, curr: &DirState) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = curr
        .iter()
        .filter(|(path, stamp)| prev.get(*path) != Some(*stamp))
        .map(|(path, _)| path.clone())
        .collect();
    changed.extend(prev.keys().filter(|p| !curr.contains_key(*p)).cloned());
    changed
}

#[async_trait]
impl ChangeSource for PollingDirSource {
    async fn next_batch(&mut self) -> Result<Vec<PathBuf>> {
        loop {
            tokio::time::sleep(self.interval).await;

            let dir = self.dir.clone();
            let next = tokio::task::spawn_blocking(move || scan(&dir))
                .await
                .map_err(|e| TokenGateError::WatchProvider(format!("scan task failed: {e}")))??;

            let changed = diff(&self.state, &next);
            self.state = next;
            if !changed.is_empty() {
                return Ok(changed);
            }
        }
    }
}

/// Batches pushed by an external provider through a channel.
pub struct ChannelSource {
    rx: mpsc::Receiver<Vec<PathBuf>>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (mpsc::Sender<Vec<PathBuf>>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl ChangeSource for ChannelSource {
    async fn next_batch(&mut self) -> Result<Vec<PathBuf>> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| TokenGateError::WatchProvider("change channel closed".into()))
    }
}
