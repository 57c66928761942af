//! Dynamic token store.
//!
//! Holds exactly one current `TokenSnapshot` behind an `ArcSwap`. A reload
//! reads and parses the backing file off to the side and then publishes the
//! new snapshot with a single pointer swap, so `current_snapshot` never blocks
//! on file I/O and never observes a partially built list.
//!
//! Failure policy: a reload that cannot read or parse the file keeps the
//! previous snapshot and resets the file to an empty list so the same
//! corruption is not re-read on every change. The reset write is itself a
//! directory change; a reload that reads back exactly the reset content within
//! the echo window after a heal does not publish.

pub mod backing_file;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use tokio_util::sync::CancellationToken;

use tokengate_core::error::{Result, TokenGateError};
use tokengate_core::token::{parse_token_list, Token, TokenSnapshot};

use crate::config::AuthConfig;
use crate::obs::AuthMetrics;
use crate::watch::{self, NotifySource, PollingDirSource};

/// Echo window used until `with_echo_window` says otherwise.
const DEFAULT_ECHO_WINDOW: Duration = Duration::from_secs(10);

/// What a single `reload` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new snapshot is now current.
    Published { revision: u64, tokens: usize },
    /// The file could not be used; the previous snapshot stays current.
    Retained { reason: String },
    /// The file still holds the store's own self-heal write; nothing published.
    SelfHealEcho,
}

pub struct TokenStore {
    path: PathBuf,
    current: ArcSwap<TokenSnapshot>,
    revision: AtomicU64,
    reload_state: Mutex<ReloadState>,
    echo_window: Duration,
    watching: AtomicBool,
    watch_cancel: CancellationToken,
    metrics: Arc<AuthMetrics>,
}

#[derive(Default)]
struct ReloadState {
    // set by a self-heal write, consumed by the next successful read
    healed_at: Option<Instant>,
}

impl TokenStore {
    /// Ensure the backing file exists and load it synchronously.
    ///
    /// No watch is started; see [`TokenStore::init`].
    pub fn open(path: impl Into<PathBuf>, metrics: Arc<AuthMetrics>) -> Result<Self> {
        let path = path.into();
        if backing_file::ensure_exists(&path)? {
            tracing::info!(path = %path.display(), "token list missing, created empty list");
        }

        let store = Self {
            path,
            current: ArcSwap::from_pointee(TokenSnapshot::empty()),
            revision: AtomicU64::new(0),
            reload_state: Mutex::new(ReloadState::default()),
            echo_window: DEFAULT_ECHO_WINDOW,
            watching: AtomicBool::new(false),
            watch_cancel: CancellationToken::new(),
            metrics,
        };
        store.reload();
        Ok(store)
    }

    /// How long after a self-heal write a read-back of the reset content is
    /// still treated as the store's own echo.
    pub fn with_echo_window(mut self, window: Duration) -> Self {
        self.echo_window = window;
        self
    }

    /// Open the store and start watching its directory for changes.
    ///
    /// Must run inside a tokio runtime. If the watch cannot start the store
    /// still serves the loaded snapshot, just without live reload.
    pub fn init(
        cfg: &AuthConfig,
        metrics: Arc<AuthMetrics>,
        shutdown: CancellationToken,
    ) -> Result<Arc<Self>> {
        // the echo arrives one debounce window (plus a poll, on fallback) after the heal
        let mut store = Self::open(&cfg.token_list_file, metrics)?.with_echo_window(cfg.debounce() * 3);
        store.watch_cancel = shutdown.child_token();
        let store = Arc::new(store);
        let cancel = store.watch_cancel.clone();

        let dir = cfg.watch_dir();
        let notify_err = match NotifySource::new(&dir) {
            Ok(source) => {
                watch::spawn(Arc::clone(&store), source, cfg.debounce(), cancel);
                return Ok(store);
            }
            Err(e) => e,
        };
        tracing::warn!(
            dir = %dir.display(),
            error = %notify_err,
            "token list event watch unavailable, falling back to polling"
        );

        match PollingDirSource::new(&dir, cfg.poll_interval()) {
            Ok(source) => {
                watch::spawn(Arc::clone(&store), source, cfg.debounce(), cancel);
            }
            Err(e) => {
                tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "token list watch unavailable, live reload disabled"
                );
            }
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The snapshot every new authorization check should use.
    pub fn current_snapshot(&self) -> Arc<TokenSnapshot> {
        self.current.load_full()
    }

    /// Number of snapshots published since open.
    pub fn publish_count(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::Acquire)
    }

    pub(crate) fn set_watching(&self, on: bool) {
        self.watching.store(on, Ordering::Release);
        self.metrics.watch_active.set(&[], i64::from(on));
    }

    /// Stop scheduling reloads. An in-flight reload still publishes atomically.
    pub fn stop_watching(&self) {
        self.watch_cancel.cancel();
    }

    /// Re-read the backing file and publish it if it parses.
    pub fn reload(&self) -> ReloadOutcome {
        let mut state = self.reload_state.lock().unwrap_or_else(PoisonError::into_inner);
        let started = Instant::now();

        let outcome = match backing_file::read(&self.path) {
            Err(e) => self.retain(&mut state, e, "io_error"),
            Ok(raw) => {
                let echo_pending = state
                    .healed_at
                    .take()
                    .is_some_and(|at| at.elapsed() <= self.echo_window);
                if echo_pending && backing_file::is_reset_content(&raw) {
                    tracing::debug!(path = %self.path.display(), "token list still holds self-heal reset, keeping snapshot");
                    self.metrics.reloads.inc(&[("outcome", "self_heal_echo")]);
                    ReloadOutcome::SelfHealEcho
                } else {
                    match parse_token_list(&raw) {
                        Ok(tokens) => self.publish(tokens),
                        Err(e) => self.retain(&mut state, e, "parse_error"),
                    }
                }
            }
        };

        self.metrics.reload_duration.observe(&[], started.elapsed());
        outcome
    }

    fn publish(&self, tokens: Vec<Token>) -> ReloadOutcome {
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        let count = tokens.len();
        self.current.store(Arc::new(TokenSnapshot::new(revision, tokens)));

        self.metrics.reloads.inc(&[("outcome", "published")]);
        self.metrics.tokens_loaded.set(&[], count as i64);
        tracing::info!(path = %self.path.display(), revision, tokens = count, "token list published");

        ReloadOutcome::Published { revision, tokens: count }
    }

    fn retain(&self, state: &mut ReloadState, err: TokenGateError, outcome: &'static str) -> ReloadOutcome {
        let kept = self.current.load().revision();
        tracing::error!(
            path = %self.path.display(),
            error = %err,
            kept_revision = kept,
            "token list unusable, keeping previous snapshot"
        );
        self.metrics.reloads.inc(&[("outcome", outcome)]);

        match backing_file::write_empty(&self.path) {
            Ok(()) => {
                state.healed_at = Some(Instant::now());
                tracing::warn!(path = %self.path.display(), "token list reset to empty list");
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "token list reset failed");
            }
        }

        ReloadOutcome::Retained { reason: err.to_string() }
    }
}
