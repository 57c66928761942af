//! Shared application state for the tokengate gateway.
//!
//! Startup errors are explicit (Result instead of panic).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tokengate_core::error::Result;

use crate::auth::AuthHeaders;
use crate::config::GatewayConfig;
use crate::obs::AuthMetrics;
use crate::store::TokenStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    auth_headers: AuthHeaders,
    store: Arc<TokenStore>,
    metrics: Arc<AuthMetrics>,
}

impl AppState {
    /// Build application state: load the token list and start its watch.
    /// Must run inside a tokio runtime.
    pub fn new(cfg: GatewayConfig, shutdown: CancellationToken) -> Result<Self> {
        let metrics = Arc::new(AuthMetrics::default());
        let store = TokenStore::init(&cfg.auth, Arc::clone(&metrics), shutdown)?;
        Self::with_store(cfg, store, metrics)
    }

    /// Build state around an existing store (no watch is started here).
    pub fn with_store(cfg: GatewayConfig, store: Arc<TokenStore>, metrics: Arc<AuthMetrics>) -> Result<Self> {
        let auth_headers = AuthHeaders::from_config(&cfg.auth)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                auth_headers,
                store,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn auth_headers(&self) -> &AuthHeaders {
        &self.inner.auth_headers
    }

    pub fn store(&self) -> &TokenStore {
        &self.inner.store
    }

    pub fn metrics(&self) -> &AuthMetrics {
        &self.inner.metrics
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Enter shutdown: readiness goes 503 and no further reloads are scheduled.
    pub fn begin_drain(&self) {
        self.inner.metrics.set_draining();
        self.inner.store.stop_watching();
        tracing::info!("draining");
    }
}
