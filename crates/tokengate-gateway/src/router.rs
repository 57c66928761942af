//! Axum router wiring.
//!
//! Ops endpoints are open; `/v1/*` routes run behind the token middleware.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, auth, ops};

pub fn build_router(state: AppState) -> Router {
    let protected: Router<AppState> = Router::new()
        .route("/v1/token/check", get(auth::check::token_check))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::token_auth,
        ));

    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .merge(protected)
        .with_state(state)
}
