//! axum middleware running the token check for every request on a route.
//!
//! The middleware never rejects: it stores the `AuthorizationResult` in the
//! request extensions for the route to enforce, and annotates the response.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

use super::{annotate_response, authorize_headers};

pub async fn token_auth(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    let check = {
        let snapshot = app.store().current_snapshot();
        let check = authorize_headers(req.headers(), app.auth_headers(), &snapshot);
        tracing::debug!(
            result = check.label(),
            revision = snapshot.revision(),
            "token check"
        );
        check
    };
    app.metrics().auth_decisions.inc(&[("result", check.label())]);

    req.extensions_mut().insert(check.result.clone());
    let mut res = next.run(req).await;
    annotate_response(res.headers_mut(), app.auth_headers(), &check);
    res
}
