//! HTTP surface: token middleware, verdict header, ops endpoints.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tokengate_gateway::{app_state::AppState, config, obs::AuthMetrics, router, store::TokenStore};

struct Fixture {
    _dir: tempfile::TempDir,
    state: AppState,
}

impl Fixture {
    fn new(tokens_json: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, tokens_json).unwrap();

        let cfg = config::load_from_str(&format!(
            "version: 1\nauth:\n  token_list_file: {:?}\n  token_valid_header: Token-Valid\n",
            path.display().to_string()
        ))
        .unwrap();
        let metrics = Arc::new(AuthMetrics::default());
        let store = Arc::new(TokenStore::open(&path, Arc::clone(&metrics)).unwrap());
        let state = AppState::with_store(cfg, store, metrics).unwrap();
        Self { _dir: dir, state }
    }

    fn app(&self) -> Router {
        router::build_router(self.state.clone())
    }
}

async fn body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn check_request(auth: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri("/v1/token/check");
    if let Some(v) = auth {
        b = b.header("authorization", v);
    }
    b.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn valid_bearer_token_is_accepted() {
    let fx = Fixture::new(r#"[{"token":"abc123","maxReqs":null}]"#);
    let res = fx.app().oneshot(check_request(Some("Bearer abc123"))).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("token-valid").unwrap(), "1");
    assert!(body_string(res).await.contains("\"authorized\":true"));
}

#[tokio::test]
async fn bare_token_is_accepted() {
    let fx = Fixture::new(r#"[{"token":"abc123"}]"#);
    let res = fx.app().oneshot(check_request(Some("abc123"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_token_is_rejected_with_zero_verdict() {
    let fx = Fixture::new(r#"[{"token":"abc123"}]"#);
    let res = fx.app().oneshot(check_request(Some("Bearer abc999"))).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers().get("token-valid").unwrap(), "0");
    assert_eq!(body_string(res).await, r#"{"error":"UNAUTHORIZED"}"#);
}

#[tokio::test]
async fn missing_header_gets_no_verdict_header() {
    let fx = Fixture::new(r#"[{"token":"abc123"}]"#);
    let res = fx.app().oneshot(check_request(None)).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get("token-valid").is_none());
}

#[tokio::test]
async fn ops_routes_skip_token_middleware() {
    let fx = Fixture::new("[]");
    let res = fx
        .app()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("authorization", "Bearer nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("token-valid").is_none());
}

#[tokio::test]
async fn reload_is_visible_to_next_request() {
    let fx = Fixture::new(r#"[{"token":"old"}]"#);
    fs::write(fx.state.store().path(), r#"[{"token":"new"}]"#).unwrap();
    fx.state.store().reload();

    let res = fx.app().oneshot(check_request(Some("Bearer old"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let res = fx.app().oneshot(check_request(Some("Bearer new"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_count_decisions() {
    let fx = Fixture::new(r#"[{"token":"abc123"}]"#);
    fx.app().oneshot(check_request(Some("abc123"))).await.unwrap();
    fx.app().oneshot(check_request(Some("wrong"))).await.unwrap();
    fx.app().oneshot(check_request(None)).await.unwrap();

    let res = fx
        .app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let text = body_string(res).await;
    assert!(text.contains(r#"tokengate_auth_decisions_total{result="granted"} 1"#));
    assert!(text.contains(r#"tokengate_auth_decisions_total{result="denied"} 1"#));
    assert!(text.contains(r#"tokengate_auth_decisions_total{result="missing"} 1"#));
    assert!(text.contains("tokengate_tokens_loaded 1"));
}

#[tokio::test]
async fn readyz_reports_draining() {
    let fx = Fixture::new("[]");
    let ready = |app: Router| async move {
        app.oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    };
    assert_eq!(ready(fx.app()).await, StatusCode::OK);
    fx.state.begin_drain();
    assert_eq!(ready(fx.app()).await, StatusCode::SERVICE_UNAVAILABLE);
}
