use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use floortrack_api::config::ServerConfig;
use floortrack_api::router::build_app_router;
use floortrack_api::state::AppState;
use floortrack_api::store::ScanStore;
use floortrack_db::drain::BacklogDrainService;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout. Auto-drain is off unless a test
/// opts in.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        drain_limit: 100,
        auto_drain_on_ingest: 0,
        memory_store_capacity: 100,
    }
}

/// Build the application router in memory mode (no database).
///
/// This mirrors the startup path `main.rs` takes when `DATABASE_URL` is
/// absent: scans go to the bounded in-memory buffer and the backlog
/// drain is disabled.
pub fn build_memory_app() -> Router {
    let config = test_config();
    build_app(
        ScanStore::memory(config.memory_store_capacity),
        BacklogDrainService::disabled(),
        config,
    )
}

/// Build the application router in database mode over the given pool.
pub fn build_db_app(pool: PgPool) -> Router {
    build_db_app_with_config(pool, test_config())
}

/// Database-mode router with a caller-supplied config, for tests that
/// exercise auto-drain or non-default limits.
pub fn build_db_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let drain = BacklogDrainService::new(Some(pool.clone()), config.drain_limit);
    build_app(ScanStore::Database(pool), drain, config)
}

fn build_app(store: ScanStore, drain: BacklogDrainService, config: ServerConfig) -> Router {
    let state = AppState {
        store,
        drain: Arc::new(drain),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// Send a POST with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

/// Send a POST with an arbitrary raw body (for malformed-JSON tests).
pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// Send a POST with no body at all.
pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Assert status then parse the body, reporting the body on mismatch.
pub async fn assert_status_json(
    response: Response<Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {json}");
    json
}
