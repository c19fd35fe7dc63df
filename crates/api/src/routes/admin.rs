//! Operator endpoints for the scan backlog.
//!
//! ```text
//! POST /admin/drain-backlog   -> {"status":"ok","drained":n,"limit":n}
//!                             |  503 {"status":"skipped","reason":"backlog-drain-disabled"}
//! GET  /admin/backlog-status  -> {"status","pending","drain_limit","auto_drain_on_ingest"}
//! ```
//!
//! Both endpoints degrade gracefully when no database is configured:
//! the drain reports itself disabled, the status reports zero pending.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// `?limit=` query parameter for the drain trigger.
#[derive(Debug, Deserialize)]
struct DrainQuery {
    limit: Option<i64>,
}

/// Optional JSON body for the drain trigger.
#[derive(Debug, Default, Deserialize)]
struct DrainBody {
    limit: Option<i64>,
}

/// Trigger one bounded backlog drain.
///
/// The limit can come from the JSON body (`{"limit": 100}`) or the
/// `?limit=` query parameter; the body wins when both are present.
async fn trigger_backlog_drain(
    State(state): State<AppState>,
    Query(query): Query<DrainQuery>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if !state.drain.is_configured() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "skipped",
                "reason": "backlog-drain-disabled",
            })),
        );
    }

    // Absent or malformed bodies fall through to the query parameter.
    let body_limit = serde_json::from_slice::<DrainBody>(&body)
        .unwrap_or_default()
        .limit;
    let limit = body_limit.or(query.limit);

    let drained = state.drain.drain_once(limit).await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "drained": drained,
            "limit": limit.unwrap_or(state.drain.default_limit()),
        })),
    )
}

/// Backlog statistics for monitoring.
async fn backlog_status(State(state): State<AppState>) -> Json<Value> {
    let auto_limit = state.config.auto_drain_on_ingest;

    if !state.drain.is_configured() {
        return Json(json!({
            "status": "disabled",
            "pending": 0,
            "auto_drain_on_ingest": auto_limit,
        }));
    }

    let pending = state.drain.count_backlog().await;
    Json(json!({
        "status": "ok",
        "pending": pending,
        "drain_limit": state.drain.default_limit(),
        "auto_drain_on_ingest": auto_limit,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/drain-backlog", post(trigger_backlog_drain))
        .route("/backlog-status", get(backlog_status))
}
