//! Scan ingestion endpoint.
//!
//! ```text
//! POST /scans -> 202 {"status":"accepted","received":<normalized payload>}
//!             |  400 {"error": "missing-order_code" | "missing-location_code"
//!             |                | "invalid-device_id" | "invalid-json"}
//! ```
//!
//! Validation happens here, before the backlog: a malformed payload is
//! rejected with its specific reason so the submitting device can
//! correct or discard locally instead of queueing something the server
//! will never accept. Accepted payloads are stored raw and merged later
//! by the backlog drain.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use floortrack_core::scan::{ScanPayload, ScanRejection, REASON_INVALID_JSON};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::state::AppState;

async fn ingest_scan(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Body is taken raw so a non-JSON body maps to the wire-level
    // "invalid-json" reason instead of axum's default 400.
    let value: Value = serde_json::from_slice(&body).map_err(|_| ScanRejection {
        reason: REASON_INVALID_JSON,
    })?;
    let payload = ScanPayload::parse(&value)?;

    tracing::info!(
        order_code = %payload.order_code,
        location_code = %payload.location_code,
        device_id = ?payload.device_id,
        "Accepted scan",
    );
    state.store.append(&payload).await?;

    // Opportunistic merge so the canonical table stays close to live
    // under light load. Bounded, and failures only log.
    let auto_limit = state.config.auto_drain_on_ingest;
    if auto_limit > 0 && state.drain.is_configured() {
        state.drain.drain_once(Some(auto_limit)).await;
    }

    let body = json!({
        "status": "accepted",
        "received": payload.to_value(),
    });
    Ok((StatusCode::ACCEPTED, Json(body)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/scans", post(ingest_scan))
}
