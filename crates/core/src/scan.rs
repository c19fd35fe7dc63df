//! Scan payload shape and ingestion validation.
//!
//! A scan is an (order, location) pair captured on a handheld device.
//! Validation happens once, at the ingestion boundary: a payload that
//! fails here is rejected with a wire-level reason string and never
//! reaches the backlog, so the submitting device can correct or discard
//! locally instead of queueing a permanently-rejected payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Rejection reasons (wire-level, returned in the 400 body)
// ---------------------------------------------------------------------------

/// `order_code` absent, empty after trimming, or not a string.
pub const REASON_MISSING_ORDER_CODE: &str = "missing-order_code";
/// `location_code` absent, empty after trimming, or not a string.
pub const REASON_MISSING_LOCATION_CODE: &str = "missing-location_code";
/// `device_id` present but not a non-empty string.
pub const REASON_INVALID_DEVICE_ID: &str = "invalid-device_id";
/// Request body is not a JSON object (or not JSON at all).
pub const REASON_INVALID_JSON: &str = "invalid-json";

/// A payload rejected at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scan rejected: {reason}")]
pub struct ScanRejection {
    /// One of the `REASON_*` constants.
    pub reason: &'static str,
}

impl ScanRejection {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

// ---------------------------------------------------------------------------
// ScanPayload
// ---------------------------------------------------------------------------

/// One physical scan event, normalized (codes trimmed).
///
/// `metadata` is a free-form map; clients are expected to include a
/// caller-generated `scan_id` for idempotency/audit, and the retry queue
/// stamps `retries`/`status` into it on each attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPayload {
    pub order_code: String,
    pub location_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ScanPayload {
    /// Validate and normalize a raw JSON body into a [`ScanPayload`].
    ///
    /// Trims `order_code`/`location_code` and rejects with the specific
    /// wire reason on the first failing field (order before location
    /// before device).
    pub fn parse(value: &Value) -> Result<Self, ScanRejection> {
        let obj = value
            .as_object()
            .ok_or_else(|| ScanRejection::new(REASON_INVALID_JSON))?;

        let order_code = required_code(obj, "order_code", REASON_MISSING_ORDER_CODE)?;
        let location_code = required_code(obj, "location_code", REASON_MISSING_LOCATION_CODE)?;

        let device_id = match obj.get("device_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(_) => return Err(ScanRejection::new(REASON_INVALID_DEVICE_ID)),
        };

        let metadata = match obj.get("metadata") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(ScanRejection::new(REASON_INVALID_JSON)),
        };

        Ok(Self {
            order_code,
            location_code,
            device_id,
            metadata,
        })
    }

    /// Serialize back to the wire shape.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Extract a required non-empty string field, trimmed.
fn required_code(
    obj: &Map<String, Value>,
    field: &str,
    reason: &'static str,
) -> Result<String, ScanRejection> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ScanRejection::new(reason)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
