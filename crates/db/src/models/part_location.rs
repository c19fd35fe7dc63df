//! Models for the canonical `part_locations` table.

use floortrack_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// Current location of one order; at most one row per `order_code`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartLocation {
    pub order_code: String,
    pub location_code: String,
    pub device_id: Option<String>,
    pub updated_at: Timestamp,
}
