//! Models for the `scan_ingest_backlog` staging table.

use floortrack_core::types::DbId;
use sqlx::FromRow;

/// A backlog row with its merge fields pre-extracted from the JSON
/// payload by the candidate query.
///
/// `order_code`/`location_code` are `Option` here because extraction
/// happens in SQL (`payload->>'order_code'`); rows missing either are
/// skipped by the drain, not deleted.
#[derive(Debug, Clone, FromRow)]
pub struct BacklogCandidate {
    pub id: DbId,
    pub order_code: Option<String>,
    pub location_code: Option<String>,
    pub device_id: Option<String>,
}

impl BacklogCandidate {
    /// Whether this row carries both codes required for a merge.
    pub fn is_mergeable(&self) -> bool {
        fn present(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|s| !s.is_empty())
        }
        present(&self.order_code) && present(&self.location_code)
    }
}
