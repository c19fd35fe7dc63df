//! Backlog drain service: merge staged scans into `part_locations`.
//!
//! One `drain_once` call is one transaction: select a bounded batch
//! (skipping rows locked by a concurrent drain), upsert the valid rows
//! into the canonical table, delete the merged backlog rows, commit.
//! Rows missing order/location codes are skipped and stay in the
//! backlog for manual inspection.
//!
//! Every operation is fail-closed and loop-safe: errors are logged and
//! surface as the zero value, never as a panic or a partial commit.

use sqlx::PgPool;

use crate::repositories::{BacklogRepo, PartLocationRepo};

/// Default batch size when the caller does not pass a limit.
pub const DEFAULT_DRAIN_LIMIT: i64 = 100;

/// Drains the scan ingestion backlog into the canonical location table.
///
/// Constructed with `None` when no database is configured, in which
/// case every operation is a no-op returning the zero value so the
/// surrounding application can run fully in-memory.
#[derive(Clone)]
pub struct BacklogDrainService {
    pool: Option<PgPool>,
    default_limit: i64,
}

impl BacklogDrainService {
    pub fn new(pool: Option<PgPool>, default_limit: i64) -> Self {
        Self {
            pool,
            default_limit,
        }
    }

    /// A service with no backing store; all operations no-op.
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_DRAIN_LIMIT)
    }

    /// Whether a backing store is configured. Guards all operations.
    pub fn is_configured(&self) -> bool {
        self.pool.is_some()
    }

    /// The batch size used when no explicit limit is passed.
    pub fn default_limit(&self) -> i64 {
        self.default_limit
    }

    /// Merge up to `limit` backlog rows; returns the number merged.
    ///
    /// Skipped rows (missing codes, or locked by a concurrent drain) do
    /// not count. Any error rolls the whole batch back and returns 0 --
    /// better to retry the batch next time than to lose track of which
    /// rows were handled.
    pub async fn drain_once(&self, limit: Option<i64>) -> i64 {
        let Some(pool) = &self.pool else {
            tracing::debug!("Backlog drain skipped: database not configured");
            return 0;
        };

        let limit = limit.unwrap_or(self.default_limit);
        if limit <= 0 {
            return 0;
        }

        match drain_tx(pool, limit).await {
            Ok(drained) => drained,
            Err(e) => {
                tracing::warn!(error = %e, limit, "Backlog drain failed");
                0
            }
        }
    }

    /// Count pending backlog rows; monitoring read, 0 on any failure.
    pub async fn count_backlog(&self) -> i64 {
        let Some(pool) = &self.pool else {
            tracing::debug!("Backlog count skipped: database not configured");
            return 0;
        };

        match BacklogRepo::count(pool).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, "Backlog count failed");
                0
            }
        }
    }
}

/// The transactional body of [`BacklogDrainService::drain_once`].
async fn drain_tx(pool: &PgPool, limit: i64) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let candidates = BacklogRepo::select_candidates(&mut tx, limit).await?;
    if candidates.is_empty() {
        tracing::debug!(limit, "Backlog drain: no rows available");
        tx.commit().await?;
        return Ok(0);
    }

    let mut merged_ids = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        if !candidate.is_mergeable() {
            tracing::warn!(
                row_id = candidate.id,
                order_code = ?candidate.order_code,
                location_code = ?candidate.location_code,
                "Skipping backlog row with missing order/location codes",
            );
            continue;
        }

        // is_mergeable guarantees both codes are present and non-empty.
        let order_code = candidate.order_code.as_deref().unwrap_or_default();
        let location_code = candidate.location_code.as_deref().unwrap_or_default();
        PartLocationRepo::upsert(
            &mut tx,
            order_code,
            location_code,
            candidate.device_id.as_deref(),
        )
        .await?;
        merged_ids.push(candidate.id);
    }

    if merged_ids.is_empty() {
        tracing::warn!("No valid backlog rows processed (missing order/location codes)");
    } else {
        BacklogRepo::delete_rows(&mut tx, &merged_ids).await?;
        tracing::info!(drained = merged_ids.len(), limit, "Backlog drain succeeded");
    }

    tx.commit().await?;
    Ok(merged_ids.len() as i64)
}
