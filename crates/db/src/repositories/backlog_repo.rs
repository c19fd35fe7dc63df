//! Repository for the `scan_ingest_backlog` table.
//!
//! The ingestion endpoint appends rows through the pool; the drain
//! operates on a single transaction, so the candidate/delete helpers
//! take `&mut PgConnection` instead of a pool.

use floortrack_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::backlog::BacklogCandidate;

/// Data access for the scan ingestion backlog.
pub struct BacklogRepo;

impl BacklogRepo {
    /// Append one raw scan payload. `received_at` defaults to `NOW()`.
    pub async fn append(
        pool: &PgPool,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO scan_ingest_backlog (payload) VALUES ($1) RETURNING id",
        )
        .bind(payload)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// Count pending backlog rows.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scan_ingest_backlog")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Select up to `limit` rows oldest-first, extracting the merge
    /// fields from the JSON payload.
    ///
    /// Uses `FOR UPDATE SKIP LOCKED` so concurrent drains work disjoint
    /// row sets instead of blocking or double-merging.
    pub async fn select_candidates(
        conn: &mut PgConnection,
        limit: i64,
    ) -> Result<Vec<BacklogCandidate>, sqlx::Error> {
        sqlx::query_as::<_, BacklogCandidate>(
            "SELECT id, \
                    payload->>'order_code' AS order_code, \
                    payload->>'location_code' AS location_code, \
                    payload->>'device_id' AS device_id \
             FROM scan_ingest_backlog \
             ORDER BY received_at \
             LIMIT $1 \
             FOR UPDATE SKIP LOCKED",
        )
        .bind(limit)
        .fetch_all(conn)
        .await
    }

    /// Delete merged rows in one batch.
    pub async fn delete_rows(conn: &mut PgConnection, ids: &[DbId]) -> Result<(), sqlx::Error> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM scan_ingest_backlog WHERE id = ANY($1)")
            .bind(ids)
            .execute(conn)
            .await?;
        Ok(())
    }
}
