//! Repository for the canonical `part_locations` table.

use sqlx::{PgConnection, PgPool};

use crate::models::part_location::PartLocation;

/// Data access for current part locations.
pub struct PartLocationRepo;

impl PartLocationRepo {
    /// Upsert the current location for one order.
    ///
    /// Insert-or-overwrite keyed by `order_code`; last merge wins,
    /// `updated_at` is stamped server-side.
    pub async fn upsert(
        conn: &mut PgConnection,
        order_code: &str,
        location_code: &str,
        device_id: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO part_locations (order_code, location_code, device_id, updated_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (order_code) \
             DO UPDATE SET \
                 location_code = EXCLUDED.location_code, \
                 device_id = EXCLUDED.device_id, \
                 updated_at = NOW()",
        )
        .bind(order_code)
        .bind(location_code)
        .bind(device_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// List recent locations, most recently updated first.
    pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<PartLocation>, sqlx::Error> {
        sqlx::query_as::<_, PartLocation>(
            "SELECT order_code, location_code, device_id, updated_at \
             FROM part_locations \
             ORDER BY updated_at DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Look up the current location of one order.
    pub async fn find_by_order_code(
        pool: &PgPool,
        order_code: &str,
    ) -> Result<Option<PartLocation>, sqlx::Error> {
        sqlx::query_as::<_, PartLocation>(
            "SELECT order_code, location_code, device_id, updated_at \
             FROM part_locations \
             WHERE order_code = $1",
        )
        .bind(order_code)
        .fetch_optional(pool)
        .await
    }
}
