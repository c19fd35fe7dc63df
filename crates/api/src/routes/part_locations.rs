//! Read-only listing of canonical part locations.
//!
//! ```text
//! GET /part-locations?limit= -> {"data": [{order_code, location_code, device_id, updated_at}]}
//! ```

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use floortrack_db::models::part_location::PartLocation;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum page size for location listing.
const MAX_LIMIT: i64 = 1000;

/// Default page size for location listing.
const DEFAULT_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<i64>,
}

async fn list_part_locations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<PartLocation>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let rows = state.store.part_locations(limit).await?;
    Ok(Json(DataResponse { data: rows }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/part-locations", get(list_part_locations))
}
