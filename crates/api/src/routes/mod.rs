//! Route modules.
//!
//! `api_routes()` assembles everything mounted under `/api/v1`; the
//! health check is merged at the root by the router builder.

pub mod admin;
pub mod health;
pub mod part_locations;
pub mod scans;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(scans::router())
        .merge(part_locations::router())
        .nest("/admin", admin::router())
}
