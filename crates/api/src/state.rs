use std::sync::Arc;

use floortrack_db::drain::BacklogDrainService;

use crate::config::ServerConfig;
use crate::store::ScanStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Where accepted scans are persisted (database backlog or memory).
    pub store: ScanStore,
    /// Backlog drain service; no-ops when no database is configured.
    pub drain: Arc<BacklogDrainService>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
