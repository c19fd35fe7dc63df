//! `floortrack-api` -- scan ingestion and backlog drain server.
//!
//! Receives scan payloads from handheld devices, stages them in the
//! `scan_ingest_backlog` table, and merges them into the canonical
//! `part_locations` table on demand or on ingest. Runs fully in-memory
//! when `DATABASE_URL` is unset.

use std::net::SocketAddr;
use std::sync::Arc;

use floortrack_db::drain::BacklogDrainService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floortrack_api::config::ServerConfig;
use floortrack_api::router::build_app_router;
use floortrack_api::state::AppState;
use floortrack_api::store::ScanStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floortrack_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database (optional) ---
    let pool = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = floortrack_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            floortrack_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            floortrack_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Some(pool)
        }
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set; running with in-memory scan store, backlog drain disabled"
            );
            None
        }
    };

    // --- Store + drain service ---
    let (store, drain) = match pool {
        Some(pool) => (
            ScanStore::Database(pool.clone()),
            BacklogDrainService::new(Some(pool), config.drain_limit),
        ),
        None => (
            ScanStore::memory(config.memory_store_capacity),
            BacklogDrainService::disabled(),
        ),
    };

    // --- App state / router ---
    let state = AppState {
        store,
        drain: Arc::new(drain),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST"),
        config.port,
    );
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
