/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables. `DATABASE_URL`
/// is read separately in `main.rs`; when absent the server runs with
/// the in-memory scan store and backlog draining disabled.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Default drain batch size (default: `100`).
    pub drain_limit: i64,
    /// Rows to drain after each accepted scan; `0` disables auto-drain.
    pub auto_drain_on_ingest: i64,
    /// Capacity of the in-memory scan buffer used without a database.
    pub memory_store_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default     |
    /// |-------------------------|-------------|
    /// | `HOST`                  | `0.0.0.0`   |
    /// | `PORT`                  | `3000`      |
    /// | `CORS_ORIGINS`          | (none)      |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`        |
    /// | `DRAIN_LIMIT`           | `100`       |
    /// | `AUTO_DRAIN_ON_INGEST`  | `0`         |
    /// | `MEMORY_STORE_CAPACITY` | `100`       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let drain_limit: i64 = std::env::var("DRAIN_LIMIT")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("DRAIN_LIMIT must be a valid i64");

        let auto_drain_on_ingest: i64 = std::env::var("AUTO_DRAIN_ON_INGEST")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("AUTO_DRAIN_ON_INGEST must be a valid i64");

        let memory_store_capacity: usize = std::env::var("MEMORY_STORE_CAPACITY")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("MEMORY_STORE_CAPACITY must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            drain_limit,
            auto_drain_on_ingest,
            memory_store_capacity,
        }
    }
}
