//! Domain error taxonomy shared across the workspace.
//!
//! Failure classes map to how the caller is expected to react:
//! validation failures are rejected immediately and never retried,
//! delivery failures are queued for retry, storage and configuration
//! failures degrade to zero/empty results at the service boundary.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed input, rejected at the boundary and never queued.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backing store (queue file, database) is unreachable or unwritable.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A required connection string, token, or config file is absent.
    #[error("Not configured: {0}")]
    Configuration(String),

    /// Anything that should not happen in normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}
