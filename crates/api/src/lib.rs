//! `floortrack-api` library crate.
//!
//! Re-exports the router builder and application state so integration
//! tests drive the exact same middleware stack as the production
//! binary. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod error;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod store;
