//! `floortrack-handheld` library crate.
//!
//! Client-side half of the scan pipeline: the durable retry queue, the
//! transmitter that prefers a live send and falls back to the queue,
//! and the mirrorctl health-state persistence. Re-exported for
//! integration testing; the CLI entrypoint lives in `main.rs`.

pub mod config;
pub mod mirror;
pub mod queue;
pub mod transmitter;
