//! `floortrack-core` -- pure domain types and logic.
//!
//! No I/O lives here. Scan payload validation, the mirrorctl
//! day-streak state machine, and the shared error/type aliases are all
//! expressed as plain data and functions so they can be unit tested
//! without a database, a network, or a filesystem.

pub mod error;
pub mod mirror;
pub mod scan;
pub mod types;
