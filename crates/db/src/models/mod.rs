//! Row models and DTOs.
//!
//! One submodule per table: the `FromRow` shapes the repositories
//! return and the intermediate shapes the drain pipeline works with.

pub mod backlog;
pub mod part_location;
