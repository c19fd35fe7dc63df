//! Table-level data access.

pub mod backlog_repo;
pub mod part_location_repo;

pub use backlog_repo::BacklogRepo;
pub use part_location_repo::PartLocationRepo;
