//! Core domain logic for employee reviews.
//! This crate is the single source of truth for review invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::employee::{Employee, EmployeeId, EmployeeValidationError};
pub use model::review::{Review, ReviewId, ReviewValidationError};
pub use repo::employee_repo::{EmployeeLookup, EmployeeRepository, SqliteEmployeeRepository};
pub use repo::identity_map::{IdentityMap, ReviewCache, ReviewHandle};
pub use repo::review_repo::{ReviewRepository, ReviewRow, SqliteReviewRepository};
pub use repo::{RepoError, RepoResult};
pub use service::review_service::ReviewService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
