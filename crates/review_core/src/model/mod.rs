//! Domain records persisted by review core.
//!
//! # Responsibility
//! - Define `Review` and its `Employee` collaborator.
//! - Keep field validation next to the fields it protects.
//!
//! # Invariants
//! - A record's id is `None` until storage assigns one.
//! - Invalid field values are never stored on a record.

pub mod employee;
pub mod review;
