//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite statements from service orchestration.
//! - Keep at most one live in-memory review per persisted row.
//!
//! # Invariants
//! - Write paths validate fields before any SQL mutation.
//! - Every statement autocommits; no transaction spans two statements.
//! - Storage errors are carried unmodified inside `RepoError::Db`.

use crate::db::DbError;
use crate::model::employee::EmployeeValidationError;
use crate::model::review::ReviewValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod employee_repo;
pub mod identity_map;
pub mod review_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for review and employee persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReviewValidationError),
    EmployeeValidation(EmployeeValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: i64 },
    /// Update/delete called on a record storage never assigned an id.
    NotPersisted { entity: &'static str },
    /// Save called on a record that already has an id.
    AlreadyPersisted { entity: &'static str, id: i64 },
    /// A cached instance is currently borrowed by the caller.
    InstanceBorrowed { entity: &'static str },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmployeeValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::NotPersisted { entity } => {
                write!(f, "{entity} has no id; save it before updating or deleting")
            }
            Self::AlreadyPersisted { entity, id } => {
                write!(f, "{entity} {id} is already persisted; use update instead")
            }
            Self::InstanceBorrowed { entity } => {
                write!(f, "{entity} instance is already borrowed by the caller")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::EmployeeValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::NotPersisted { .. }
            | Self::AlreadyPersisted { .. }
            | Self::InstanceBorrowed { .. } => None,
        }
    }
}

impl From<ReviewValidationError> for RepoError {
    fn from(value: ReviewValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::EmployeeValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
