//! Review domain model.
//!
//! # Responsibility
//! - Define the persisted `Review` record and its field contracts.
//! - Validate untyped storage values before they become typed fields.
//!
//! # Invariants
//! - `year` is an integer.
//! - `comment` is a non-empty string.
//! - `employee_id` resolved to an existing employee when it was assigned.
//!   It is not re-checked afterwards, so it may go stale if that employee
//!   is removed later.
//! - `id` is only assigned or cleared by the review repository.

use crate::model::employee::EmployeeId;
use crate::repo::employee_repo::EmployeeLookup;
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// SQLite rowid of a `reviews` row.
pub type ReviewId = i64;

/// Field-level validation failure for reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewValidationError {
    InvalidYear,
    InvalidComment,
    InvalidEmployeeReference,
}

impl Display for ReviewValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidYear => write!(f, "Year must be an integer"),
            Self::InvalidComment => write!(f, "Comment must be a non-empty string"),
            Self::InvalidEmployeeReference => {
                write!(f, "employee_id must reference an employee in the database")
            }
        }
    }
}

impl Error for ReviewValidationError {}

/// One performance review written for an employee in a given year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<ReviewId>,
    year: i64,
    comment: String,
    employee_id: EmployeeId,
}

impl Review {
    /// Builds an unsaved review, validating every field.
    ///
    /// # Errors
    /// - `InvalidComment` when `comment` is empty.
    /// - `InvalidEmployeeReference` when `employees` has no such employee.
    /// - `Db` when the employee lookup itself fails.
    pub fn new<L>(
        year: i64,
        comment: impl Into<String>,
        employee_id: EmployeeId,
        employees: &L,
    ) -> RepoResult<Self>
    where
        L: EmployeeLookup + ?Sized,
    {
        let comment = comment.into();
        check_comment(&comment)?;
        check_employee_exists(employee_id, employees)?;
        Ok(Self {
            id: None,
            year,
            comment,
            employee_id,
        })
    }

    /// Rebuilds a review from untyped column values as read from storage.
    ///
    /// Column values of the wrong SQLite type are rejected with the matching
    /// validation error instead of being coerced.
    pub fn from_values<L>(
        id: Option<ReviewId>,
        year: Value,
        comment: Value,
        employee_id: Value,
        employees: &L,
    ) -> RepoResult<Self>
    where
        L: EmployeeLookup + ?Sized,
    {
        let (year, comment, employee_id) = typed_fields(year, comment, employee_id, employees)?;
        Ok(Self {
            id,
            year,
            comment,
            employee_id,
        })
    }

    /// Overwrites all mutable fields from untyped column values.
    ///
    /// All values are validated before any field changes, so a failure
    /// leaves `self` untouched.
    pub fn refresh_from_values<L>(
        &mut self,
        year: Value,
        comment: Value,
        employee_id: Value,
        employees: &L,
    ) -> RepoResult<()>
    where
        L: EmployeeLookup + ?Sized,
    {
        let (year, comment, employee_id) = typed_fields(year, comment, employee_id, employees)?;
        self.year = year;
        self.comment = comment;
        self.employee_id = employee_id;
        Ok(())
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns whether storage has assigned an id to this review.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_year(&mut self, year: i64) {
        self.year = year;
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> RepoResult<()> {
        let comment = comment.into();
        check_comment(&comment)?;
        self.comment = comment;
        Ok(())
    }

    /// Points this review at another employee after checking it exists.
    pub fn set_employee_id<L>(&mut self, employee_id: EmployeeId, employees: &L) -> RepoResult<()>
    where
        L: EmployeeLookup + ?Sized,
    {
        check_employee_exists(employee_id, employees)?;
        self.employee_id = employee_id;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: ReviewId) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}

impl Display for Review {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(
                f,
                "<Review {id}: {}, Employee ID: {}>",
                self.year, self.employee_id
            ),
            None => write!(
                f,
                "<Review None: {}, Employee ID: {}>",
                self.year, self.employee_id
            ),
        }
    }
}

fn typed_fields<L>(
    year: Value,
    comment: Value,
    employee_id: Value,
    employees: &L,
) -> RepoResult<(i64, String, EmployeeId)>
where
    L: EmployeeLookup + ?Sized,
{
    let year = match year {
        Value::Integer(year) => year,
        _ => return Err(ReviewValidationError::InvalidYear.into()),
    };

    let comment = match comment {
        Value::Text(comment) => comment,
        _ => return Err(ReviewValidationError::InvalidComment.into()),
    };
    check_comment(&comment)?;

    let employee_id = match employee_id {
        Value::Integer(employee_id) => employee_id,
        _ => return Err(ReviewValidationError::InvalidEmployeeReference.into()),
    };
    check_employee_exists(employee_id, employees)?;

    Ok((year, comment, employee_id))
}

fn check_comment(comment: &str) -> Result<(), ReviewValidationError> {
    if comment.is_empty() {
        return Err(ReviewValidationError::InvalidComment);
    }
    Ok(())
}

fn check_employee_exists<L>(employee_id: EmployeeId, employees: &L) -> RepoResult<()>
where
    L: EmployeeLookup + ?Sized,
{
    match employees.find_employee(employee_id)? {
        Some(_) => Ok(()),
        None => Err(RepoError::Validation(
            ReviewValidationError::InvalidEmployeeReference,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{Review, ReviewValidationError};
    use crate::model::employee::{Employee, EmployeeId};
    use crate::repo::employee_repo::EmployeeLookup;
    use crate::repo::{RepoError, RepoResult};
    use rusqlite::types::Value;
    use std::cell::Cell;

    struct KnownEmployees {
        ids: Vec<EmployeeId>,
        calls: Cell<usize>,
    }

    impl KnownEmployees {
        fn new(ids: &[EmployeeId]) -> Self {
            Self {
                ids: ids.to_vec(),
                calls: Cell::new(0),
            }
        }
    }

    impl EmployeeLookup for KnownEmployees {
        fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
            self.calls.set(self.calls.get() + 1);
            if self.ids.contains(&id) {
                return Ok(Some(Employee::with_id(id, "Kai", "Engineer").unwrap()));
            }
            Ok(None)
        }
    }

    fn validation_error(result: RepoResult<Review>) -> ReviewValidationError {
        match result {
            Err(RepoError::Validation(err)) => err,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(review) => panic!("expected validation error, got {review}"),
        }
    }

    #[test]
    fn new_checks_employee_through_injected_lookup() {
        let employees = KnownEmployees::new(&[7]);

        let review = Review::new(2023, "Solid year", 7, &employees).unwrap();
        assert_eq!(employees.calls.get(), 1);
        assert_eq!(review.id(), None);
        assert_eq!(review.employee_id(), 7);

        let err = validation_error(Review::new(2023, "Solid year", 8, &employees));
        assert_eq!(err, ReviewValidationError::InvalidEmployeeReference);
    }

    #[test]
    fn empty_comment_is_rejected_before_lookup() {
        let employees = KnownEmployees::new(&[1]);
        let err = validation_error(Review::new(2023, "", 1, &employees));
        assert_eq!(err, ReviewValidationError::InvalidComment);
        assert_eq!(employees.calls.get(), 0);
    }

    #[test]
    fn from_values_rejects_wrong_storage_types() {
        let employees = KnownEmployees::new(&[1]);

        let err = validation_error(Review::from_values(
            Some(1),
            Value::Real(2023.5),
            Value::Text("ok".to_string()),
            Value::Integer(1),
            &employees,
        ));
        assert_eq!(err, ReviewValidationError::InvalidYear);

        let err = validation_error(Review::from_values(
            Some(1),
            Value::Integer(2023),
            Value::Null,
            Value::Integer(1),
            &employees,
        ));
        assert_eq!(err, ReviewValidationError::InvalidComment);

        let err = validation_error(Review::from_values(
            Some(1),
            Value::Integer(2023),
            Value::Text("ok".to_string()),
            Value::Text("1".to_string()),
            &employees,
        ));
        assert_eq!(err, ReviewValidationError::InvalidEmployeeReference);
    }

    #[test]
    fn refresh_failure_leaves_review_unchanged() {
        let employees = KnownEmployees::new(&[1]);
        let mut review = Review::new(2020, "Before", 1, &employees).unwrap();

        review
            .refresh_from_values(
                Value::Integer(2021),
                Value::Text(String::new()),
                Value::Integer(1),
                &employees,
            )
            .unwrap_err();

        assert_eq!(review.year(), 2020);
        assert_eq!(review.comment(), "Before");
    }

    #[test]
    fn display_matches_review_repr() {
        let employees = KnownEmployees::new(&[3]);
        let mut review = Review::new(2022, "Fine", 3, &employees).unwrap();
        assert_eq!(review.to_string(), "<Review None: 2022, Employee ID: 3>");

        review.assign_id(12);
        assert_eq!(review.to_string(), "<Review 12: 2022, Employee ID: 3>");
    }
}
