//! Employee record referenced by reviews.
//!
//! Employees are plain values: there is no identity cache for them, and the
//! review side only needs an existence check (`EmployeeLookup`).

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// SQLite rowid of an `employees` row.
pub type EmployeeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeValidationError {
    EmptyName,
    EmptyJobTitle,
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name must be a non-empty string"),
            Self::EmptyJobTitle => write!(f, "Job title must be a non-empty string"),
        }
    }
}

impl Error for EmployeeValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: Option<EmployeeId>,
    name: String,
    job_title: String,
}

impl Employee {
    /// Builds an unsaved employee.
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Result<Self, EmployeeValidationError> {
        let mut employee = Self {
            id: None,
            name: String::new(),
            job_title: String::new(),
        };
        employee.set_name(name)?;
        employee.set_job_title(job_title)?;
        Ok(employee)
    }

    pub(crate) fn with_id(
        id: EmployeeId,
        name: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Result<Self, EmployeeValidationError> {
        let mut employee = Self::new(name, job_title)?;
        employee.id = Some(id);
        Ok(employee)
    }

    pub fn id(&self) -> Option<EmployeeId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), EmployeeValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EmployeeValidationError::EmptyName);
        }
        self.name = name;
        Ok(())
    }

    pub fn set_job_title(
        &mut self,
        job_title: impl Into<String>,
    ) -> Result<(), EmployeeValidationError> {
        let job_title = job_title.into();
        if job_title.is_empty() {
            return Err(EmployeeValidationError::EmptyJobTitle);
        }
        self.job_title = job_title;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: EmployeeId) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}

impl Display for Employee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Employee {id}: {}, {}>", self.name, self.job_title),
            None => write!(f, "<Employee None: {}, {}>", self.name, self.job_title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Employee, EmployeeValidationError};

    #[test]
    fn new_rejects_empty_fields() {
        assert_eq!(
            Employee::new("", "Engineer").unwrap_err(),
            EmployeeValidationError::EmptyName
        );
        assert_eq!(
            Employee::new("Lee", "").unwrap_err(),
            EmployeeValidationError::EmptyJobTitle
        );
    }

    #[test]
    fn failed_setter_keeps_previous_value() {
        let mut employee = Employee::new("Lee", "Engineer").unwrap();
        employee.set_name("").unwrap_err();
        assert_eq!(employee.name(), "Lee");
        assert_eq!(employee.id(), None);
    }
}
