//! Employee lookup capability and SQLite employee repository.
//!
//! # Responsibility
//! - Expose the narrow `EmployeeLookup` contract reviews validate against.
//! - Provide basic CRUD over the `employees` table.
//!
//! # Invariants
//! - Reviews depend on `EmployeeLookup` only, never on the concrete repository.
//! - Deleting an employee that still has reviews fails while foreign keys
//!   are enforced.

use crate::db::schema;
use crate::model::employee::{Employee, EmployeeId};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "employee";

/// Existence check used when a review is pointed at an employee.
pub trait EmployeeLookup {
    fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
}

impl<T: EmployeeLookup + ?Sized> EmployeeLookup for &T {
    fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        (**self).find_employee(id)
    }
}

/// Repository interface for employee CRUD operations.
pub trait EmployeeRepository {
    fn create_table(&self) -> RepoResult<()>;
    fn drop_table(&self) -> RepoResult<()>;
    /// Inserts an unsaved employee and stores the assigned id on it.
    fn save(&self, employee: &mut Employee) -> RepoResult<EmployeeId>;
    fn update(&self, employee: &Employee) -> RepoResult<()>;
    /// Deletes the row and clears the id on `employee`.
    fn delete(&self, employee: &mut Employee) -> RepoResult<()>;
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn find_all(&self) -> RepoResult<Vec<Employee>>;

    fn create(&self, name: &str, job_title: &str) -> RepoResult<Employee> {
        let mut employee = Employee::new(name, job_title)?;
        self.save(&mut employee)?;
        Ok(employee)
    }
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_table(&self) -> RepoResult<()> {
        schema::create_employees_table(self.conn)?;
        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        schema::drop_employees_table(self.conn)?;
        Ok(())
    }

    fn save(&self, employee: &mut Employee) -> RepoResult<EmployeeId> {
        if let Some(id) = employee.id() {
            return Err(RepoError::AlreadyPersisted { entity: ENTITY, id });
        }

        self.conn.execute(
            "INSERT INTO employees (name, job_title) VALUES (?1, ?2)",
            params![employee.name(), employee.job_title()],
        )?;
        let id = self.conn.last_insert_rowid();
        employee.assign_id(id);

        debug!("event=employee_save module=repo status=ok id={id}");
        Ok(id)
    }

    fn update(&self, employee: &Employee) -> RepoResult<()> {
        let id = employee
            .id()
            .ok_or(RepoError::NotPersisted { entity: ENTITY })?;

        let changed = self.conn.execute(
            "UPDATE employees SET name = ?1, job_title = ?2 WHERE id = ?3",
            params![employee.name(), employee.job_title(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        debug!("event=employee_update module=repo status=ok id={id}");
        Ok(())
    }

    fn delete(&self, employee: &mut Employee) -> RepoResult<()> {
        let id = employee
            .id()
            .ok_or(RepoError::NotPersisted { entity: ENTITY })?;

        self.conn
            .execute("DELETE FROM employees WHERE id = ?1", [id])?;
        employee.clear_id();

        debug!("event=employee_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, job_title FROM employees WHERE id = ?1",
                [id],
                read_employee_columns,
            )
            .optional()?;

        row.map(|(id, name, job_title)| Employee::with_id(id, name, job_title))
            .transpose()
            .map_err(RepoError::from)
    }

    fn find_all(&self) -> RepoResult<Vec<Employee>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, job_title FROM employees ORDER BY id")?;
        let rows = stmt.query_map([], read_employee_columns)?;

        let mut employees = Vec::new();
        for row in rows {
            let (id, name, job_title) = row?;
            employees.push(Employee::with_id(id, name, job_title)?);
        }
        Ok(employees)
    }
}

impl EmployeeLookup for SqliteEmployeeRepository<'_> {
    fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.find_by_id(id)
    }
}

fn read_employee_columns(row: &Row<'_>) -> rusqlite::Result<(EmployeeId, String, String)> {
    Ok((row.get("id")?, row.get("name")?, row.get("job_title")?))
}
