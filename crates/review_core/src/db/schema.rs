//! Table DDL for employees and reviews.
//!
//! # Invariants
//! - Create operations are `IF NOT EXISTS`; drop operations are `IF EXISTS`.
//! - `reviews.employee_id` references `employees.id`, so with foreign keys
//!   enabled `reviews` must be dropped before `employees`.

use super::DbResult;
use log::info;
use rusqlite::Connection;

pub const EMPLOYEES_TABLE: &str = "employees";
pub const REVIEWS_TABLE: &str = "reviews";

const CREATE_EMPLOYEES_SQL: &str = "CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    name TEXT,
    job_title TEXT
)";

const CREATE_REVIEWS_SQL: &str = "CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY,
    year INTEGER,
    comment TEXT,
    employee_id INTEGER,
    FOREIGN KEY (employee_id) REFERENCES employees(id)
)";

pub fn create_employees_table(conn: &Connection) -> DbResult<()> {
    conn.execute(CREATE_EMPLOYEES_SQL, [])?;
    info!("event=schema_create module=db status=ok table={EMPLOYEES_TABLE}");
    Ok(())
}

pub fn drop_employees_table(conn: &Connection) -> DbResult<()> {
    conn.execute("DROP TABLE IF EXISTS employees", [])?;
    info!("event=schema_drop module=db status=ok table={EMPLOYEES_TABLE}");
    Ok(())
}

pub fn create_reviews_table(conn: &Connection) -> DbResult<()> {
    conn.execute(CREATE_REVIEWS_SQL, [])?;
    info!("event=schema_create module=db status=ok table={REVIEWS_TABLE}");
    Ok(())
}

pub fn drop_reviews_table(conn: &Connection) -> DbResult<()> {
    conn.execute("DROP TABLE IF EXISTS reviews", [])?;
    info!("event=schema_drop module=db status=ok table={REVIEWS_TABLE}");
    Ok(())
}

/// Creates both tables, parent first.
pub fn create_all(conn: &Connection) -> DbResult<()> {
    create_employees_table(conn)?;
    create_reviews_table(conn)
}

/// Drops both tables, child first.
pub fn drop_all(conn: &Connection) -> DbResult<()> {
    drop_reviews_table(conn)?;
    drop_employees_table(conn)
}

/// Returns whether a table with the given name exists.
pub fn table_exists(conn: &Connection, table_name: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table_name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
