//! Review repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete over the `reviews` table.
//! - Reconcile every row read from storage with the identity cache.
//!
//! # Invariants
//! - A persisted review has exactly one live instance per repository; every
//!   read path goes through `instance_from_db`.
//! - `save` registers the instance only after the insert succeeded.
//! - `delete` evicts the cache entry and clears the instance id.
//! - The employee reference is checked when assigned, not on update.

use crate::db::schema;
use crate::model::employee::EmployeeId;
use crate::model::review::{Review, ReviewId};
use crate::repo::employee_repo::EmployeeLookup;
use crate::repo::identity_map::{ReviewCache, ReviewHandle};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row, ToSql};
use std::cell::{Ref, RefMut};
use std::rc::Rc;

const ENTITY: &str = "review";

/// Raw `reviews` row with untyped column values.
///
/// Only the id is typed: SQLite guarantees an integer rowid, while the
/// other columns may hold any storage class and are validated on reconcile.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub year: Value,
    pub comment: Value,
    pub employee_id: Value,
}

impl ReviewRow {
    pub fn new(
        id: ReviewId,
        year: impl Into<Value>,
        comment: impl Into<Value>,
        employee_id: impl Into<Value>,
    ) -> Self {
        Self {
            id,
            year: year.into(),
            comment: comment.into(),
            employee_id: employee_id.into(),
        }
    }

    fn from_sql_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            year: row.get("year")?,
            comment: row.get("comment")?,
            employee_id: row.get("employee_id")?,
        })
    }
}

/// Repository interface for review persistence with identity caching.
pub trait ReviewRepository {
    fn create_table(&self) -> RepoResult<()>;
    fn drop_table(&self) -> RepoResult<()>;

    /// Validated construction of an unsaved review.
    fn new_review(&self, year: i64, comment: &str, employee_id: EmployeeId) -> RepoResult<Review>;
    /// Inserts an unsaved review, assigns its id and caches it.
    fn save(&mut self, review: Review) -> RepoResult<ReviewHandle>;
    /// Writes current fields back to the row with the review's id.
    fn update(&self, review: &ReviewHandle) -> RepoResult<()>;
    /// Deletes the row, evicts the cached instance and clears its id.
    fn delete(&mut self, review: &ReviewHandle) -> RepoResult<()>;
    /// Validates and assigns a new employee reference without persisting it.
    fn assign_employee(&self, review: &ReviewHandle, employee_id: EmployeeId) -> RepoResult<()>;

    /// Returns the cached instance for `row.id`, refreshed from `row`, or
    /// caches a new one.
    fn instance_from_db(&mut self, row: ReviewRow) -> RepoResult<ReviewHandle>;
    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>>;
    /// Reviews for one employee in persisted (id) order.
    fn find_by_employee_id(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewHandle>>;
    fn find_all(&mut self) -> RepoResult<Vec<ReviewHandle>>;

    fn create(
        &mut self,
        year: i64,
        comment: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle> {
        let review = self.new_review(year, comment, employee_id)?;
        self.save(review)
    }
}

/// SQLite-backed review repository owning its identity cache.
pub struct SqliteReviewRepository<'conn, L: EmployeeLookup> {
    conn: &'conn Connection,
    employees: L,
    cache: ReviewCache,
}

impl<'conn, L: EmployeeLookup> SqliteReviewRepository<'conn, L> {
    /// Creates a repository with an empty identity cache.
    pub fn new(conn: &'conn Connection, employees: L) -> Self {
        Self {
            conn,
            employees,
            cache: ReviewCache::new(),
        }
    }

    /// Employee lookup used to validate references.
    pub fn employees(&self) -> &L {
        &self.employees
    }

    /// Returns the cached instance for `id` without touching storage.
    pub fn cached(&self, id: ReviewId) -> Option<ReviewHandle> {
        self.cache.get(id)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Detaches every cached instance; later reads build fresh ones.
    ///
    /// Handles obtained before the call stay usable. Deleting through one
    /// of them also detaches the fresh instance for the same id.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn load_rows(&self, sql: &str, params: &[&dyn ToSql]) -> RepoResult<Vec<ReviewRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, ReviewRow::from_sql_row)?;
        let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn reconcile_all(&mut self, rows: Vec<ReviewRow>) -> RepoResult<Vec<ReviewHandle>> {
        rows.into_iter()
            .map(|row| self.instance_from_db(row))
            .collect()
    }
}

impl<L: EmployeeLookup> ReviewRepository for SqliteReviewRepository<'_, L> {
    fn create_table(&self) -> RepoResult<()> {
        schema::create_reviews_table(self.conn)?;
        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        schema::drop_reviews_table(self.conn)?;
        Ok(())
    }

    fn new_review(&self, year: i64, comment: &str, employee_id: EmployeeId) -> RepoResult<Review> {
        Review::new(year, comment, employee_id, &self.employees)
    }

    fn save(&mut self, mut review: Review) -> RepoResult<ReviewHandle> {
        if let Some(id) = review.id() {
            return Err(RepoError::AlreadyPersisted { entity: ENTITY, id });
        }

        self.conn.execute(
            "INSERT INTO reviews (year, comment, employee_id) VALUES (?1, ?2, ?3)",
            params![review.year(), review.comment(), review.employee_id()],
        )?;
        let id = self.conn.last_insert_rowid();
        review.assign_id(id);

        debug!(
            "event=review_save module=repo status=ok id={id} employee_id={}",
            review.employee_id()
        );
        Ok(self.cache.register(id, review))
    }

    fn update(&self, review: &ReviewHandle) -> RepoResult<()> {
        let review = borrow(review)?;
        let id = review
            .id()
            .ok_or(RepoError::NotPersisted { entity: ENTITY })?;

        let changed = self.conn.execute(
            "UPDATE reviews SET year = ?1, comment = ?2, employee_id = ?3 WHERE id = ?4",
            params![review.year(), review.comment(), review.employee_id(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        debug!("event=review_update module=repo status=ok id={id}");
        Ok(())
    }

    fn delete(&mut self, review: &ReviewHandle) -> RepoResult<()> {
        let mut target = borrow_mut(review)?;
        let id = target
            .id()
            .ok_or(RepoError::NotPersisted { entity: ENTITY })?;

        // A handle kept across `clear_cache` may differ from the live cached
        // instance; both describe the deleted row and are detached together.
        let live = self
            .cache
            .get(id)
            .filter(|cached| !Rc::ptr_eq(cached, review));
        let mut live_review = live.as_ref().map(borrow_mut).transpose()?;

        let changed = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1", [id])?;
        self.cache.evict(id);
        target.clear_id();
        if let Some(live_review) = live_review.as_mut() {
            live_review.clear_id();
        }

        debug!("event=review_delete module=repo status=ok id={id} rows={changed}");
        Ok(())
    }

    fn assign_employee(&self, review: &ReviewHandle, employee_id: EmployeeId) -> RepoResult<()> {
        borrow_mut(review)?.set_employee_id(employee_id, &self.employees)
    }

    fn instance_from_db(&mut self, row: ReviewRow) -> RepoResult<ReviewHandle> {
        let ReviewRow {
            id,
            year,
            comment,
            employee_id,
        } = row;

        if let Some(cached) = self.cache.get(id) {
            borrow_mut(&cached)?.refresh_from_values(year, comment, employee_id, &self.employees)?;
            return Ok(cached);
        }

        let review = Review::from_values(Some(id), year, comment, employee_id, &self.employees)?;
        Ok(self.cache.register(id, review))
    }

    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>> {
        let row = self
            .load_rows("SELECT * FROM reviews WHERE id = ?1", params![id])?
            .into_iter()
            .next();

        row.map(|row| self.instance_from_db(row)).transpose()
    }

    fn find_by_employee_id(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewHandle>> {
        let rows = self.load_rows(
            "SELECT * FROM reviews WHERE employee_id = ?1 ORDER BY id",
            params![employee_id],
        )?;
        self.reconcile_all(rows)
    }

    fn find_all(&mut self) -> RepoResult<Vec<ReviewHandle>> {
        let rows = self.load_rows("SELECT * FROM reviews ORDER BY id", params![])?;
        self.reconcile_all(rows)
    }
}

fn borrow(review: &ReviewHandle) -> RepoResult<Ref<'_, Review>> {
    review.try_borrow().map_err(|_| RepoError::InstanceBorrowed { entity: ENTITY })
}

fn borrow_mut(review: &ReviewHandle) -> RepoResult<RefMut<'_, Review>> {
    review.try_borrow_mut().map_err(|_| RepoError::InstanceBorrowed { entity: ENTITY })
}
