//! Review use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or the identity cache.
//! - Edits validate every new value before any field changes.

use crate::model::employee::EmployeeId;
use crate::model::review::ReviewId;
use crate::repo::identity_map::ReviewHandle;
use crate::repo::review_repo::ReviewRepository;
use crate::repo::{RepoError, RepoResult};

/// Use-case service wrapper for review operations.
pub struct ReviewService<R: ReviewRepository> {
    repo: R,
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    /// Validates, persists and caches a new review.
    pub fn record_review(
        &mut self,
        year: i64,
        comment: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle> {
        self.repo.create(year, comment, employee_id)
    }

    pub fn get_review(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>> {
        self.repo.find_by_id(id)
    }

    pub fn reviews_for_employee(
        &mut self,
        employee_id: EmployeeId,
    ) -> RepoResult<Vec<ReviewHandle>> {
        self.repo.find_by_employee_id(employee_id)
    }

    /// Replaces year and comment of an existing review and persists them.
    ///
    /// Returns `NotFound` when no review has `id`.
    pub fn revise_review(
        &mut self,
        id: ReviewId,
        year: i64,
        comment: &str,
    ) -> RepoResult<ReviewHandle> {
        let review = self.require(id)?;
        {
            let mut editing = review
                .try_borrow_mut()
                .map_err(|_| RepoError::InstanceBorrowed { entity: "review" })?;
            editing.set_comment(comment)?;
            editing.set_year(year);
        }
        self.repo.update(&review)?;
        Ok(review)
    }

    /// Moves an existing review to another employee and persists it.
    pub fn reassign_review(
        &mut self,
        id: ReviewId,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle> {
        let review = self.require(id)?;
        self.repo.assign_employee(&review, employee_id)?;
        self.repo.update(&review)?;
        Ok(review)
    }

    /// Deletes an existing review; returns the detached instance.
    pub fn remove_review(&mut self, id: ReviewId) -> RepoResult<ReviewHandle> {
        let review = self.require(id)?;
        self.repo.delete(&review)?;
        Ok(review)
    }

    fn require(&mut self, id: ReviewId) -> RepoResult<ReviewHandle> {
        self.repo
            .find_by_id(id)?
            .ok_or(RepoError::NotFound { entity: "review", id })
    }
}
