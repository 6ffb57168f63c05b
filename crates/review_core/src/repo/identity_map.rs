//! Identity cache keyed by persisted id.
//!
//! # Responsibility
//! - Hold the single shared in-memory instance for each persisted row.
//!
//! # Invariants
//! - At most one entry per id; handles returned for the same id are
//!   pointer-equal (`Rc::ptr_eq`).
//! - The cache is `!Send`; it belongs to one repository on one thread.

use crate::model::review::Review;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a live, cached record.
pub type Handle<T> = Rc<RefCell<T>>;

pub type ReviewHandle = Handle<Review>;
pub type ReviewCache = IdentityMap<Review>;

#[derive(Debug)]
pub struct IdentityMap<T> {
    entries: HashMap<i64, Handle<T>>,
}

impl<T> Default for IdentityMap<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> IdentityMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new handle to the cached instance, if any.
    pub fn get(&self, id: i64) -> Option<Handle<T>> {
        self.entries.get(&id).map(Rc::clone)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Registers `value` under `id` and returns its handle.
    ///
    /// Replaces (and detaches) any previous instance for the same id.
    pub fn register(&mut self, id: i64, value: T) -> Handle<T> {
        let handle = Rc::new(RefCell::new(value));
        self.entries.insert(id, Rc::clone(&handle));
        handle
    }

    pub fn evict(&mut self, id: i64) -> Option<Handle<T>> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
