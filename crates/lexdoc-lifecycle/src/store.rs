//! # In-Memory Stores
//!
//! `Store<K, T>` is the keyed record store every component uses.
//! `DocumentGate` is the per-document critical section: version-number
//! allocation, lock acquisition, signing and archival for one document run
//! one at a time, while different documents proceed in parallel.
//!
//! All locks are `parking_lot` and never held across `.await`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use lexdoc_core::DocumentId;
use parking_lot::{Mutex, RwLock};

/// Thread-safe, cloneable in-memory key-value store.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K, T> Default for Store<K, T> {
    fn default() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, T> Store<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    pub fn keys(&self) -> Vec<K> {
        self.data.read().keys().cloned().collect()
    }

    /// Records matching a predicate, cloned under one read lock.
    pub fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| pred(v))
            .cloned()
            .collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if
    /// not found.
    pub fn update(&self, id: &K, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    /// Run `f` on a record under the write lock and return its result.
    pub fn modify<R>(&self, id: &K, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.data.write().get_mut(id).map(f)
    }

    /// Atomically read-validate-update a record under one write lock.
    ///
    /// The closure must leave the record untouched when it returns `Err`.
    /// Returns `None` if the record doesn't exist.
    pub fn try_update<R, E>(
        &self,
        id: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Insert-or-modify under one write lock.
    pub fn upsert(&self, id: K, init: impl FnOnce() -> T, f: impl FnOnce(&mut T)) {
        let mut guard = self.data.write();
        f(guard.entry(id).or_insert_with(init));
    }

    pub fn remove(&self, id: &K) -> Option<T> {
        self.data.write().remove(id)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.data.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-document mutual exclusion, keyed by document id.
#[derive(Debug, Clone, Default)]
pub struct DocumentGate {
    slots: Arc<Mutex<HashMap<DocumentId, Arc<Mutex<()>>>>>,
}

impl DocumentGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the document's critical section.
    ///
    /// Not reentrant: `f` must not call back into anything that enters the
    /// gate for the same document.
    pub fn with<R>(&self, document_id: DocumentId, f: impl FnOnce() -> R) -> R {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(document_id).or_default())
        };
        let _guard = slot.lock();
        f()
    }
}
