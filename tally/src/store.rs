//! The mutex-guarded shared container primitive.
//!
//! This module provides [`SharedStore`], the single building block the rest of
//! the crate is assembled from: a container guarded by exactly one
//! [`std::sync::Mutex`], offering atomic insert, atomic predicate-based
//! extraction, and atomic first-match removal under concurrent access from any
//! number of producer and consumer threads.
//!
//! # Design
//!
//! - One lock per store. Every operation takes it for the full duration of the
//!   mutation, so operations on the same store never interleave. There is no
//!   sharding and no lock-free path; the store trades throughput for a
//!   correctness argument that fits in one screen.
//! - The insert/removal counters live inside the same exclusive region as the
//!   items they describe, so the conservation identity
//!   `remaining + removed == inserted` holds at every observable instant.
//! - Ordered stores keep their backing `Vec` sorted by splicing each new item
//!   before the first existing item that compares greater. Traversal order is
//!   therefore non-decreasing regardless of how concurrent inserts interleave.
//!
//! # Cost model
//!
//! [`SharedStore::extract_matching`] and [`SharedStore::remove_first`] scan
//! the whole container while holding the lock, so their lock hold time grows
//! linearly with container size. Ordered inserts pay the same linear scan to
//! find their splice position. Callers that care about tail latency should
//! keep stores small or drain them often.

use std::cmp::Ordering;
use std::mem;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, StoreError};

/// Comparator used by ordered stores to place new items.
pub type Compare<T> = fn(&T, &T) -> Ordering;

/// A thread-safe container guarded by a single mutex.
///
/// `SharedStore` is shared between threads by reference (typically via
/// `Arc` or a [`std::thread::scope`] borrow); all methods take `&self`.
///
/// # Example
///
/// ```rust
/// use tally::store::SharedStore;
///
/// # fn main() -> tally::Result<()> {
/// let store: SharedStore<u64> = SharedStore::ordered_by(|a, b| a.cmp(b));
///
/// store.insert(30)?;
/// store.insert(10)?;
/// store.insert(20)?;
///
/// assert_eq!(store.snapshot()?, vec![10, 20, 30]);
/// assert!(store.remove_first(|item| *item == 20)?);
/// assert!(!store.remove_first(|item| *item == 99)?); // absent: no-op
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SharedStore<T> {
    /// All mutable state, behind the store's one lock.
    inner: Mutex<StoreInner<T>>,
    /// Ordering invariant to preserve on insert, if any.
    compare: Option<Compare<T>>,
    /// Upper bound on resident items, if any.
    capacity: Option<usize>,
}

/// State protected by the store mutex.
#[derive(Debug)]
struct StoreInner<T> {
    /// Resident items, in traversal order.
    items: Vec<T>,
    /// Items ever accepted by `insert`.
    inserted: u64,
    /// Items that left via `extract_matching` or `remove_first`.
    removed: u64,
}

/// A consistent snapshot of the store's counters, taken under the lock.
///
/// Because all three values are read inside one critical section, the
/// conservation identity `remaining + removed == inserted` always holds for
/// a given snapshot, even while other threads keep mutating the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    /// Items ever accepted by insert.
    pub inserted: u64,
    /// Items currently resident.
    pub remaining: u64,
    /// Items that have been extracted or removed.
    pub removed: u64,
}

impl<T> SharedStore<T> {
    /// Creates an unbounded store with no ordering invariant.
    ///
    /// Inserts append; traversal order is whatever interleaving the producer
    /// threads happened to produce, and callers needing a particular order
    /// must sort after extraction.
    pub fn arrival() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                items: Vec::new(),
                inserted: 0,
                removed: 0,
            }),
            compare: None,
            capacity: None,
        }
    }

    /// Creates an unbounded store whose traversal order is kept
    /// non-decreasing under `compare`.
    ///
    /// Each insert splices the new item before the first resident item that
    /// compares [`Ordering::Greater`], so equal keys keep their insertion
    /// order relative to each other.
    pub fn ordered_by(compare: Compare<T>) -> Self {
        Self {
            compare: Some(compare),
            ..Self::arrival()
        }
    }

    /// Bounds the store to at most `capacity` resident items.
    ///
    /// A full store rejects inserts with [`StoreError::CapacityExceeded`]
    /// instead of growing; extraction and removal free capacity again.
    #[must_use]
    pub fn with_capacity_bound(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Acquires the store lock, surfacing poisoning as an explicit error.
    fn lock(&self) -> std::result::Result<MutexGuard<'_, StoreInner<T>>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Inserts one item, preserving the store's ordering invariant.
    ///
    /// The mutation is all-or-nothing: a rejected insert leaves the items and
    /// every counter exactly as they were.
    ///
    /// # Errors
    ///
    /// - [`StoreError::CapacityExceeded`] if the store is bounded and full.
    /// - [`StoreError::Poisoned`] if a previous holder of the lock panicked.
    pub fn insert(&self, item: T) -> Result<()> {
        let mut inner = self.lock()?;

        if let Some(capacity) = self.capacity
            && inner.items.len() >= capacity
        {
            return Err(StoreError::CapacityExceeded { capacity }.into());
        }

        match self.compare {
            None => inner.items.push(item),
            Some(compare) => {
                // First resident item strictly greater than the new one;
                // splicing before it keeps equal keys in arrival order.
                let position = inner
                    .items
                    .iter()
                    .position(|existing| compare(existing, &item) == Ordering::Greater)
                    .unwrap_or(inner.items.len());
                inner.items.insert(position, item);
            }
        }

        inner.inserted += 1;
        Ok(())
    }

    /// Extracts every resident item matching `predicate`, in traversal order.
    ///
    /// The backing storage is partitioned in a single pass: matching items are
    /// returned, non-matching items become the new container contents. Every
    /// item present at the instant of the call is classified exactly once;
    /// none are duplicated or lost. An empty result is a valid outcome.
    ///
    /// Lock hold time is linear in container size.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn extract_matching(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<Vec<T>> {
        let mut inner = self.lock()?;

        let drained = mem::take(&mut inner.items);
        let mut matching = Vec::new();
        let mut kept = Vec::with_capacity(drained.len());

        for item in drained {
            if predicate(&item) {
                matching.push(item);
            } else {
                kept.push(item);
            }
        }

        inner.items = kept;
        inner.removed += matching.len() as u64;
        Ok(matching)
    }

    /// Removes the first resident item matching `predicate`.
    ///
    /// Returns `Ok(true)` if an item was found and unlinked, `Ok(false)` if
    /// nothing matched. An absent match is a no-op: no items move and no
    /// counter changes. Lock hold time is linear in container size.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn remove_first(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<bool> {
        let mut inner = self.lock()?;

        match inner.items.iter().position(|item| predicate(item)) {
            Some(position) => {
                inner.items.remove(position);
                inner.removed += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the number of resident items.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.items.len())
    }

    /// Returns `true` if no items are resident.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.items.is_empty())
    }

    /// Reads all three counters in one critical section.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn counts(&self) -> Result<StoreCounts> {
        let inner = self.lock()?;
        Ok(StoreCounts {
            inserted: inner.inserted,
            remaining: inner.items.len() as u64,
            removed: inner.removed,
        })
    }

    /// Applies `f` to each resident item in traversal order, collecting the
    /// results, all under one lock acquisition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn map_snapshot<U>(&self, f: impl FnMut(&T) -> U) -> Result<Vec<U>> {
        Ok(self.lock()?.items.iter().map(f).collect())
    }
}

impl<T: Clone> SharedStore<T> {
    /// Clones the resident items in traversal order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Vec<T>> {
        Ok(self.lock()?.items.clone())
    }
}
