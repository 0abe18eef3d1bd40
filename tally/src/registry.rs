//! Ordered registry: a sorted shared structure with keyed removal.
//!
//! The registry is the ordered instantiation of
//! [`SharedStore`](crate::store::SharedStore): items carry an integer key,
//! inserts splice into key order, and removals unlink the first item with an
//! exactly matching key. Traversing the registry always yields keys in
//! non-decreasing order, no matter how concurrent inserts interleave.
//!
//! The exchange harness drives the registry the way the shared-container
//! pattern is meant to be exercised: producer threads drain a fixed list of
//! insert requests while consumer threads drain a fixed list of removal
//! requests, with each work list locked independently of the registry itself.

use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{ConfigError, Result, StoreError};
use crate::store::{SharedStore, StoreCounts};
use crate::worklist::WorkList;

/// One registered item: an ordering key and an opaque payload.
///
/// The payload is owned by the registry from insertion until removal and is
/// dropped when its item is unlinked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryItem<P> {
    /// Sort and lookup key.
    pub key: u64,
    /// Caller-supplied payload; the registry never inspects it.
    pub payload: P,
}

/// Thread-safe registry of keyed items kept in non-decreasing key order.
///
/// # Example
///
/// ```rust
/// use tally::registry::OrderedRegistry;
///
/// # fn main() -> tally::Result<()> {
/// let registry = OrderedRegistry::new();
/// registry.insert(17, "payload")?;
/// registry.insert(3, "payload")?;
///
/// assert_eq!(registry.keys()?, vec![3, 17]);
/// assert!(registry.remove(17)?);
/// assert!(!registry.remove(17)?); // already gone: no-op
/// assert_eq!(registry.remaining_count()?, 1);
/// assert_eq!(registry.removed_count()?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OrderedRegistry<P> {
    store: SharedStore<RegistryItem<P>>,
}

impl<P> OrderedRegistry<P> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            store: SharedStore::ordered_by(|a, b| a.key.cmp(&b.key)),
        }
    }

    /// Bounds the registry to at most `capacity` resident items.
    #[must_use]
    pub fn with_capacity_bound(mut self, capacity: usize) -> Self {
        self.store = self.store.with_capacity_bound(capacity);
        self
    }

    /// Inserts an item at its key-ordered position.
    ///
    /// Position is found by linear scan: the item is spliced before the first
    /// resident item with a strictly greater key, so duplicate keys keep
    /// their arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] on a full bounded registry
    /// and [`StoreError::Poisoned`] if the registry lock is poisoned.
    pub fn insert(&self, key: u64, payload: P) -> Result<()> {
        self.store.insert(RegistryItem { key, payload })
    }

    /// Removes the first item whose key equals `key`, discarding its payload.
    ///
    /// Returns `Ok(true)` when an item was unlinked. An absent key is a valid
    /// no-op returning `Ok(false)`; no counter changes. The lookup is a
    /// linear scan, so lock hold time grows with registry size.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the registry lock is poisoned.
    pub fn remove(&self, key: u64) -> Result<bool> {
        self.store.remove_first(|item| item.key == key)
    }

    /// Returns a snapshot of resident keys in traversal order.
    ///
    /// The returned sequence is always non-decreasing; this is the
    /// registry's core invariant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the registry lock is poisoned.
    pub fn keys(&self) -> Result<Vec<u64>> {
        self.store.map_snapshot(|item| item.key)
    }

    /// Returns the number of resident items.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the registry lock is poisoned.
    pub fn remaining_count(&self) -> Result<u64> {
        Ok(self.store.counts()?.remaining)
    }

    /// Returns the number of items removed so far.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the registry lock is poisoned.
    pub fn removed_count(&self) -> Result<u64> {
        Ok(self.store.counts()?.removed)
    }

    /// Returns the number of items ever inserted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the registry lock is poisoned.
    pub fn inserted_count(&self) -> Result<u64> {
        Ok(self.store.counts()?.inserted)
    }

    /// Reads all three counters in one critical section.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the registry lock is poisoned.
    pub fn counts(&self) -> Result<StoreCounts> {
        self.store.counts()
    }
}

impl<P> Default for OrderedRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker-thread configuration for an exchange run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Number of threads draining the insert work list.
    pub producers: usize,
    /// Number of threads draining the removal work list.
    pub consumers: usize,
}

impl ExchangeConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoWorkers`] if either role has zero threads.
    pub fn validate(&self) -> Result<()> {
        if self.producers == 0 {
            return Err(ConfigError::NoWorkers {
                role: "producer".to_string(),
            }
            .into());
        }
        if self.consumers == 0 {
            return Err(ConfigError::NoWorkers {
                role: "consumer".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Outcome of an exchange run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExchangeSummary {
    /// Items inserted into the registry.
    pub inserted: u64,
    /// Removal requests that found and unlinked an item.
    pub removed: u64,
    /// Items still resident when the run finished.
    pub remaining: u64,
    /// Wall-clock duration of the worker phase.
    pub elapsed: Duration,
}

/// Runs a full exchange: producers insert, consumers remove, both racing.
///
/// `inserts` and `removals` are fixed request lists, each drained through its
/// own [`WorkList`] lock; the registry's internal lock is a third, independent
/// critical section. Producer threads pop `(key, payload)` requests and
/// insert them; consumer threads pop keys and remove them. A removal whose
/// key has not been inserted yet (or never will be) is a no-op, so the final
/// counts depend on scheduling; the conservation identity
/// `remaining + removed == inserted` does not.
///
/// All workers are joined before returning.
///
/// # Errors
///
/// Returns [`ConfigError`] for invalid configuration, or the first store
/// error any worker encountered.
pub fn run_exchange<P: Send>(
    config: &ExchangeConfig,
    inserts: Vec<(u64, P)>,
    removals: Vec<u64>,
) -> Result<ExchangeSummary> {
    config.validate()?;

    let registry: OrderedRegistry<P> = OrderedRegistry::new();
    let insert_work = WorkList::new(inserts);
    let removal_work = WorkList::new(removals);

    let started = Instant::now();
    let mut worker_results: Vec<Result<()>> = Vec::new();

    thread::scope(|s| {
        let mut handles = Vec::with_capacity(config.producers + config.consumers);

        for _ in 0..config.producers {
            let registry = &registry;
            let insert_work = &insert_work;
            handles.push(s.spawn(move || -> Result<()> {
                while let Some((key, payload)) = insert_work.pop()? {
                    registry.insert(key, payload)?;
                }
                Ok(())
            }));
        }

        for _ in 0..config.consumers {
            let registry = &registry;
            let removal_work = &removal_work;
            handles.push(s.spawn(move || -> Result<()> {
                while let Some(key) = removal_work.pop()? {
                    registry.remove(key)?;
                }
                Ok(())
            }));
        }

        for handle in handles {
            // Workers only exit through their Result; a panic here can only
            // mean a lock was poisoned out from under them.
            worker_results.push(
                handle
                    .join()
                    .unwrap_or(Err(StoreError::Poisoned.into())),
            );
        }
    });

    let elapsed = started.elapsed();
    for result in worker_results {
        result?;
    }

    let counts = registry.counts()?;
    tracing::debug!(
        "exchange done in {elapsed:?}: {} inserted, {} removed, {} remaining",
        counts.inserted,
        counts.removed,
        counts.remaining
    );

    Ok(ExchangeSummary {
        inserted: counts.inserted,
        removed: counts.removed,
        remaining: counts.remaining,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_keys_sorted() {
        let registry = OrderedRegistry::new();
        for key in [50, 10, 30, 20, 40, 30] {
            registry.insert(key, ()).unwrap();
        }

        assert_eq!(registry.keys().unwrap(), vec![10, 20, 30, 30, 40, 50]);
    }

    #[test]
    fn test_remove_exact_key_updates_counters() {
        let registry = OrderedRegistry::new();
        registry.insert(1, "a").unwrap();
        registry.insert(2, "b").unwrap();

        assert!(registry.remove(1).unwrap());
        assert_eq!(registry.remaining_count().unwrap(), 1);
        assert_eq!(registry.removed_count().unwrap(), 1);
        assert_eq!(registry.inserted_count().unwrap(), 2);
        assert_eq!(registry.keys().unwrap(), vec![2]);
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let registry = OrderedRegistry::new();
        registry.insert(5, ()).unwrap();

        let before = registry.counts().unwrap();
        assert!(!registry.remove(6).unwrap());
        assert_eq!(registry.counts().unwrap(), before);
    }

    #[test]
    fn test_duplicate_keys_removed_one_at_a_time() {
        let registry = OrderedRegistry::new();
        registry.insert(9, ()).unwrap();
        registry.insert(9, ()).unwrap();

        assert!(registry.remove(9).unwrap());
        assert_eq!(registry.keys().unwrap(), vec![9]);
        assert!(registry.remove(9).unwrap());
        assert!(!registry.remove(9).unwrap());
    }

    #[test]
    fn test_capacity_bound_applies() {
        let registry = OrderedRegistry::new().with_capacity_bound(1);
        registry.insert(1, ()).unwrap();
        assert!(registry.insert(2, ()).is_err());

        // Removal frees the slot again.
        assert!(registry.remove(1).unwrap());
        registry.insert(2, ()).unwrap();
        assert_eq!(registry.keys().unwrap(), vec![2]);
    }

    #[test]
    fn test_exchange_config_validation() {
        assert!(
            ExchangeConfig {
                producers: 1,
                consumers: 1
            }
            .validate()
            .is_ok()
        );
        assert!(
            ExchangeConfig {
                producers: 0,
                consumers: 1
            }
            .validate()
            .is_err()
        );
        assert!(
            ExchangeConfig {
                producers: 1,
                consumers: 0
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_exchange_conserves_items() {
        let config = ExchangeConfig {
            producers: 2,
            consumers: 2,
        };
        let inserts: Vec<(u64, ())> = (1..=500).map(|k| (k, ())).collect();
        let removals: Vec<u64> = (1..=500).collect();

        let summary = run_exchange(&config, inserts, removals).unwrap();

        assert_eq!(summary.inserted, 500);
        assert_eq!(summary.remaining + summary.removed, summary.inserted);
    }
}
