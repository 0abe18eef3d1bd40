//! Fixed work lists drained by competing worker threads.
//!
//! An exchange run feeds its producers and consumers from pre-filled request
//! lists. Each list is its own shared resource with its own lock, independent
//! of the registry lock the workers mutate afterwards, so a run has exactly
//! two kinds of critical section: one for claiming work, one for applying it.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{Result, StoreError};

/// A mutex-guarded FIFO work list.
///
/// Workers call [`WorkList::pop`] until it returns `None`, which doubles as
/// the termination signal: a drained list means the worker is done.
#[derive(Debug)]
pub struct WorkList<T> {
    queue: Mutex<VecDeque<T>>,
}

impl<T> WorkList<T> {
    /// Builds a work list from the given requests, drained front to back.
    pub fn new(requests: impl IntoIterator<Item = T>) -> Self {
        Self {
            queue: Mutex::new(requests.into_iter().collect()),
        }
    }

    /// Claims the next request, or `None` if the list is drained.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if a worker panicked while holding
    /// the list lock.
    pub fn pop(&self) -> Result<Option<T>> {
        let mut queue = self.queue.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(queue.pop_front())
    }

    /// Returns the number of unclaimed requests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the list lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        let queue = self.queue.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(queue.len())
    }

    /// Returns `true` if every request has been claimed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the list lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_drains_in_fifo_order() {
        let list = WorkList::new([1, 2, 3]);
        assert_eq!(list.pop().unwrap(), Some(1));
        assert_eq!(list.pop().unwrap(), Some(2));
        assert_eq!(list.pop().unwrap(), Some(3));
        assert_eq!(list.pop().unwrap(), None);
    }

    #[test]
    fn test_concurrent_workers_claim_each_request_once() {
        let list = WorkList::new(0..10_000u32);
        let claimed = Mutex::new(Vec::new());

        std::thread::scope(|s| {
            for _ in 0..4 {
                let list = &list;
                let claimed = &claimed;
                s.spawn(move || {
                    let mut local = Vec::new();
                    while let Some(request) = list.pop().unwrap() {
                        local.push(request);
                    }
                    claimed.lock().unwrap().extend(local);
                });
            }
        });

        let mut all = claimed.into_inner().unwrap();
        all.sort_unstable();
        let expected: Vec<u32> = (0..10_000).collect();
        assert_eq!(all, expected);
        assert!(list.is_empty().unwrap());
    }
}
