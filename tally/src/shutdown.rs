//! Cooperative shutdown signalling for producer threads.
//!
//! Producer loops in this crate have no natural termination: a sensor keeps
//! sampling until told to stop. [`Shutdown`] is the explicit stop signal the
//! loops check each iteration, so a simulation always returns control to the
//! caller instead of exiting the process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable one-way shutdown token.
///
/// All clones observe the same flag. Once signalled it stays signalled;
/// there is no reset.
///
/// # Example
///
/// ```rust
/// use tally::shutdown::Shutdown;
///
/// let shutdown = Shutdown::new();
/// let worker_view = shutdown.clone();
///
/// assert!(!worker_view.is_signalled());
/// shutdown.signal();
/// assert!(worker_view.is_signalled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    /// Creates a new, unsignalled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals shutdown to every clone of this token.
    pub fn signal(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns `true` once any clone has signalled.
    pub fn is_signalled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_visible_across_clones() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();

        assert!(!shutdown.is_signalled());
        clone.signal();
        assert!(shutdown.is_signalled());
        assert!(clone.is_signalled());
    }

    #[test]
    fn test_signal_stops_a_worker_loop() {
        let shutdown = Shutdown::new();
        let counter = std::sync::atomic::AtomicU64::new(0);

        std::thread::scope(|s| {
            let worker_shutdown = shutdown.clone();
            let counter = &counter;
            s.spawn(move || {
                while !worker_shutdown.is_signalled() {
                    counter.fetch_add(1, Ordering::Relaxed);
                    std::thread::yield_now();
                }
            });

            while counter.load(Ordering::Relaxed) < 100 {
                std::thread::yield_now();
            }
            shutdown.signal();
        });

        // Scope exit proves the worker terminated.
        assert!(shutdown.is_signalled());
    }
}
