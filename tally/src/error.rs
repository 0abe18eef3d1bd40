//! Error types for the tally shared-container library.

use thiserror::Error;

/// The main error type for all tally operations.
///
/// This enum covers all error conditions that can occur when operating on a
/// shared store, from configuration validation through concurrent mutation.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Error raised by a shared store operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error during configuration validation.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur during shared store operations.
///
/// Note the deliberate asymmetry with "not found" outcomes: removing an
/// absent key and draining an empty container are valid results, not errors,
/// and are reported through return values instead of this enum.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A bounded store is full and cannot accept another item.
    ///
    /// The store is left untouched: a rejected insert mutates nothing,
    /// including the insert counter.
    #[error("store capacity ({capacity}) exceeded")]
    CapacityExceeded {
        /// The configured capacity bound.
        capacity: usize,
    },

    /// The store mutex was poisoned by a thread that panicked while
    /// holding the lock.
    ///
    /// The container contents can no longer be trusted to satisfy their
    /// ordering and conservation invariants, so every subsequent operation
    /// reports this error instead of panicking in turn.
    #[error("store lock poisoned by a panicked thread")]
    Poisoned,
}

/// Errors that can occur during simulation configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A collector simulation was configured with zero sensor threads.
    #[error("sensor count must be > 0")]
    NoSensors,

    /// The bucket interval is zero, which would make every bucket key
    /// division undefined.
    #[error("bucket interval must be non-zero")]
    ZeroBucketInterval,

    /// The reporter was asked to run zero cycles, so the simulation would
    /// never produce output or signal shutdown.
    #[error("report cycle count must be > 0")]
    ZeroReportCycles,

    /// An exchange was configured with zero worker threads for a role.
    #[error("{role} thread count must be > 0")]
    NoWorkers {
        /// Which worker role was configured to zero ("producer" or "consumer").
        role: String,
    },
}

/// Type alias for `Result<T, TallyError>`.
pub type Result<T> = std::result::Result<T, TallyError>;
