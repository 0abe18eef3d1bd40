//! # tally
//!
//! Mutex-guarded shared containers for multi-threaded producer/consumer
//! workloads.
//!
//! tally is a small Rust library built around one primitive: a container
//! guarded by a single mutex, offering atomic insert, atomic predicate-based
//! extraction, and atomic keyed removal, with its counters kept inside the
//! same critical section so conservation arithmetic always balances. Two
//! instantiations ship with the crate:
//!
//! - a **reading collector** — concurrent sensor threads append timestamped
//!   readings, a reporter drains them by time bucket and compiles extreme
//!   values and the largest adjacent jump into a report;
//! - an **ordered registry** — concurrent producers insert keyed items into a
//!   structure kept sorted, concurrent consumers remove items by exact key,
//!   with an absent key a harmless no-op.
//!
//! ## Key Properties
//!
//! - One lock per container; operations never interleave, no lost updates
//! - Counters live with the items: `remaining + removed == inserted` holds at
//!   every observable instant
//! - Cooperative shutdown tokens instead of unbounded loops or process exit
//! - Not-found and empty outcomes are values, not errors
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use tally::{CollectorConfig, collector};
//!
//! # fn main() -> tally::Result<()> {
//! let config = CollectorConfig {
//!     sensors: 8,
//!     cadence: Duration::from_millis(1),
//!     bucket_interval: Duration::from_secs(3600),
//!     report_cycles: 2,
//!     report_interval: Duration::from_millis(5),
//! };
//!
//! // Deterministic sampler per sensor; the CLI plugs in a random one.
//! let reports = collector::run_simulation(&config, |sensor| {
//!     move || sensor as f64
//! })?;
//!
//! assert_eq!(reports.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`store`] — the mutex-guarded shared container primitive
//! - [`collector`] — reading collector and simulation harness
//! - [`report`] — per-bucket report compilation
//! - [`registry`] — ordered registry and exchange harness
//! - [`worklist`] — independently locked work lists for exchange workers
//! - [`shutdown`] — cooperative cancellation token
//! - [`error`] — error types

pub mod collector;
pub mod error;
pub mod registry;
pub mod report;
pub mod shutdown;
pub mod store;
pub mod worklist;

// Re-export primary API types at crate root for convenience.
pub use collector::{CollectorConfig, Reading, ReadingCollector};
pub use error::{ConfigError, Result, StoreError, TallyError};
pub use registry::{ExchangeConfig, ExchangeSummary, OrderedRegistry};
pub use report::{BucketReport, MaxJump};
pub use shutdown::Shutdown;
pub use store::{SharedStore, StoreCounts};
pub use worklist::WorkList;
