//! Concurrent reading collector: many sensors, one reporter.
//!
//! The collector is the arrival-order instantiation of
//! [`SharedStore`](crate::store::SharedStore): sensor threads append
//! timestamped scalar readings, and a reporter periodically drains the
//! readings belonging to the current time bucket and compiles them into a
//! [`BucketReport`].
//!
//! # Bucketing
//!
//! A reading's bucket key is its timestamp integer-divided by the configured
//! bucket interval. The mechanism is a plain truncation; the interval itself
//! is configuration, so a simulation can use second-sized buckets while a
//! deployment uses hours.
//!
//! # Shutdown
//!
//! Sensor loops have no natural end. [`run_simulation`] hands every sensor a
//! clone of a [`Shutdown`] token, and the reporter signals it after its last
//! cycle; the scope then joins all sensors and the reports are returned to
//! the caller. No code path terminates the process.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::report::{self, BucketReport};
use crate::shutdown::Shutdown;
use crate::store::{SharedStore, StoreCounts};

/// One timestamped scalar reading.
///
/// Immutable once created; a reading is owned by the collector from
/// [`ReadingCollector::record`] until a drain hands it to a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// The sampled value.
    pub value: f64,
    /// Wall-clock timestamp, nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
}

/// Returns current wall-clock time as nanoseconds since epoch.
pub fn now_ns() -> u64 {
    let dur = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    dur.as_secs() * 1_000_000_000 + u64::from(dur.subsec_nanos())
}

/// Configuration for a collector simulation run.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tally::collector::CollectorConfig;
///
/// let config = CollectorConfig {
///     sensors: 8,
///     cadence: Duration::from_millis(50),
///     bucket_interval: Duration::from_secs(1),
///     report_cycles: 10,
///     report_interval: Duration::from_millis(200),
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Number of sensor threads to run.
    pub sensors: usize,

    /// Pause between consecutive samples on each sensor.
    pub cadence: Duration,

    /// Width of one reporting bucket.
    ///
    /// Readings whose truncated timestamps land in the same interval share a
    /// bucket key and are drained together.
    pub bucket_interval: Duration,

    /// Number of reports the reporter compiles before signalling shutdown.
    pub report_cycles: usize,

    /// Pause before each report cycle.
    pub report_interval: Duration,
}

impl CollectorConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the sensor count, bucket interval, or
    /// report cycle count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.sensors == 0 {
            return Err(ConfigError::NoSensors.into());
        }
        if self.bucket_interval.is_zero() {
            return Err(ConfigError::ZeroBucketInterval.into());
        }
        if self.report_cycles == 0 {
            return Err(ConfigError::ZeroReportCycles.into());
        }
        Ok(())
    }
}

/// Thread-safe collection of timestamped readings, drained by bucket.
///
/// All methods take `&self`; share the collector across threads by reference
/// or `Arc`.
#[derive(Debug)]
pub struct ReadingCollector {
    /// Arrival-order shared store; drained order is interleaving order and
    /// report compilation re-sorts by value.
    store: SharedStore<Reading>,
    /// Bucket width in nanoseconds, never zero.
    bucket_interval_ns: u64,
}

impl ReadingCollector {
    /// Creates a collector with the given bucket interval.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBucketInterval`] if the interval is zero.
    pub fn new(bucket_interval: Duration) -> Result<Self> {
        if bucket_interval.is_zero() {
            return Err(ConfigError::ZeroBucketInterval.into());
        }
        #[allow(clippy::cast_possible_truncation)] // practical intervals fit in u64 nanos
        let bucket_interval_ns = bucket_interval.as_nanos() as u64;
        Ok(Self {
            store: SharedStore::arrival(),
            bucket_interval_ns,
        })
    }

    /// Bounds the collector to at most `capacity` undrained readings.
    #[must_use]
    pub fn with_capacity_bound(mut self, capacity: usize) -> Self {
        self.store = self.store.with_capacity_bound(capacity);
        self
    }

    /// Returns the bucket key a timestamp belongs to.
    pub fn bucket_of(&self, timestamp_ns: u64) -> u64 {
        timestamp_ns / self.bucket_interval_ns
    }

    /// Records one reading.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::CapacityExceeded`] on a full bounded
    /// collector and [`crate::StoreError::Poisoned`] if the store lock is
    /// poisoned. A failed record leaves the collector untouched.
    pub fn record(&self, value: f64, timestamp_ns: u64) -> Result<()> {
        self.store.insert(Reading {
            value,
            timestamp_ns,
        })
    }

    /// Drains every reading whose bucket key equals `bucket`.
    ///
    /// Readings in other buckets stay resident. The drained sequence is in
    /// arrival order; each drained reading belongs to exactly one drain.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Poisoned`] if the store lock is poisoned.
    pub fn drain_bucket(&self, bucket: u64) -> Result<Vec<Reading>> {
        self.store
            .extract_matching(|reading| reading.timestamp_ns / self.bucket_interval_ns == bucket)
    }

    /// Returns the number of undrained readings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Poisoned`] if the store lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        self.store.len()
    }

    /// Returns `true` if no readings are resident.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Poisoned`] if the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        self.store.is_empty()
    }

    /// Reads the collector's counters in one critical section.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Poisoned`] if the store lock is poisoned.
    pub fn counts(&self) -> Result<StoreCounts> {
        self.store.counts()
    }
}

/// Runs a full collector simulation and returns the compiled reports.
///
/// Spawns `config.sensors` sensor threads, each looping sample → record →
/// sleep until shutdown is signalled. The reporter runs `config.report_cycles`
/// cycles on the calling thread; each cycle sleeps, drains the bucket the
/// current wall-clock time falls in, and compiles a [`BucketReport`]. After
/// the last cycle the shutdown token is signalled and all sensors join before
/// this function returns.
///
/// `make_sampler` is called once per sensor with the sensor index and must
/// return that sensor's value source. Keeping value generation outside the
/// library makes runs deterministic under test.
///
/// A sensor that fails to record logs a warning and exits its loop instead of
/// panicking; the reporter's own errors are propagated to the caller.
///
/// # Errors
///
/// Returns [`ConfigError`] for invalid configuration, or a store error if a
/// reporter-side drain fails.
pub fn run_simulation<S>(
    config: &CollectorConfig,
    mut make_sampler: impl FnMut(usize) -> S,
) -> Result<Vec<BucketReport>>
where
    S: FnMut() -> f64 + Send,
{
    config.validate()?;

    let collector = ReadingCollector::new(config.bucket_interval)?;
    let shutdown = Shutdown::new();
    let mut reports = Vec::with_capacity(config.report_cycles);
    let mut reporter_result: Result<()> = Ok(());

    thread::scope(|s| {
        for sensor in 0..config.sensors {
            let mut sample = make_sampler(sensor);
            let sensor_shutdown = shutdown.clone();
            let collector = &collector;
            let cadence = config.cadence;

            s.spawn(move || {
                while !sensor_shutdown.is_signalled() {
                    // Best-effort: a failed record means the collector is
                    // unusable for this sensor, not grounds for a panic.
                    if let Err(e) = collector.record(sample(), now_ns()) {
                        tracing::warn!("sensor {sensor} stopping: {e}");
                        break;
                    }
                    thread::sleep(cadence);
                }
            });
        }

        for cycle in 0..config.report_cycles {
            thread::sleep(config.report_interval);

            let bucket = collector.bucket_of(now_ns());
            match collector.drain_bucket(bucket) {
                Ok(batch) => {
                    let report = report::compile(bucket, batch);
                    tracing::debug!(
                        "cycle {cycle}: bucket {bucket}, {} reading(s)",
                        report.sample_count()
                    );
                    reports.push(report);
                }
                Err(e) => {
                    reporter_result = Err(e);
                    break;
                }
            }
        }

        shutdown.signal();
    });

    reporter_result?;
    Ok(reports)
}
