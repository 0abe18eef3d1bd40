//! Per-bucket report compilation for drained readings.
//!
//! Compilation is a pure function over one drained batch: sort by value,
//! select the extremes, and locate the largest jump between value-adjacent
//! readings. Keeping it free of locks and clocks makes the selection rules
//! directly testable against fixed vectors.

use serde::Serialize;

use crate::collector::Reading;

/// How many readings each extreme selection keeps.
const EXTREME_COUNT: usize = 5;

/// The largest absolute difference between adjacent readings after sorting
/// by value.
///
/// `start` and `end` carry the timestamps of the two readings forming the
/// jump, in sorted-by-value order (which is unrelated to time order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaxJump {
    /// Timestamp of the lower-valued reading of the pair.
    pub start_ns: u64,
    /// Timestamp of the higher-valued reading of the pair.
    pub end_ns: u64,
    /// Absolute value difference across the pair.
    pub difference: f64,
}

/// Statistics compiled from one bucket's drained readings.
#[derive(Debug, Clone, Serialize)]
pub struct BucketReport {
    /// The bucket key these readings were drained for.
    pub bucket: u64,
    /// Number of readings the report was compiled from.
    sample_count: usize,
    /// Up to five highest-valued readings, ascending.
    pub highest: Vec<Reading>,
    /// Up to five lowest-valued readings, ascending.
    pub lowest: Vec<Reading>,
    /// Largest adjacent jump in the value-sorted sequence, if at least two
    /// readings exist.
    pub max_jump: Option<MaxJump>,
}

impl BucketReport {
    /// Returns the total number of readings this report was compiled from.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

/// Compiles a report from one drained batch of readings.
///
/// Selection rules:
/// - Readings are sorted ascending by value ([`f64::total_cmp`]; the stable
///   sort keeps drained order for equal values).
/// - `lowest` takes the first `min(5, n)` readings and `highest` the last
///   `min(5, n)`. With fewer than ten readings the two selections overlap;
///   that overlap is deliberate behavior, not an artifact to correct.
/// - `max_jump` scans adjacent pairs of the sorted sequence left to right and
///   keeps the first pair achieving the maximum absolute difference.
pub fn compile(bucket: u64, mut readings: Vec<Reading>) -> BucketReport {
    readings.sort_by(|a, b| a.value.total_cmp(&b.value));

    let take = readings.len().min(EXTREME_COUNT);
    let lowest = readings[..take].to_vec();
    let highest = readings[readings.len() - take..].to_vec();

    let mut max_jump: Option<MaxJump> = None;
    for pair in readings.windows(2) {
        let difference = (pair[1].value - pair[0].value).abs();
        let improves = max_jump.is_none_or(|best| difference > best.difference);
        if improves {
            max_jump = Some(MaxJump {
                start_ns: pair[0].timestamp_ns,
                end_ns: pair[1].timestamp_ns,
                difference,
            });
        }
    }

    BucketReport {
        bucket,
        sample_count: readings.len(),
        highest,
        lowest,
        max_jump,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: f64, timestamp_ns: u64) -> Reading {
        Reading {
            value,
            timestamp_ns,
        }
    }

    fn values(readings: &[Reading]) -> Vec<f64> {
        readings.iter().map(|r| r.value).collect()
    }

    #[test]
    fn test_extremes_overlap_below_ten_readings() {
        // Sorted ascending: [1, 1, 3, 5, 9, 9].
        let batch: Vec<Reading> = [5.0, 1.0, 9.0, 1.0, 9.0, 3.0]
            .iter()
            .enumerate()
            .map(|(i, v)| reading(*v, i as u64))
            .collect();

        let report = compile(0, batch);

        assert_eq!(values(&report.lowest), vec![1.0, 1.0, 3.0, 5.0, 9.0]);
        assert_eq!(values(&report.highest), vec![1.0, 3.0, 5.0, 9.0, 9.0]);
    }

    #[test]
    fn test_max_jump_keeps_first_maximal_pair() {
        // Sorted ascending: [1, 1, 3, 5, 9, 9]; adjacent differences
        // 0, 2, 2, 4, 0 -> the 5 -> 9 pair wins.
        let batch = vec![
            reading(5.0, 40),
            reading(1.0, 10),
            reading(9.0, 50),
            reading(1.0, 20),
            reading(9.0, 60),
            reading(3.0, 30),
        ];

        let jump = compile(0, batch).max_jump.unwrap();
        assert_eq!(jump.difference, 4.0);
        assert_eq!(jump.start_ns, 40); // the reading valued 5.0
        assert_eq!(jump.end_ns, 50); // the first reading valued 9.0
    }

    #[test]
    fn test_full_selections_do_not_overlap() {
        let batch: Vec<Reading> = (0..12u32).map(|i| reading(f64::from(i), u64::from(i))).collect();

        let report = compile(3, batch);
        assert_eq!(report.bucket, 3);
        assert_eq!(report.sample_count(), 12);
        assert_eq!(values(&report.lowest), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(values(&report.highest), vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_empty_batch() {
        let report = compile(7, Vec::new());
        assert_eq!(report.bucket, 7);
        assert!(report.lowest.is_empty());
        assert!(report.highest.is_empty());
        assert!(report.max_jump.is_none());
    }

    #[test]
    fn test_single_reading_has_no_jump() {
        let report = compile(0, vec![reading(42.0, 1)]);
        assert_eq!(values(&report.lowest), vec![42.0]);
        assert_eq!(values(&report.highest), vec![42.0]);
        assert!(report.max_jump.is_none());
    }

    #[test]
    fn test_equal_values_yield_zero_jump_on_first_pair() {
        let report = compile(0, vec![reading(2.0, 10), reading(2.0, 20), reading(2.0, 30)]);

        let jump = report.max_jump.unwrap();
        assert_eq!(jump.difference, 0.0);
        assert_eq!((jump.start_ns, jump.end_ns), (10, 20));
    }
}
