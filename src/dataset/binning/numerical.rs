//! Numerical feature binning.
//!
//! Thresholds are learned from the non-missing values of a column. Columns
//! with few distinct values are binned exactly; the others are binned by
//! evenly spaced percentiles so that every bin holds roughly the same number
//! of samples.

use crate::core::constants::ALMOST_INF;
use crate::core::types::{BinIndex, FeatureValue};

/// Learns bin thresholds for numerical features.
#[derive(Debug, Clone, Copy)]
pub struct NumericalBinner {
    /// Number of bins available to non-missing values
    max_bins: usize,
}

impl NumericalBinner {
    /// Create a binner using at most `max_bins` bins for non-missing values
    pub fn new(max_bins: usize) -> Self {
        NumericalBinner { max_bins }
    }

    /// Learn the increasing thresholds separating the bins of `values`.
    ///
    /// NaN values are ignored. The result holds at most `max_bins - 1`
    /// thresholds, none of which exceeds [`ALMOST_INF`].
    pub fn fit(&self, values: &[FeatureValue]) -> Vec<FeatureValue> {
        let mut sorted: Vec<FeatureValue> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut distinct = sorted.clone();
        distinct.dedup();

        let mut thresholds = if distinct.len() <= self.max_bins {
            distinct.windows(2).map(|w| (w[0] + w[1]) * 0.5).collect::<Vec<_>>()
        } else {
            // percentiles strictly between 0 and 100
            (1..self.max_bins)
                .map(|i| {
                    let q = i as f64 / self.max_bins as f64;
                    percentile_midpoint(&sorted, q)
                })
                .collect::<Vec<_>>()
        };

        for threshold in thresholds.iter_mut() {
            // the midpoint of -inf and +inf
            if threshold.is_nan() {
                *threshold = 0.0;
            } else if *threshold > ALMOST_INF {
                *threshold = ALMOST_INF;
            }
        }

        thresholds
    }
}

/// Percentile of sorted, non-empty `sorted` at fraction `q` in `[0, 1]`,
/// averaging the two neighbouring order statistics.
pub fn percentile_midpoint(sorted: &[FeatureValue], q: f64) -> FeatureValue {
    debug_assert!(!sorted.is_empty());
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    (sorted[lower] + sorted[upper]) * 0.5
}

/// Bin of a non-missing `value`: the number of thresholds strictly below it.
///
/// A value equal to a threshold falls in the lower bin, matching the
/// `value <= threshold` rule used when routing samples through a tree.
#[inline]
pub fn map_to_bin(value: FeatureValue, thresholds: &[FeatureValue]) -> BinIndex {
    thresholds.partition_point(|&t| t < value)
}
