//! Categorical feature binning.
//!
//! The most frequent categories of a column each get their own bin. They are
//! stored sorted by value so that encoding is a binary search, and so that
//! the bin order matches the category order.

use crate::core::types::{BinIndex, FeatureValue};
use std::cmp::Ordering;

/// Learns the category table of categorical features.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalBinner {
    /// Number of bins available to non-missing values
    max_bins: usize,
}

impl CategoricalBinner {
    /// Create a binner keeping at most `max_bins` categories
    pub fn new(max_bins: usize) -> Self {
        CategoricalBinner { max_bins }
    }

    /// Learn the categories of `values`, sorted ascending.
    ///
    /// NaN and negative values are missing and never become categories.
    /// When there are more than `max_bins` categories, the most frequent are
    /// kept; equally frequent categories are ranked by ascending value.
    pub fn fit(&self, values: &[FeatureValue]) -> Vec<FeatureValue> {
        let mut valid: Vec<FeatureValue> = values
            .iter()
            .copied()
            .filter(|v| !is_missing_category(*v))
            .collect();
        valid.sort_by(|a, b| a.total_cmp(b));

        let mut counts: Vec<(FeatureValue, usize)> = Vec::new();
        for value in valid {
            match counts.last_mut() {
                Some((last, count)) if *last == value => *count += 1,
                _ => counts.push((value, 1)),
            }
        }

        // stable sort keeps ascending value order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(self.max_bins);

        let mut categories: Vec<FeatureValue> = counts.into_iter().map(|(value, _)| value).collect();
        categories.sort_by(|a, b| a.total_cmp(b));
        categories
    }
}

/// Returns true for values that are always encoded as missing.
#[inline]
pub fn is_missing_category(value: FeatureValue) -> bool {
    value.is_nan() || value < 0.0
}

/// Bin of `value` among the sorted `categories`, or `None` when the value is
/// missing, negative or was not seen during fit.
#[inline]
pub fn encode_category(value: FeatureValue, categories: &[FeatureValue]) -> Option<BinIndex> {
    if is_missing_category(value) {
        return None;
    }
    categories
        .binary_search_by(|c| c.partial_cmp(&value).unwrap_or(Ordering::Less))
        .ok()
}
