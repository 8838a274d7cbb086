//! Best split search over node histograms.
//!
//! Numerical features are scanned bin by bin, once with missing values sent
//! right and, when the feature has missing values, once more from the right
//! with missing values sent left. Categorical features are sorted by their
//! gradient/Hessian ratio and scanned from both ends of that order.

use crate::config::GrowerConfig;
use crate::core::constants::LEAF_VALUE_EPSILON;
use crate::core::error::{GbdtError, Result};
use crate::core::types::{BinBitset, BinIndex, BinnedValue, DataSize, FeatureIndex, Hist, Score};
use crate::tree::histogram::{HistogramBin, Histograms};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Best split found for a node.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    /// Gain of the split; negative when no valid split was found
    pub gain: f64,
    pub feature_idx: FeatureIndex,
    /// Last bin going left (numerical splits only)
    pub bin_idx: BinIndex,
    /// Direction of samples whose value is missing
    pub missing_go_to_left: bool,
    pub is_categorical: bool,
    /// Bins going left (categorical splits only)
    pub left_cat_bitset: BinBitset,
    pub sum_gradient_left: Hist,
    pub sum_hessian_left: Hist,
    pub sum_gradient_right: Hist,
    pub sum_hessian_right: Hist,
    pub n_samples_left: usize,
    pub n_samples_right: usize,
    /// Leaf value of the left child, before shrinkage
    pub value_left: Score,
    /// Leaf value of the right child, before shrinkage
    pub value_right: Score,
}

impl SplitInfo {
    /// Placeholder for "no split found"
    pub fn none() -> Self {
        SplitInfo {
            gain: -1.0,
            feature_idx: 0,
            bin_idx: 0,
            missing_go_to_left: false,
            is_categorical: false,
            left_cat_bitset: BinBitset::new(),
            sum_gradient_left: 0.0,
            sum_hessian_left: 0.0,
            sum_gradient_right: 0.0,
            sum_hessian_right: 0.0,
            n_samples_left: 0,
            n_samples_right: 0,
            value_left: 0.0,
            value_right: 0.0,
        }
    }

    /// Returns true if the split improves the loss
    pub fn is_valid(&self) -> bool {
        self.gain > 0.0 && self.n_samples_left > 0 && self.n_samples_right > 0
    }

    /// Routes a binned value through this split
    #[inline]
    pub fn goes_left(&self, bin: BinnedValue, missing_values_bin_idx: BinnedValue) -> bool {
        if self.is_categorical {
            self.left_cat_bitset.contains(bin as BinIndex)
        } else {
            (self.missing_go_to_left && bin == missing_values_bin_idx)
                || (bin as BinIndex) <= self.bin_idx
        }
    }
}

impl Default for SplitInfo {
    fn default() -> Self {
        Self::none()
    }
}

/// Optimal value of a leaf holding the given sums, before shrinkage.
#[inline]
pub fn compute_node_value(sum_gradient: Hist, sum_hessian: Hist, l2_regularization: f64) -> Score {
    -sum_gradient / (sum_hessian + l2_regularization + LEAF_VALUE_EPSILON)
}

/// Loss reduction of splitting a node into the given left and right sides.
#[inline]
pub fn split_gain(
    sum_gradient_left: Hist,
    sum_hessian_left: Hist,
    sum_gradient_right: Hist,
    sum_hessian_right: Hist,
    sum_gradients: Hist,
    sum_hessians: Hist,
    l2_regularization: f64,
) -> f64 {
    let score = |g: Hist, h: Hist| -g * compute_node_value(g, h, l2_regularization);
    score(sum_gradient_left, sum_hessian_left) + score(sum_gradient_right, sum_hessian_right)
        - score(sum_gradients, sum_hessians)
}

/// Totals of the node being split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStats {
    pub sum_gradients: Hist,
    pub sum_hessians: Hist,
    pub n_samples: usize,
}

/// Finds the best split of a node from its histograms.
#[derive(Debug, Clone)]
pub struct SplitFinder {
    config: GrowerConfig,
    n_bins_non_missing: Vec<usize>,
    has_missing_values: Vec<bool>,
    is_categorical: Vec<bool>,
    missing_values_bin_idx: BinIndex,
}

impl SplitFinder {
    /// Create a finder; the three per-feature arrays must have one entry per
    /// feature.
    pub fn new(
        config: GrowerConfig,
        n_bins_non_missing: Vec<usize>,
        has_missing_values: Vec<bool>,
        is_categorical: Vec<bool>,
        missing_values_bin_idx: BinIndex,
    ) -> Result<Self> {
        let n_features = n_bins_non_missing.len();
        if has_missing_values.len() != n_features || is_categorical.len() != n_features {
            return Err(GbdtError::dimension_mismatch(
                format!("{} per-feature flags", n_features),
                format!(
                    "{} missing flags and {} categorical flags",
                    has_missing_values.len(),
                    is_categorical.len()
                ),
            ));
        }
        if let Some(&too_many) = n_bins_non_missing.iter().find(|&&n| n > missing_values_bin_idx) {
            return Err(GbdtError::invalid_parameter(
                "n_bins_non_missing",
                too_many.to_string(),
                format!("must not exceed the missing values bin {}", missing_values_bin_idx),
            ));
        }

        Ok(SplitFinder {
            config,
            n_bins_non_missing,
            has_missing_values,
            is_categorical,
            missing_values_bin_idx,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_bins_non_missing.len()
    }

    pub fn config(&self) -> &GrowerConfig {
        &self.config
    }

    pub fn n_bins_non_missing(&self) -> &[usize] {
        &self.n_bins_non_missing
    }

    pub fn has_missing_values(&self) -> &[bool] {
        &self.has_missing_values
    }

    pub fn is_categorical(&self) -> &[bool] {
        &self.is_categorical
    }

    pub fn missing_values_bin_idx(&self) -> BinIndex {
        self.missing_values_bin_idx
    }

    /// Best split over every feature.
    ///
    /// Features are evaluated in parallel; the highest gain wins and ties go
    /// to the lowest feature index.
    pub fn find_node_split(&self, histograms: &Histograms, stats: NodeStats) -> SplitInfo {
        let candidates: Vec<SplitInfo> = (0..self.n_features())
            .into_par_iter()
            .map(|feature_idx| {
                self.find_feature_split(feature_idx, histograms.feature(feature_idx), stats)
            })
            .collect();

        let mut best = SplitInfo::none();
        for candidate in candidates {
            if candidate.gain > best.gain {
                best = candidate;
            }
        }

        if best.gain > 0.0 {
            best.value_left = compute_node_value(
                best.sum_gradient_left,
                best.sum_hessian_left,
                self.config.l2_regularization,
            );
            best.value_right = compute_node_value(
                best.sum_gradient_right,
                best.sum_hessian_right,
                self.config.l2_regularization,
            );
        }
        best
    }

    /// Best split of a single feature.
    pub fn find_feature_split(
        &self,
        feature_idx: FeatureIndex,
        bins: &[HistogramBin],
        stats: NodeStats,
    ) -> SplitInfo {
        let mut best = SplitInfo::none();
        best.feature_idx = feature_idx;

        if self.is_categorical[feature_idx] {
            self.find_categorical_split(feature_idx, bins, stats, &mut best);
        } else {
            self.scan_left_to_right(feature_idx, bins, stats, &mut best);
            if self.has_missing_values[feature_idx] {
                self.scan_right_to_left(feature_idx, bins, stats, &mut best);
            }
        }
        best
    }

    #[inline]
    fn is_admissible(&self, gain: f64, best_gain: f64) -> bool {
        gain > best_gain && gain > self.config.min_gain_to_split
    }

    #[inline]
    fn gain(&self, g_left: Hist, h_left: Hist, stats: NodeStats) -> f64 {
        split_gain(
            g_left,
            h_left,
            stats.sum_gradients - g_left,
            stats.sum_hessians - h_left,
            stats.sum_gradients,
            stats.sum_hessians,
            self.config.l2_regularization,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        best: &mut SplitInfo,
        gain: f64,
        bin_idx: BinIndex,
        missing_go_to_left: bool,
        g_left: Hist,
        h_left: Hist,
        n_left: usize,
        stats: NodeStats,
    ) {
        best.gain = gain;
        best.bin_idx = bin_idx;
        best.missing_go_to_left = missing_go_to_left;
        best.is_categorical = false;
        best.sum_gradient_left = g_left;
        best.sum_hessian_left = h_left;
        best.n_samples_left = n_left;
        best.sum_gradient_right = stats.sum_gradients - g_left;
        best.sum_hessian_right = stats.sum_hessians - h_left;
        best.n_samples_right = stats.n_samples - n_left;
    }

    /// Scan with missing values going right.
    ///
    /// When the feature has missing values, the last candidate puts every
    /// non-missing sample left and only the missing ones right.
    fn scan_left_to_right(
        &self,
        feature_idx: FeatureIndex,
        bins: &[HistogramBin],
        stats: NodeStats,
        best: &mut SplitInfo,
    ) {
        let n_bins_non_missing = self.n_bins_non_missing[feature_idx];
        let end = (n_bins_non_missing + self.has_missing_values[feature_idx] as usize)
            .saturating_sub(1);

        let (mut g_left, mut h_left, mut n_left) = (0.0, 0.0, 0usize);
        for (bin_idx, bin) in bins.iter().enumerate().take(end) {
            g_left += bin.sum_gradients;
            h_left += bin.sum_hessians;
            n_left += bin.count as usize;
            let n_right = stats.n_samples - n_left;
            let h_right = stats.sum_hessians - h_left;

            if n_left < self.config.min_samples_leaf {
                continue;
            }
            if n_right < self.config.min_samples_leaf {
                break;
            }
            if h_left < self.config.min_hessian_to_split {
                continue;
            }
            if h_right < self.config.min_hessian_to_split {
                break;
            }

            let gain = self.gain(g_left, h_left, stats);
            if self.is_admissible(gain, best.gain) {
                Self::record(best, gain, bin_idx, false, g_left, h_left, n_left, stats);
            }
        }
    }

    /// Scan from the highest non-missing bin down, missing values going left.
    fn scan_right_to_left(
        &self,
        feature_idx: FeatureIndex,
        bins: &[HistogramBin],
        stats: NodeStats,
        best: &mut SplitInfo,
    ) {
        let n_bins_non_missing = self.n_bins_non_missing[feature_idx];
        if n_bins_non_missing < 2 {
            return;
        }

        let (mut g_right, mut h_right, mut n_right) = (0.0, 0.0, 0usize);
        for bin_idx in (0..n_bins_non_missing - 1).rev() {
            let bin = &bins[bin_idx + 1];
            g_right += bin.sum_gradients;
            h_right += bin.sum_hessians;
            n_right += bin.count as usize;
            let n_left = stats.n_samples - n_right;
            let g_left = stats.sum_gradients - g_right;
            let h_left = stats.sum_hessians - h_right;

            if n_right < self.config.min_samples_leaf {
                continue;
            }
            if n_left < self.config.min_samples_leaf {
                break;
            }
            if h_right < self.config.min_hessian_to_split {
                continue;
            }
            if h_left < self.config.min_hessian_to_split {
                break;
            }

            let gain = self.gain(g_left, h_left, stats);
            if self.is_admissible(gain, best.gain) {
                Self::record(best, gain, bin_idx, true, g_left, h_left, n_left, stats);
            }
        }
    }

    fn find_categorical_split(
        &self,
        feature_idx: FeatureIndex,
        bins: &[HistogramBin],
        stats: NodeStats,
        best: &mut SplitInfo,
    ) {
        let min_support = self.config.min_category_support as DataSize;
        let mut used: Vec<(BinIndex, HistogramBin)> = (0..self.n_bins_non_missing[feature_idx])
            .filter(|&bin_idx| bins[bin_idx].count >= min_support)
            .map(|bin_idx| (bin_idx, bins[bin_idx]))
            .collect();
        let has_missing = self.has_missing_values[feature_idx];
        if has_missing {
            let missing = bins[self.missing_values_bin_idx];
            if missing.count >= min_support {
                used.push((self.missing_values_bin_idx, missing));
            }
        }

        let n_used = used.len();
        if n_used <= 1 {
            return;
        }

        let cat_smooth = self.config.cat_smooth;
        let ratio = |bin: &HistogramBin| bin.sum_gradients / (bin.sum_hessians + cat_smooth);
        used.sort_by(|(a_idx, a), (b_idx, b)| {
            ratio(a)
                .partial_cmp(&ratio(b))
                .unwrap_or(Ordering::Equal)
                .then(a_idx.cmp(b_idx))
        });

        // (position in sorted order, scanned from the front)
        let mut best_cut: Option<(usize, bool)> = None;
        for from_front in [true, false] {
            let middle = if from_front { (n_used + 1) / 2 } else { (n_used + 1) / 2 - 1 };
            let (mut g_left, mut h_left, mut n_left) = (0.0, 0.0, 0usize);

            for i in 0..middle {
                let position = if from_front { i } else { n_used - 1 - i };
                let bin = &used[position].1;
                g_left += bin.sum_gradients;
                h_left += bin.sum_hessians;
                n_left += bin.count as usize;
                let n_right = stats.n_samples - n_left;
                let h_right = stats.sum_hessians - h_left;

                if n_left < self.config.min_samples_leaf || h_left < self.config.min_hessian_to_split
                {
                    continue;
                }
                if n_right < self.config.min_samples_leaf || h_right < self.config.min_hessian_to_split
                {
                    break;
                }

                let gain = self.gain(g_left, h_left, stats);
                if self.is_admissible(gain, best.gain) {
                    Self::record(best, gain, 0, false, g_left, h_left, n_left, stats);
                    best_cut = Some((position, from_front));
                }
            }
        }

        if let Some((position, from_front)) = best_cut {
            let left = if from_front {
                &used[..=position]
            } else {
                &used[position..]
            };
            best.is_categorical = true;
            best.left_cat_bitset = left.iter().map(|(bin_idx, _)| *bin_idx).collect();
            best.missing_go_to_left =
                has_missing && best.left_cat_bitset.contains(self.missing_values_bin_idx);
            log::trace!(
                "categorical split on feature {} sends {} of {} bins left",
                feature_idx,
                left.len(),
                n_used
            );
        }
    }
}
