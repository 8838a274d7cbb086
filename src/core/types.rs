//! Core data types for the histogram GBDT engine.
//!
//! These aliases pin down the storage width of every array the engine
//! touches, so the binning, histogram and grower modules agree on layout.

use crate::core::constants::BITSET_WORDS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw input feature value. Inputs are read as 64-bit floats; NaN marks a
/// missing value.
pub type FeatureValue = f64;

/// Binned feature value. At most 256 bins are supported, so one byte is
/// enough for every entry of a binned matrix.
pub type BinnedValue = u8;

/// Per-sample gradient and Hessian storage type.
/// 32-bit float keeps the per-sample buffers compact.
pub type GradientValue = f32;

/// Histogram accumulation type.
/// 64-bit float bounds the rounding error of summing many `f32` values.
pub type Hist = f64;

/// Leaf and prediction value type.
pub type Score = f64;

/// Sample index type used by the partition of a node's samples.
pub type DataSize = u32;

/// Feature index type for identifying features in the dataset.
pub type FeatureIndex = usize;

/// Bin index type for discretized feature values.
pub type BinIndex = usize;

/// Tree node identifier type.
pub type NodeIndex = usize;

/// Feature kind, fixed at fit time by the categorical mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    /// Ordered numerical feature, binned by thresholds
    Numerical,
    /// Unordered categorical feature, binned by category code
    Categorical,
}

impl Default for FeatureType {
    fn default() -> Self {
        FeatureType::Numerical
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureType::Numerical => write!(f, "numerical"),
            FeatureType::Categorical => write!(f, "categorical"),
        }
    }
}

/// Per-sample Hessians handed to the grower.
///
/// Losses such as least squares have a Hessian that does not depend on the
/// sample; passing it as [`Hessians::Constant`] lets the histogram builder
/// skip the Hessian accumulation entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hessians<'a> {
    /// The same Hessian value for every sample
    Constant(GradientValue),
    /// One Hessian value per sample
    PerSample(&'a [GradientValue]),
}

impl<'a> Hessians<'a> {
    /// Sum of Hessians over `n_samples` samples given by `indices`,
    /// or over all samples when `indices` is `None`.
    pub fn sum(&self, indices: Option<&[DataSize]>, n_samples: usize) -> Hist {
        match (self, indices) {
            (Hessians::Constant(h), Some(idx)) => *h as Hist * idx.len() as Hist,
            (Hessians::Constant(h), None) => *h as Hist * n_samples as Hist,
            (Hessians::PerSample(values), Some(idx)) => {
                idx.iter().map(|&i| values[i as usize] as Hist).sum()
            }
            (Hessians::PerSample(values), None) => values.iter().map(|&h| h as Hist).sum(),
        }
    }
}

/// Fixed-size set of bin indices, one bit per possible bin.
///
/// Used for categorical splits: the bins whose bit is set go to the left
/// child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinBitset([u32; BITSET_WORDS]);

impl BinBitset {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `bin` to the set
    #[inline]
    pub fn insert(&mut self, bin: BinIndex) {
        self.0[bin / 32] |= 1 << (bin % 32);
    }

    /// Returns true if `bin` is in the set
    #[inline]
    pub fn contains(&self, bin: BinIndex) -> bool {
        bin < BITSET_WORDS * 32 && (self.0[bin / 32] >> (bin % 32)) & 1 == 1
    }

    /// Number of bins in the set
    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bin is in the set
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// Bins in the set, in increasing order
    pub fn iter(&self) -> impl Iterator<Item = BinIndex> + '_ {
        (0..BITSET_WORDS * 32).filter(move |&bin| self.contains(bin))
    }
}

impl FromIterator<BinIndex> for BinBitset {
    fn from_iter<I: IntoIterator<Item = BinIndex>>(iter: I) -> Self {
        let mut bitset = BinBitset::new();
        for bin in iter {
            bitset.insert(bin);
        }
        bitset
    }
}
