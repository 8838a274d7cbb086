//! Engine constants and configuration defaults.

use crate::core::types::*;

/// Largest finite threshold a bin mapper may produce.
///
/// `+inf` is kept for "split on missingness" nodes, where every non-missing
/// value goes to the left child. Learned thresholds are clipped to this value
/// so that an input of `+inf` still lands right of a regular threshold.
pub const ALMOST_INF: FeatureValue = 1e300;

/// Smallest allowed number of bins: two usable bins plus the missing bin.
pub const MIN_N_BINS: usize = 3;

/// Largest allowed number of bins, bounded by the `u8` binned storage.
pub const MAX_N_BINS: usize = 256;

/// Default number of bins, including the missing-value bin.
pub const DEFAULT_N_BINS: usize = 256;

/// Default row cap used when learning bin thresholds.
pub const DEFAULT_SUBSAMPLE: usize = 200_000;

/// Default seed of the threshold subsampling generator.
pub const DEFAULT_RANDOM_STATE: u64 = 0;

/// Default minimum number of samples per leaf.
pub const DEFAULT_MIN_SAMPLES_LEAF: usize = 20;

/// Default minimum gain a split must exceed.
pub const DEFAULT_MIN_GAIN_TO_SPLIT: f64 = 0.0;

/// Default minimum Hessian sum on each side of a split.
pub const DEFAULT_MIN_HESSIAN_TO_SPLIT: f64 = 1e-3;

/// Default L2 regularization of leaf values.
pub const DEFAULT_L2_REGULARIZATION: f64 = 0.0;

/// Default factor applied to every leaf value once growth completes.
pub const DEFAULT_SHRINKAGE: f64 = 1.0;

/// Default minimum number of samples a category needs to take part in a
/// categorical split search.
pub const DEFAULT_MIN_CATEGORY_SUPPORT: usize = 10;

/// Default smoothing added to the Hessian sum when ranking categories.
pub const DEFAULT_CAT_SMOOTH: f64 = 10.0;

/// Added to the denominator of the leaf value to keep it finite when the
/// Hessian sum and the L2 term are both zero.
pub const LEAF_VALUE_EPSILON: f64 = 1e-15;

/// Number of 32-bit words in a bitset covering every possible bin.
pub const BITSET_WORDS: usize = MAX_N_BINS / 32;
