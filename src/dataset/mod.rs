//! Dataset preparation for histogram-based training.
//!
//! Raw `f64` feature matrices are discretized by a [`BinMapper`] into a
//! [`BinnedMatrix`], which is what the tree grower and histogram builder
//! consume.

pub mod binned;
pub mod binning;

pub use binned::BinnedMatrix;
pub use binning::{BinMapper, CategoricalBinner, FeatureBins, NumericalBinner};
