//! Gradient/Hessian histograms over binned features.

pub mod builder;

pub use builder::{HistogramBin, HistogramBuilder, Histograms};
