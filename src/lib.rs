//! # hist-gbdt
//!
//! The core of a histogram-based gradient boosted decision tree engine:
//! feature binning, best-first tree growth over gradient/Hessian histograms,
//! and compiled tree prediction.
//!
//! ## Pipeline
//!
//! 1. A [`BinMapper`] learns per-feature bin tables from a raw `f64` matrix
//!    and maps it into a compact [`BinnedMatrix`]. NaN (and, for categorical
//!    features, negative or unseen values) lands in a dedicated missing-values
//!    bin.
//! 2. A [`TreeGrower`] fits one tree to per-sample gradients and Hessians,
//!    always splitting the leaf with the highest gain.
//! 3. [`TreeGrower::make_predictor`] compiles the tree into a
//!    [`TreePredictor`] that evaluates raw or binned rows and can be saved
//!    with [`io::save_predictor`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hist_gbdt::{BinMapper, GrowerConfigBuilder, Hessians, TreeGrower};
//! use ndarray::Array2;
//!
//! # fn main() -> hist_gbdt::Result<()> {
//! let x = Array2::from_shape_fn((1000, 3), |(i, j)| ((i * (j + 3)) % 97) as f64);
//! let y: Vec<f32> = x.column(0).iter().map(|&v| (v / 10.0) as f32).collect();
//!
//! let mut mapper = BinMapper::with_n_bins(256)?;
//! let binned = mapper.fit_transform(x.view())?;
//!
//! // least squares at a zero prediction: gradient -y, Hessian 1
//! let gradients: Vec<f32> = y.iter().map(|&t| -t).collect();
//! let config = GrowerConfigBuilder::new().max_leaf_nodes(31).build()?;
//! let mut grower =
//!     TreeGrower::from_bin_mapper(&binned, &gradients, Hessians::Constant(1.0), &mapper, config)?;
//! grower.grow()?;
//!
//! let predictor = grower.make_predictor(mapper.feature_bins())?;
//! let predictions = predictor.predict(x.view())?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core types, constants and errors
pub mod core;

// Configuration of the engine components
pub mod config;

// Binning of raw feature matrices
pub mod dataset;

// Tree growing
pub mod tree;

// Compiled trees
pub mod prediction;

// Predictor persistence
pub mod io;

pub use crate::core::{
    constants::*,
    error::{GbdtError, Result},
    types::*,
};

pub use config::{BinMapperConfig, GrowerConfig, GrowerConfigBuilder};

pub use dataset::{BinMapper, BinnedMatrix, FeatureBins};

pub use tree::{SplitInfo, TreeGrower};

pub use prediction::{PredictorNode, TreePredictor};

pub use io::{load_predictor, save_predictor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize `env_logger` from the `RUST_LOG` environment variable.
///
/// Safe to call more than once; later calls leave the first logger in place.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .try_init();
}
