//! Tree growing.
//!
//! [`TreeGrower`] fits one regression tree to per-sample gradients and
//! Hessians over a binned matrix, using [`histogram`] to summarize node
//! samples and [`split`] to pick the best split of each node.

pub mod grower;
pub mod histogram;
pub mod node;
pub mod split;

pub use grower::TreeGrower;
pub use histogram::{HistogramBin, HistogramBuilder, Histograms};
pub use node::TreeNode;
pub use split::{NodeStats, SplitFinder, SplitInfo};
