//! Split finding.

pub mod finder;

pub use finder::{compute_node_value, split_gain, NodeStats, SplitFinder, SplitInfo};
