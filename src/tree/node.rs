//! Nodes of a tree under construction.

use crate::core::types::{Hist, NodeIndex, Score};
use crate::tree::histogram::Histograms;
use crate::tree::split::SplitInfo;
use std::ops::Range;

/// A node of the tree being grown.
///
/// The samples of a node are a contiguous range of the grower's shared
/// sample index buffer; splitting a node reorders its range so that the left
/// child's samples come first.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Position of the node in the grower's arena
    pub node_id: NodeIndex,
    pub depth: usize,
    /// Range of the shared sample index buffer owned by this node
    pub sample_range: Range<usize>,
    pub sum_gradients: Hist,
    pub sum_hessians: Hist,
    /// Leaf value; shrinkage is applied once growth completes
    pub value: Score,
    pub parent: Option<NodeIndex>,
    pub left_child: Option<NodeIndex>,
    pub right_child: Option<NodeIndex>,
    /// Best split found for this node, once computed
    pub split_info: Option<SplitInfo>,
    pub is_leaf: bool,
    /// Histograms, kept only while the node may still be split
    pub(crate) histograms: Option<Histograms>,
}

impl TreeNode {
    /// Create an unsplit node over `sample_range`.
    pub fn new(
        node_id: NodeIndex,
        depth: usize,
        sample_range: Range<usize>,
        sum_gradients: Hist,
        sum_hessians: Hist,
        value: Score,
        parent: Option<NodeIndex>,
    ) -> Self {
        TreeNode {
            node_id,
            depth,
            sample_range,
            sum_gradients,
            sum_hessians,
            value,
            parent,
            left_child: None,
            right_child: None,
            split_info: None,
            is_leaf: false,
            histograms: None,
        }
    }

    /// Number of samples reaching this node
    pub fn n_samples(&self) -> usize {
        self.sample_range.len()
    }

    /// Gain of the node's best split, or `-1` if none was computed
    pub fn split_gain(&self) -> f64 {
        self.split_info.as_ref().map_or(-1.0, |split| split.gain)
    }

    /// Returns true once the node has children
    pub fn is_split(&self) -> bool {
        self.left_child.is_some()
    }
}
