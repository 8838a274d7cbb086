//! Best-first tree growth.
//!
//! The grower keeps a priority queue of splittable nodes keyed by the gain of
//! their best split and always splits the most promising one. Each split
//! builds the histograms of the smaller child directly and derives the larger
//! child's by subtraction from the parent.

use crate::config::GrowerConfig;
use crate::core::constants::{MAX_N_BINS, MIN_N_BINS};
use crate::core::error::{GbdtError, Result};
use crate::core::types::{
    BinnedValue, DataSize, FeatureValue, GradientValue, Hessians, Hist, NodeIndex,
};
use crate::dataset::{BinMapper, BinnedMatrix, FeatureBins};
use crate::prediction::{PredictorNode, TreePredictor};
use crate::tree::histogram::HistogramBuilder;
use crate::tree::node::TreeNode;
use crate::tree::split::{compute_node_value, NodeStats, SplitFinder, SplitInfo};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Frontier entry; the heap pops the highest gain first and, among equal
/// gains, the node created first.
#[derive(Debug, Clone, Copy)]
struct SplittableNode {
    gain: f64,
    node_id: NodeIndex,
}

impl PartialEq for SplittableNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SplittableNode {}

impl PartialOrd for SplittableNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SplittableNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gain
            .total_cmp(&other.gain)
            .then_with(|| other.node_id.cmp(&self.node_id))
    }
}

/// Grows a single regression tree from binned data and per-sample gradients.
#[derive(Debug)]
pub struct TreeGrower<'a> {
    binned: &'a BinnedMatrix,
    gradients: &'a [GradientValue],
    histogram_builder: HistogramBuilder<'a>,
    split_finder: SplitFinder,
    config: GrowerConfig,
    /// Sample indices, partitioned so that every node owns a contiguous range
    sample_indices: Vec<DataSize>,
    nodes: Vec<TreeNode>,
    splittable_nodes: BinaryHeap<SplittableNode>,
    finalized_leaves: Vec<NodeIndex>,
    n_categorical_splits: usize,
    grown: bool,
    total_find_split_time: Duration,
    total_compute_hist_time: Duration,
    total_apply_split_time: Duration,
}

impl<'a> TreeGrower<'a> {
    /// Create a grower and compute the root's best split.
    ///
    /// `n_bins` counts every bin including the missing-values bin, which is
    /// `n_bins - 1`. `has_missing_values` defaults to scanning `binned` for
    /// that bin and `is_categorical` defaults to all numerical.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        binned: &'a BinnedMatrix,
        gradients: &'a [GradientValue],
        hessians: Hessians<'a>,
        n_bins: usize,
        n_bins_non_missing: &[usize],
        has_missing_values: Option<Vec<bool>>,
        is_categorical: Option<Vec<bool>>,
        config: GrowerConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !(MIN_N_BINS..=MAX_N_BINS).contains(&n_bins) {
            return Err(GbdtError::invalid_parameter(
                "n_bins",
                n_bins.to_string(),
                format!("should be in [{}, {}]", MIN_N_BINS, MAX_N_BINS),
            ));
        }
        let n_features = binned.n_features();
        if n_bins_non_missing.len() != n_features {
            return Err(GbdtError::dimension_mismatch(
                format!("n_bins_non_missing for {} features", n_features),
                format!("{} entries", n_bins_non_missing.len()),
            ));
        }
        if binned.n_samples() > DataSize::MAX as usize {
            return Err(GbdtError::invalid_parameter(
                "n_samples",
                binned.n_samples().to_string(),
                "too many samples for 32-bit sample indices",
            ));
        }
        let max_bin = (0..n_features)
            .into_par_iter()
            .map(|f| binned.column(f).iter().copied().max().unwrap_or(0))
            .max()
            .unwrap_or(0);
        if max_bin as usize >= n_bins {
            return Err(GbdtError::invalid_parameter(
                "n_bins",
                n_bins.to_string(),
                format!("binned data contains bin {}", max_bin),
            ));
        }

        let missing_values_bin_idx = n_bins - 1;
        let has_missing_values = has_missing_values
            .unwrap_or_else(|| binned.has_missing_values(missing_values_bin_idx as BinnedValue));
        let is_categorical = is_categorical.unwrap_or_else(|| vec![false; n_features]);

        let histogram_builder = HistogramBuilder::new(binned, gradients, hessians, n_bins)?;
        let split_finder = SplitFinder::new(
            config.clone(),
            n_bins_non_missing.to_vec(),
            has_missing_values,
            is_categorical,
            missing_values_bin_idx,
        )?;

        let n_samples = binned.n_samples();
        let mut grower = TreeGrower {
            binned,
            gradients,
            histogram_builder,
            split_finder,
            config,
            sample_indices: (0..n_samples as DataSize).collect(),
            nodes: Vec::new(),
            splittable_nodes: BinaryHeap::new(),
            finalized_leaves: Vec::new(),
            n_categorical_splits: 0,
            grown: false,
            total_find_split_time: Duration::ZERO,
            total_compute_hist_time: Duration::ZERO,
            total_apply_split_time: Duration::ZERO,
        };
        grower.initialize_root(hessians);
        Ok(grower)
    }

    /// Create a grower for data binned by `bin_mapper`.
    pub fn from_bin_mapper(
        binned: &'a BinnedMatrix,
        gradients: &'a [GradientValue],
        hessians: Hessians<'a>,
        bin_mapper: &BinMapper,
        config: GrowerConfig,
    ) -> Result<Self> {
        if !bin_mapper.is_fitted() {
            return Err(GbdtError::not_fitted("BinMapper", "TreeGrower::from_bin_mapper"));
        }
        Self::new(
            binned,
            gradients,
            hessians,
            bin_mapper.n_bins(),
            bin_mapper.n_bins_non_missing(),
            None,
            Some(bin_mapper.is_categorical()),
            config,
        )
    }

    fn initialize_root(&mut self, hessians: Hessians<'a>) {
        let n_samples = self.binned.n_samples();
        let sum_gradients: Hist = self.gradients.iter().map(|&g| g as Hist).sum();
        let sum_hessians = hessians.sum(None, n_samples);
        let value = compute_node_value(sum_gradients, sum_hessians, self.config.l2_regularization);

        self.nodes.push(TreeNode::new(
            0,
            0,
            0..n_samples,
            sum_gradients,
            sum_hessians,
            value,
            None,
        ));

        if n_samples < 2 * self.config.min_samples_leaf
            || sum_hessians < self.config.min_hessian_to_split
        {
            self.finalize_leaf(0);
            return;
        }

        let start = Instant::now();
        self.nodes[0].histograms = Some(self.histogram_builder.build_root());
        self.total_compute_hist_time += start.elapsed();

        self.compute_best_split_and_push(0);
    }

    /// Split nodes until no splittable node remains, then apply shrinkage.
    ///
    /// Calling `grow` on a grown tree does nothing.
    pub fn grow(&mut self) -> Result<()> {
        if self.grown {
            return Ok(());
        }

        while !self.splittable_nodes.is_empty() {
            self.split_next()?;
        }

        let shrinkage = self.config.shrinkage;
        for &leaf in &self.finalized_leaves {
            self.nodes[leaf].value *= shrinkage;
        }
        self.grown = true;

        log::debug!(
            "Grew tree with {} nodes ({} leaves, {} categorical splits); \
             histograms {:.3}s, split finding {:.3}s, partitioning {:.3}s",
            self.nodes.len(),
            self.finalized_leaves.len(),
            self.n_categorical_splits,
            self.total_compute_hist_time.as_secs_f64(),
            self.total_find_split_time.as_secs_f64(),
            self.total_apply_split_time.as_secs_f64()
        );
        Ok(())
    }

    /// Split the most promising node and return the ids of its children.
    ///
    /// Returns `None` when there is nothing left to split.
    pub fn split_next(&mut self) -> Result<Option<(NodeIndex, NodeIndex)>> {
        let Some(SplittableNode { node_id, .. }) = self.splittable_nodes.pop() else {
            return Ok(None);
        };

        let mut split = self.nodes[node_id].split_info.clone().ok_or_else(|| {
            GbdtError::internal(format!("splittable node {} has no split", node_id))
        })?;

        let start = Instant::now();
        let range = self.nodes[node_id].sample_range.clone();
        let n_left = self.partition_samples(&split, range.clone());
        self.total_apply_split_time += start.elapsed();

        if n_left != split.n_samples_left {
            return Err(GbdtError::tree_construction(format!(
                "node {}: partition sent {} samples left, split expected {}",
                node_id, n_left, split.n_samples_left
            )));
        }

        let depth = self.nodes[node_id].depth + 1;
        let n_leaf_nodes = self.finalized_leaves.len() + self.splittable_nodes.len() + 2;

        let left_id = self.nodes.len();
        let right_id = left_id + 1;
        self.nodes.push(TreeNode::new(
            left_id,
            depth,
            range.start..range.start + n_left,
            split.sum_gradient_left,
            split.sum_hessian_left,
            split.value_left,
            Some(node_id),
        ));
        self.nodes.push(TreeNode::new(
            right_id,
            depth,
            range.start + n_left..range.end,
            split.sum_gradient_right,
            split.sum_hessian_right,
            split.value_right,
            Some(node_id),
        ));

        // missing values unseen during training follow the larger child
        if !self.split_finder.has_missing_values()[split.feature_idx] {
            split.missing_go_to_left = split.n_samples_left > split.n_samples_right;
        }
        if split.is_categorical {
            self.n_categorical_splits += 1;
        }
        log::trace!(
            "split node {} on feature {} (gain {:.6}) into {} + {} samples",
            node_id,
            split.feature_idx,
            split.gain,
            split.n_samples_left,
            split.n_samples_right
        );

        let parent_histograms = {
            let parent = &mut self.nodes[node_id];
            parent.split_info = Some(split);
            parent.left_child = Some(left_id);
            parent.right_child = Some(right_id);
            parent.histograms.take()
        };

        if self.config.max_leaf_nodes == Some(n_leaf_nodes) {
            self.finalize_leaf(left_id);
            self.finalize_leaf(right_id);
            self.finalize_splittable_nodes();
            return Ok(Some((left_id, right_id)));
        }

        if self.config.max_depth == Some(depth) {
            self.finalize_leaf(left_id);
            self.finalize_leaf(right_id);
            return Ok(Some((left_id, right_id)));
        }

        for child in [left_id, right_id] {
            if self.nodes[child].n_samples() < 2 * self.config.min_samples_leaf {
                self.finalize_leaf(child);
            }
        }

        let should_split_left = !self.nodes[left_id].is_leaf;
        let should_split_right = !self.nodes[right_id].is_leaf;
        if should_split_left || should_split_right {
            let parent_histograms = parent_histograms.ok_or_else(|| {
                GbdtError::internal(format!("node {} lost its histograms", node_id))
            })?;

            let (smallest, largest) =
                if self.nodes[left_id].n_samples() < self.nodes[right_id].n_samples() {
                    (left_id, right_id)
                } else {
                    (right_id, left_id)
                };

            let start = Instant::now();
            let smallest_range = self.nodes[smallest].sample_range.clone();
            let smallest_histograms = self
                .histogram_builder
                .build(&self.sample_indices[smallest_range]);
            let largest_histograms = smallest_histograms.sibling_of(&parent_histograms)?;
            self.nodes[smallest].histograms = Some(smallest_histograms);
            self.nodes[largest].histograms = Some(largest_histograms);
            self.total_compute_hist_time += start.elapsed();

            if should_split_left {
                self.compute_best_split_and_push(left_id);
            }
            if should_split_right {
                self.compute_best_split_and_push(right_id);
            }
        }

        Ok(Some((left_id, right_id)))
    }

    fn compute_best_split_and_push(&mut self, node_id: NodeIndex) {
        let start = Instant::now();
        let node = &self.nodes[node_id];
        let split = match &node.histograms {
            Some(histograms) => self.split_finder.find_node_split(
                histograms,
                NodeStats {
                    sum_gradients: node.sum_gradients,
                    sum_hessians: node.sum_hessians,
                    n_samples: node.n_samples(),
                },
            ),
            None => SplitInfo::none(),
        };
        self.total_find_split_time += start.elapsed();

        let gain = split.gain;
        let splittable = split.is_valid();
        self.nodes[node_id].split_info = Some(split);
        if !splittable {
            self.finalize_leaf(node_id);
        } else {
            self.splittable_nodes.push(SplittableNode { gain, node_id });
        }
    }

    /// Reorder the node's samples so that those going left come first,
    /// keeping the relative order on each side. Returns the left count.
    fn partition_samples(&mut self, split: &SplitInfo, range: std::ops::Range<usize>) -> usize {
        let column = self.binned.column(split.feature_idx);
        let missing_bin = self.split_finder.missing_values_bin_idx() as BinnedValue;
        let samples = &mut self.sample_indices[range];

        let (left, right): (Vec<DataSize>, Vec<DataSize>) = samples
            .par_iter()
            .copied()
            .partition(|&idx| split.goes_left(column[idx as usize], missing_bin));

        samples[..left.len()].copy_from_slice(&left);
        samples[left.len()..].copy_from_slice(&right);
        left.len()
    }

    fn finalize_leaf(&mut self, node_id: NodeIndex) {
        let node = &mut self.nodes[node_id];
        node.is_leaf = true;
        node.histograms = None;
        self.finalized_leaves.push(node_id);
    }

    fn finalize_splittable_nodes(&mut self) {
        while let Some(SplittableNode { node_id, .. }) = self.splittable_nodes.pop() {
            self.finalize_leaf(node_id);
        }
    }

    /// Number of leaves finalized so far
    pub fn n_leaf_nodes(&self) -> usize {
        self.finalized_leaves.len()
    }

    /// Number of nodes created so far
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of categorical splits applied so far
    pub fn n_categorical_splits(&self) -> usize {
        self.n_categorical_splits
    }

    /// Returns true once `grow` has completed
    pub fn is_grown(&self) -> bool {
        self.grown
    }

    /// Node arena, root first
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Sample indices of a node
    pub fn node_samples(&self, node_id: NodeIndex) -> Option<&[DataSize]> {
        self.nodes
            .get(node_id)
            .map(|node| &self.sample_indices[node.sample_range.clone()])
    }

    /// Compile the grown tree into a predictor.
    ///
    /// `feature_bins` must be the bin tables the training data was binned
    /// with; they translate bin thresholds back to raw values.
    pub fn make_predictor(&self, feature_bins: &[FeatureBins]) -> Result<TreePredictor> {
        if !self.grown {
            return Err(GbdtError::not_fitted("TreeGrower", "make_predictor"));
        }
        if feature_bins.len() != self.binned.n_features() {
            return Err(GbdtError::dimension_mismatch(
                format!("{} feature bin tables", self.binned.n_features()),
                format!("{}", feature_bins.len()),
            ));
        }

        let mut predictor_nodes: Vec<PredictorNode> = Vec::with_capacity(self.nodes.len());
        // (grower node, predictor parent, is left child); right pushed first
        // so that nodes come out in depth-first preorder
        let mut stack: Vec<(NodeIndex, Option<(NodeIndex, bool)>)> = vec![(0, None)];

        while let Some((node_id, parent)) = stack.pop() {
            let node = &self.nodes[node_id];
            let predictor_idx = predictor_nodes.len();
            predictor_nodes.push(self.to_predictor_node(node, feature_bins)?);

            if let Some((parent_idx, is_left)) = parent {
                let parent_node = &mut predictor_nodes[parent_idx];
                if is_left {
                    parent_node.left = predictor_idx;
                } else {
                    parent_node.right = predictor_idx;
                }
            }

            if let (false, Some(left), Some(right)) = (node.is_leaf, node.left_child, node.right_child)
            {
                stack.push((right, Some((predictor_idx, false))));
                stack.push((left, Some((predictor_idx, true))));
            }
        }

        let known_categories = feature_bins
            .iter()
            .map(|bins| bins.categories().map(<[FeatureValue]>::to_vec))
            .collect();
        TreePredictor::new(predictor_nodes, known_categories)
    }

    fn to_predictor_node(&self, node: &TreeNode, feature_bins: &[FeatureBins]) -> Result<PredictorNode> {
        let split = match (&node.split_info, node.is_leaf) {
            (Some(split), false) => split,
            _ => return Ok(PredictorNode::leaf(node.value, node.n_samples(), node.depth)),
        };

        let bins = &feature_bins[split.feature_idx];
        let mut predictor_node = PredictorNode::leaf(node.value, node.n_samples(), node.depth);
        predictor_node.is_leaf = false;
        predictor_node.feature_idx = split.feature_idx;
        predictor_node.gain = split.gain;
        predictor_node.missing_go_to_left = split.missing_go_to_left;

        match bins {
            FeatureBins::Categorical { categories } => {
                predictor_node.is_categorical = true;
                predictor_node.left_cat_bitset = split.left_cat_bitset;
                predictor_node.left_categories = split
                    .left_cat_bitset
                    .iter()
                    .filter_map(|bin| categories.get(bin).copied())
                    .collect();
            }
            FeatureBins::Numerical { thresholds } => {
                let n_bins_non_missing = thresholds.len() + 1;
                predictor_node.bin_threshold = split.bin_idx as BinnedValue;
                predictor_node.num_threshold = if split.bin_idx + 1 == n_bins_non_missing {
                    // split on missingness: every non-missing value goes left
                    FeatureValue::INFINITY
                } else {
                    *thresholds.get(split.bin_idx).ok_or_else(|| {
                        GbdtError::tree_construction(format!(
                            "bin {} has no threshold on feature {}",
                            split.bin_idx, split.feature_idx
                        ))
                    })?
                };
            }
        }
        Ok(predictor_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrowerConfigBuilder;
    use ndarray::{array, Array2};

    fn binned_and_gradients() -> (BinnedMatrix, Vec<f32>) {
        // feature 0 separates the targets, feature 1 is noise
        let n = 200;
        let f0: Vec<u8> = (0..n).map(|i| (i % 4) as u8).collect();
        let f1: Vec<u8> = (0..n).map(|i| ((i * 7) % 3) as u8).collect();
        let gradients = f0.iter().map(|&b| if b < 2 { -1.0 } else { 1.0 }).collect();
        (BinnedMatrix::from_columns(n, vec![f0, f1]).unwrap(), gradients)
    }

    #[test]
    fn test_splittable_node_ordering() {
        let mut heap = BinaryHeap::new();
        heap.push(SplittableNode { gain: 1.0, node_id: 4 });
        heap.push(SplittableNode { gain: 3.0, node_id: 5 });
        heap.push(SplittableNode { gain: 1.0, node_id: 2 });
        assert_eq!(heap.pop().unwrap().node_id, 5);
        assert_eq!(heap.pop().unwrap().node_id, 2);
        assert_eq!(heap.pop().unwrap().node_id, 4);
    }

    #[test]
    fn test_grow_simple_tree() {
        let (binned, gradients) = binned_and_gradients();
        let config = GrowerConfigBuilder::new().min_samples_leaf(5).build().unwrap();
        let mut grower = TreeGrower::new(
            &binned,
            &gradients,
            Hessians::Constant(1.0),
            10,
            &[4, 3],
            None,
            None,
            config,
        )
        .unwrap();
        grower.grow().unwrap();

        let root = &grower.nodes()[0];
        let split = root.split_info.as_ref().unwrap();
        assert_eq!(split.feature_idx, 0);
        assert_eq!(split.bin_idx, 1);
        assert_eq!(grower.n_leaf_nodes(), 2);
        assert_eq!(grower.n_nodes(), 3);

        let left = &grower.nodes()[root.left_child.unwrap()];
        assert!(left.is_leaf);
        assert!((left.value - 1.0).abs() < 1e-9);
        assert!(grower
            .node_samples(left.node_id)
            .unwrap()
            .iter()
            .all(|&i| binned.get(i as usize, 0) < 2));
    }

    #[test]
    fn test_shrinkage_applied_to_leaves() {
        let (binned, gradients) = binned_and_gradients();
        let config = GrowerConfigBuilder::new()
            .min_samples_leaf(5)
            .shrinkage(0.1)
            .build()
            .unwrap();
        let mut grower =
            TreeGrower::new(&binned, &gradients, Hessians::Constant(1.0), 10, &[4, 3], None, None, config)
                .unwrap();
        grower.grow().unwrap();
        // growing twice must not shrink twice
        grower.grow().unwrap();

        let values: Vec<f64> = grower
            .nodes()
            .iter()
            .filter(|n| n.is_leaf)
            .map(|n| n.value)
            .collect();
        for value in values {
            assert!((value.abs() - 0.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_min_samples_leaf_too_large_gives_single_leaf() {
        let (binned, gradients) = binned_and_gradients();
        let config = GrowerConfigBuilder::new().min_samples_leaf(150).build().unwrap();
        let mut grower =
            TreeGrower::new(&binned, &gradients, Hessians::Constant(1.0), 10, &[4, 3], None, None, config)
                .unwrap();
        grower.grow().unwrap();
        assert_eq!(grower.n_nodes(), 1);
        assert_eq!(grower.n_leaf_nodes(), 1);

        let predictor = grower
            .make_predictor(&[
                FeatureBins::Numerical { thresholds: vec![0.5, 1.5, 2.5] },
                FeatureBins::Numerical { thresholds: vec![0.5, 1.5] },
            ])
            .unwrap();
        assert_eq!(predictor.n_nodes(), 1);
        let x = Array2::<f64>::zeros((3, 2));
        // mean gradient is 0
        assert!(predictor.predict(x.view()).unwrap().iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_constant_gradients_give_single_leaf() {
        let (binned, _) = binned_and_gradients();
        let gradients = vec![0.5f32; binned.n_samples()];
        let config = GrowerConfigBuilder::new().min_samples_leaf(5).build().unwrap();
        let mut grower =
            TreeGrower::new(&binned, &gradients, Hessians::Constant(1.0), 10, &[4, 3], None, None, config)
                .unwrap();
        grower.grow().unwrap();

        assert_eq!(grower.n_nodes(), 1);
        let root = &grower.nodes()[0];
        assert!(root.is_leaf);
        assert!(!root.split_info.as_ref().map_or(false, SplitInfo::is_valid));
    }

    #[test]
    fn test_max_depth_stops_growth() {
        let n = 256;
        let column: Vec<u8> = (0..n).map(|i| (i % 16) as u8).collect();
        let gradients: Vec<f32> = column.iter().map(|&b| (b as f32 - 7.5).powi(3)).collect();
        let binned = BinnedMatrix::from_columns(n, vec![column]).unwrap();
        let config = GrowerConfigBuilder::new()
            .min_samples_leaf(1)
            .max_depth(2)
            .build()
            .unwrap();
        let mut grower =
            TreeGrower::new(&binned, &gradients, Hessians::Constant(1.0), 32, &[16], None, None, config)
                .unwrap();
        grower.grow().unwrap();
        assert!(grower.nodes().iter().all(|n| n.depth <= 2));
        assert_eq!(grower.n_leaf_nodes(), 4);
    }

    #[test]
    fn test_max_leaf_nodes() {
        let n = 256;
        let column: Vec<u8> = (0..n).map(|i| (i % 16) as u8).collect();
        let gradients: Vec<f32> = column.iter().map(|&b| (b as f32 - 7.5).powi(3)).collect();
        let binned = BinnedMatrix::from_columns(n, vec![column]).unwrap();

        for max_leaf_nodes in [2, 3, 5, 7] {
            let config = GrowerConfigBuilder::new()
                .min_samples_leaf(1)
                .max_leaf_nodes(max_leaf_nodes)
                .build()
                .unwrap();
            let mut grower = TreeGrower::new(
                &binned,
                &gradients,
                Hessians::Constant(1.0),
                32,
                &[16],
                None,
                None,
                config,
            )
            .unwrap();
            grower.grow().unwrap();
            assert_eq!(grower.n_leaf_nodes(), max_leaf_nodes);
            assert_eq!(grower.n_nodes(), 2 * max_leaf_nodes - 1);
        }
    }

    #[test]
    fn test_missing_direction_without_training_missing_values() {
        // 30 samples in bin 0, 10 in bin 1: unseen missing values follow bin 0
        let mut column = vec![0u8; 30];
        column.extend(vec![1u8; 10]);
        let gradients: Vec<f32> = column.iter().map(|&b| if b == 0 { -1.0 } else { 1.0 }).collect();
        let binned = BinnedMatrix::from_columns(40, vec![column]).unwrap();
        let config = GrowerConfigBuilder::new().min_samples_leaf(1).build().unwrap();
        let mut grower =
            TreeGrower::new(&binned, &gradients, Hessians::Constant(1.0), 4, &[2], None, None, config)
                .unwrap();
        grower.grow().unwrap();

        let split = grower.nodes()[0].split_info.as_ref().unwrap();
        assert!(split.missing_go_to_left);

        let predictor = grower
            .make_predictor(&[FeatureBins::Numerical { thresholds: vec![0.5] }])
            .unwrap();
        let out = predictor.predict(array![[f64::NAN], [0.0], [1.0]].view()).unwrap();
        assert_eq!(out[0], out[1]);
        assert!(out[2] < out[1]);
    }

    #[test]
    fn test_make_predictor_requires_grow() {
        let (binned, gradients) = binned_and_gradients();
        let grower = TreeGrower::new(
            &binned,
            &gradients,
            Hessians::Constant(1.0),
            10,
            &[4, 3],
            None,
            None,
            GrowerConfig::default(),
        )
        .unwrap();
        assert!(grower.make_predictor(&[]).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let (binned, gradients) = binned_and_gradients();
        let build = |n_bins: usize, n_bins_non_missing: &[usize]| {
            TreeGrower::new(
                &binned,
                &gradients,
                Hessians::Constant(1.0),
                n_bins,
                n_bins_non_missing,
                None,
                None,
                GrowerConfig::default(),
            )
            .is_err()
        };
        // bin 3 present in the data
        assert!(build(3, &[2, 2]));
        assert!(build(300, &[4, 3]));
        assert!(build(10, &[4]));

        let short = vec![0.0f32; 5];
        assert!(TreeGrower::new(
            &binned,
            &short,
            Hessians::Constant(1.0),
            10,
            &[4, 3],
            None,
            None,
            GrowerConfig::default()
        )
        .is_err());
    }
}
