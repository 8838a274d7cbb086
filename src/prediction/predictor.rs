//! Compiled tree predictor.
//!
//! A [`TreePredictor`] is a flat array of [`PredictorNode`]s in depth-first
//! preorder, root first. It evaluates either raw feature rows or rows of a
//! [`BinnedMatrix`] binned with the tables the tree was grown on.

use crate::core::error::{GbdtError, Result};
use crate::core::types::{
    BinBitset, BinIndex, BinnedValue, FeatureIndex, FeatureValue, NodeIndex, Score,
};
use crate::dataset::binning::categorical::encode_category;
use crate::dataset::BinnedMatrix;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One node of a compiled tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorNode {
    /// Leaf value, shrinkage included; for internal nodes the value the node
    /// had as a candidate leaf
    pub value: Score,
    /// Number of training samples that reached the node
    pub count: usize,
    pub feature_idx: FeatureIndex,
    /// Raw threshold; `value <= num_threshold` goes left
    #[serde(with = "non_finite_float")]
    pub num_threshold: FeatureValue,
    pub missing_go_to_left: bool,
    pub left: NodeIndex,
    pub right: NodeIndex,
    pub gain: f64,
    pub depth: usize,
    pub is_leaf: bool,
    /// Binned threshold; `bin <= bin_threshold` goes left
    pub bin_threshold: BinnedValue,
    pub is_categorical: bool,
    /// Bins going left, for binned evaluation of categorical splits
    pub left_cat_bitset: BinBitset,
    /// Raw categories going left, sorted ascending
    pub left_categories: Vec<FeatureValue>,
}

impl PredictorNode {
    /// Leaf holding `value`
    pub fn leaf(value: Score, count: usize, depth: usize) -> Self {
        PredictorNode {
            value,
            count,
            feature_idx: 0,
            num_threshold: 0.0,
            missing_go_to_left: false,
            left: 0,
            right: 0,
            gain: 0.0,
            depth,
            is_leaf: true,
            bin_threshold: 0,
            is_categorical: false,
            left_cat_bitset: BinBitset::new(),
            left_categories: Vec::new(),
        }
    }

    /// Numerical split node with children `left` and `right`.
    ///
    /// The bin threshold is left at zero, so the node is only meaningful
    /// for raw evaluation unless the caller sets it.
    pub fn numeric_split(
        feature_idx: FeatureIndex,
        num_threshold: FeatureValue,
        left: NodeIndex,
        right: NodeIndex,
        missing_go_to_left: bool,
    ) -> Self {
        PredictorNode {
            feature_idx,
            num_threshold,
            left,
            right,
            missing_go_to_left,
            is_leaf: false,
            ..Self::leaf(0.0, 0, 0)
        }
    }

    /// Child taken by a raw value, given the categories known for the feature
    #[inline]
    fn next_raw(&self, value: FeatureValue, known_categories: Option<&[FeatureValue]>) -> NodeIndex {
        let go_left = if value.is_nan() {
            self.missing_go_to_left
        } else if self.is_categorical {
            if encode_category(value, &self.left_categories).is_some() {
                true
            } else if known_categories.map_or(false, |known| encode_category(value, known).is_some()) {
                false
            } else {
                self.missing_go_to_left
            }
        } else {
            value <= self.num_threshold
        };
        if go_left {
            self.left
        } else {
            self.right
        }
    }

    /// Child taken by a binned value
    #[inline]
    fn next_binned(&self, bin: BinnedValue, missing_values_bin_idx: BinnedValue) -> NodeIndex {
        let go_left = if bin == missing_values_bin_idx {
            self.missing_go_to_left
        } else if self.is_categorical {
            self.left_cat_bitset.contains(bin as BinIndex)
        } else {
            bin <= self.bin_threshold
        };
        if go_left {
            self.left
        } else {
            self.right
        }
    }
}

/// Compiled regression tree.
///
/// Deserialization goes through [`TreePredictor::new`], so a decoded tree is
/// always structurally valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTreePredictor")]
pub struct TreePredictor {
    nodes: Vec<PredictorNode>,
    /// Per-feature categories seen at fit time; `None` for numerical features
    known_categories: Vec<Option<Vec<FeatureValue>>>,
}

/// Unchecked wire form of [`TreePredictor`]
#[derive(Deserialize)]
struct RawTreePredictor {
    nodes: Vec<PredictorNode>,
    known_categories: Vec<Option<Vec<FeatureValue>>>,
}

impl TryFrom<RawTreePredictor> for TreePredictor {
    type Error = GbdtError;

    fn try_from(raw: RawTreePredictor) -> Result<Self> {
        TreePredictor::new(raw.nodes, raw.known_categories)
    }
}

impl TreePredictor {
    /// Build a predictor from preorder `nodes` over features described by
    /// `known_categories` (one entry per feature).
    ///
    /// Every child index must point past its parent, which also rules out
    /// cycles.
    pub fn new(
        nodes: Vec<PredictorNode>,
        known_categories: Vec<Option<Vec<FeatureValue>>>,
    ) -> Result<Self> {
        let predictor = TreePredictor {
            nodes,
            known_categories,
        };
        predictor.validate()?;
        Ok(predictor)
    }

    /// Check the structure of the tree
    pub fn validate(&self) -> Result<()> {
        let nodes = &self.nodes;
        let known_categories = &self.known_categories;
        if nodes.is_empty() {
            return Err(GbdtError::prediction("a tree needs at least one node"));
        }
        let n_features = known_categories.len();
        for (idx, node) in nodes.iter().enumerate() {
            if node.is_leaf {
                continue;
            }
            if node.left <= idx || node.right <= idx || node.left >= nodes.len() || node.right >= nodes.len() {
                return Err(GbdtError::prediction(format!(
                    "node {} has invalid children {} and {}",
                    idx, node.left, node.right
                )));
            }
            if node.feature_idx >= n_features {
                return Err(GbdtError::prediction(format!(
                    "node {} splits on feature {} but the tree has {} features",
                    idx, node.feature_idx, n_features
                )));
            }
            if node.is_categorical && known_categories[node.feature_idx].is_none() {
                return Err(GbdtError::prediction(format!(
                    "node {} is a categorical split on numerical feature {}",
                    idx, node.feature_idx
                )));
            }
        }

        Ok(())
    }

    /// Predictor over `n_features` numerical features
    pub fn numerical(nodes: Vec<PredictorNode>, n_features: usize) -> Result<Self> {
        Self::new(nodes, vec![None; n_features])
    }

    /// Predict every row of a raw `(n_samples, n_features)` matrix.
    pub fn predict(&self, x: ArrayView2<'_, FeatureValue>) -> Result<Array1<Score>> {
        self.check_n_features(x.ncols())?;
        let out: Vec<Score> = (0..x.nrows())
            .into_par_iter()
            .map(|row| self.predict_row(x.row(row)))
            .collect();
        Ok(Array1::from_vec(out))
    }

    /// Predict a single raw row
    pub fn predict_row(&self, row: ArrayView1<'_, FeatureValue>) -> Score {
        let mut node = &self.nodes[0];
        while !node.is_leaf {
            let known = self.known_categories[node.feature_idx].as_deref();
            node = &self.nodes[node.next_raw(row[node.feature_idx], known)];
        }
        node.value
    }

    /// Predict every row of a binned matrix whose missing values sit in
    /// `missing_values_bin_idx`.
    pub fn predict_binned(
        &self,
        binned: &BinnedMatrix,
        missing_values_bin_idx: BinnedValue,
    ) -> Result<Array1<Score>> {
        self.check_n_features(binned.n_features())?;
        let out: Vec<Score> = (0..binned.n_samples())
            .into_par_iter()
            .map(|sample| {
                let mut node = &self.nodes[0];
                while !node.is_leaf {
                    let bin = binned.get(sample, node.feature_idx);
                    node = &self.nodes[node.next_binned(bin, missing_values_bin_idx)];
                }
                node.value
            })
            .collect();
        Ok(Array1::from_vec(out))
    }

    fn check_n_features(&self, n_features: usize) -> Result<()> {
        if n_features != self.n_features() {
            return Err(GbdtError::dimension_mismatch(
                format!("{} features", self.n_features()),
                format!("{} features", n_features),
            ));
        }
        Ok(())
    }

    /// Number of features the tree was built for
    pub fn n_features(&self) -> usize {
        self.known_categories.len()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaf_nodes(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf).count()
    }

    /// Depth of the deepest leaf
    pub fn max_depth(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf)
            .map(|node| node.depth)
            .max()
            .unwrap_or(0)
    }

    pub fn nodes(&self) -> &[PredictorNode] {
        &self.nodes
    }

    /// Categories seen at fit time for each feature
    pub fn known_categories(&self) -> &[Option<Vec<FeatureValue>>] {
        &self.known_categories
    }
}

/// Serde support for floats that may be infinite or NaN.
///
/// Human-readable formats such as JSON get non-finite values as the strings
/// `"inf"`, `"-inf"` and `"nan"`; binary formats keep the raw `f64`.
mod non_finite_float {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub(super) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if !serializer.is_human_readable() || value.is_finite() {
            return serializer.serialize_f64(*value);
        }
        let text = if value.is_nan() {
            "nan"
        } else if *value > 0.0 {
            "inf"
        } else {
            "-inf"
        };
        serializer.serialize_str(text)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        if !deserializer.is_human_readable() {
            return f64::deserialize(deserializer);
        }
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(de::Error::custom(format!("invalid float '{}'", other))),
            },
        }
    }
}
