//! Feature binning.
//!
//! [`BinMapper`] learns, for every feature, either numerical thresholds or a
//! categorical code table, and then maps raw feature matrices into a
//! [`BinnedMatrix`]. The last bin, `n_bins - 1`, is always reserved for
//! missing values, whether or not the training data contained any, so that
//! the bin layout does not depend on the data seen at transform time.

pub mod categorical;
pub mod numerical;

pub use categorical::CategoricalBinner;
pub use numerical::NumericalBinner;

use crate::config::BinMapperConfig;
use crate::core::error::{GbdtError, Result};
use crate::core::types::*;
use crate::dataset::binned::BinnedMatrix;
use ndarray::{ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Learned bin table of a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureBins {
    /// Increasing real-valued thresholds; value `v` falls in the bin counting
    /// the thresholds strictly below `v`.
    Numerical { thresholds: Vec<FeatureValue> },
    /// Categories sorted ascending; a category's bin is its position.
    Categorical { categories: Vec<FeatureValue> },
}

impl FeatureBins {
    /// Returns true for a categorical table
    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureBins::Categorical { .. })
    }

    /// Number of bins used by non-missing values
    pub fn n_bins_non_missing(&self) -> usize {
        match self {
            FeatureBins::Numerical { thresholds } => thresholds.len() + 1,
            FeatureBins::Categorical { categories } => categories.len(),
        }
    }

    /// Thresholds of a numerical feature
    pub fn thresholds(&self) -> Option<&[FeatureValue]> {
        match self {
            FeatureBins::Numerical { thresholds } => Some(thresholds),
            FeatureBins::Categorical { .. } => None,
        }
    }

    /// Categories of a categorical feature
    pub fn categories(&self) -> Option<&[FeatureValue]> {
        match self {
            FeatureBins::Numerical { .. } => None,
            FeatureBins::Categorical { categories } => Some(categories),
        }
    }

    /// Bin of a raw value, using `missing_bin` for missing or unknown values
    #[inline]
    pub fn value_to_bin(&self, value: FeatureValue, missing_bin: BinnedValue) -> BinnedValue {
        match self {
            FeatureBins::Numerical { thresholds } => {
                if value.is_nan() {
                    missing_bin
                } else {
                    numerical::map_to_bin(value, thresholds) as BinnedValue
                }
            }
            FeatureBins::Categorical { categories } => {
                match categorical::encode_category(value, categories) {
                    Some(bin) => bin as BinnedValue,
                    None => missing_bin,
                }
            }
        }
    }
}

/// Maps raw feature values into integer bins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinMapper {
    config: BinMapperConfig,
    feature_bins: Vec<FeatureBins>,
    n_bins_non_missing: Vec<usize>,
    fitted: bool,
}

impl BinMapper {
    /// Create an unfitted bin mapper
    pub fn new(config: BinMapperConfig) -> Result<Self> {
        config.validate()?;
        Ok(BinMapper {
            config,
            feature_bins: Vec::new(),
            n_bins_non_missing: Vec::new(),
            fitted: false,
        })
    }

    /// Create an unfitted bin mapper with `n_bins` bins and default settings
    pub fn with_n_bins(n_bins: usize) -> Result<Self> {
        Self::new(BinMapperConfig::with_n_bins(n_bins))
    }

    /// Learn the bin tables of `x`, seeding the subsampling generator from
    /// the configured `random_state`.
    pub fn fit(&mut self, x: ArrayView2<'_, FeatureValue>) -> Result<&mut Self> {
        let mut rng = StdRng::seed_from_u64(self.config.random_state);
        self.fit_with_rng(x, &mut rng)
    }

    /// Learn the bin tables of `x`, drawing the threshold subsample from `rng`.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        x: ArrayView2<'_, FeatureValue>,
        rng: &mut R,
    ) -> Result<&mut Self> {
        self.config.validate()?;
        let (n_samples, n_features) = x.dim();

        let feature_types = self.feature_types(n_features)?;
        let max_bins = self.config.max_bins();

        let sample = match self.config.subsample {
            Some(subsample) if n_samples > subsample => {
                let mut indices = rand::seq::index::sample(rng, n_samples, subsample).into_vec();
                indices.sort_unstable();
                Some(x.select(Axis(0), &indices))
            }
            _ => None,
        };
        let data = match &sample {
            Some(sample) => sample.view(),
            None => x.view(),
        };

        let feature_bins: Vec<FeatureBins> = (0..n_features)
            .into_par_iter()
            .map(|feature_idx| {
                let column = data.column(feature_idx).to_vec();
                match feature_types[feature_idx] {
                    FeatureType::Numerical => FeatureBins::Numerical {
                        thresholds: NumericalBinner::new(max_bins).fit(&column),
                    },
                    FeatureType::Categorical => {
                        if column.iter().any(|v| *v < 0.0) {
                            log::warn!(
                                "Met negative value in categorical feature {}, it will be treated as missing",
                                feature_idx
                            );
                        }
                        FeatureBins::Categorical {
                            categories: CategoricalBinner::new(max_bins).fit(&column),
                        }
                    }
                }
            })
            .collect();

        self.n_bins_non_missing = feature_bins.iter().map(FeatureBins::n_bins_non_missing).collect();
        self.feature_bins = feature_bins;
        self.fitted = true;

        log::debug!(
            "BinMapper fitted on {} samples ({} used) and {} features, n_bins={}",
            n_samples,
            data.nrows(),
            n_features,
            self.config.n_bins
        );

        Ok(self)
    }

    /// Bin `x` with the learned tables.
    ///
    /// Fails if the mapper is not fitted or if `x` does not have the number
    /// of features seen during fit.
    pub fn transform(&self, x: ArrayView2<'_, FeatureValue>) -> Result<BinnedMatrix> {
        if !self.fitted {
            return Err(GbdtError::not_fitted("BinMapper", "transform"));
        }
        let (n_samples, n_features) = x.dim();
        if n_features != self.feature_bins.len() {
            return Err(GbdtError::dimension_mismatch(
                format!("{} features (as seen during fit)", self.feature_bins.len()),
                format!("{} features", n_features),
            ));
        }

        let missing_bin = self.missing_values_bin_idx();
        let columns: Vec<Vec<BinnedValue>> = self
            .feature_bins
            .par_iter()
            .enumerate()
            .map(|(feature_idx, bins)| {
                x.column(feature_idx)
                    .iter()
                    .map(|&value| bins.value_to_bin(value, missing_bin))
                    .collect()
            })
            .collect();

        BinnedMatrix::from_columns(n_samples, columns)
    }

    /// Fit on `x`, then bin it
    pub fn fit_transform(&mut self, x: ArrayView2<'_, FeatureValue>) -> Result<BinnedMatrix> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Returns true once `fit` has completed
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Configuration of this mapper
    pub fn config(&self) -> &BinMapperConfig {
        &self.config
    }

    /// Total number of bins, including the missing-value bin
    pub fn n_bins(&self) -> usize {
        self.config.n_bins
    }

    /// Number of features seen during fit
    pub fn n_features(&self) -> usize {
        self.feature_bins.len()
    }

    /// Bin reserved for missing values, shared by every feature
    pub fn missing_values_bin_idx(&self) -> BinnedValue {
        (self.config.n_bins - 1) as BinnedValue
    }

    /// Learned per-feature tables
    pub fn feature_bins(&self) -> &[FeatureBins] {
        &self.feature_bins
    }

    /// Per-feature thresholds; `None` for categorical features
    pub fn bin_thresholds(&self) -> Vec<Option<&[FeatureValue]>> {
        self.feature_bins.iter().map(FeatureBins::thresholds).collect()
    }

    /// Per-feature categories; `None` for numerical features
    pub fn bin_categories(&self) -> Vec<Option<&[FeatureValue]>> {
        self.feature_bins.iter().map(FeatureBins::categories).collect()
    }

    /// Per-feature number of bins used by non-missing values
    pub fn n_bins_non_missing(&self) -> &[usize] {
        &self.n_bins_non_missing
    }

    /// Per-feature categorical flags
    pub fn is_categorical(&self) -> Vec<bool> {
        self.feature_bins.iter().map(FeatureBins::is_categorical).collect()
    }

    fn feature_types(&self, n_features: usize) -> Result<Vec<FeatureType>> {
        match &self.config.categorical {
            None => Ok(vec![FeatureType::Numerical; n_features]),
            Some(mask) => {
                if mask.len() != n_features {
                    return Err(crate::config_error!(
                        "categorical mask has {} entries but the data has {} features",
                        mask.len(),
                        n_features
                    ));
                }
                Ok(mask
                    .iter()
                    .map(|&is_cat| {
                        if is_cat {
                            FeatureType::Categorical
                        } else {
                            FeatureType::Numerical
                        }
                    })
                    .collect())
            }
        }
    }
}
