//! Column-major storage of binned features.

use crate::core::error::{GbdtError, Result};
use crate::core::types::{BinnedValue, FeatureIndex};
use ndarray::{Array2, ArrayView2, ShapeBuilder};
use serde::{Deserialize, Serialize};

/// Binned feature matrix.
///
/// Values are stored feature by feature so that the histogram builder reads
/// each feature's bins as one contiguous slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedMatrix {
    data: Vec<BinnedValue>,
    n_samples: usize,
    n_features: usize,
}

impl BinnedMatrix {
    /// Build a matrix from column-major `data` of `n_samples * n_features` bins
    pub fn new(data: Vec<BinnedValue>, n_samples: usize, n_features: usize) -> Result<Self> {
        if data.len() != n_samples * n_features {
            return Err(GbdtError::dimension_mismatch(
                format!("{} binned values", n_samples * n_features),
                format!("{} binned values", data.len()),
            ));
        }
        Ok(BinnedMatrix {
            data,
            n_samples,
            n_features,
        })
    }

    /// Build a matrix from one bin vector per feature
    pub fn from_columns(n_samples: usize, columns: Vec<Vec<BinnedValue>>) -> Result<Self> {
        let n_features = columns.len();
        let mut data = Vec::with_capacity(n_samples * n_features);
        for (feature_idx, column) in columns.into_iter().enumerate() {
            if column.len() != n_samples {
                return Err(GbdtError::dimension_mismatch(
                    format!("{} samples in feature {}", n_samples, feature_idx),
                    format!("{} samples", column.len()),
                ));
            }
            data.extend(column);
        }
        Self::new(data, n_samples, n_features)
    }

    /// Copy a samples x features array into column-major storage
    pub fn from_array(array: ArrayView2<'_, BinnedValue>) -> Self {
        let (n_samples, n_features) = array.dim();
        let mut data = Vec::with_capacity(n_samples * n_features);
        for column in array.columns() {
            data.extend(column.iter().copied());
        }
        BinnedMatrix {
            data,
            n_samples,
            n_features,
        }
    }

    /// Number of rows
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of columns
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Bins of one feature, one entry per sample
    #[inline]
    pub fn column(&self, feature_idx: FeatureIndex) -> &[BinnedValue] {
        let start = feature_idx * self.n_samples;
        &self.data[start..start + self.n_samples]
    }

    /// Bin of sample `sample_idx` on feature `feature_idx`
    #[inline]
    pub fn get(&self, sample_idx: usize, feature_idx: FeatureIndex) -> BinnedValue {
        self.data[feature_idx * self.n_samples + sample_idx]
    }

    /// Samples x features view over the column-major buffer
    pub fn as_array(&self) -> ArrayView2<'_, BinnedValue> {
        // the buffer length is checked by every constructor
        ArrayView2::from_shape((self.n_samples, self.n_features).f(), &self.data)
            .unwrap_or_else(|_| unreachable!("binned buffer does not match its shape"))
    }

    /// Owned samples x features copy
    pub fn to_array(&self) -> Array2<BinnedValue> {
        self.as_array().to_owned()
    }

    /// Per-feature flag telling whether any sample sits in `missing_bin`
    pub fn has_missing_values(&self, missing_bin: BinnedValue) -> Vec<bool> {
        (0..self.n_features)
            .map(|f| self.column(f).iter().any(|&b| b == missing_bin))
            .collect()
    }
}
