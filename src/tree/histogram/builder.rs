//! Histogram construction for split finding.
//!
//! A node's histograms hold, for every feature and every bin, the sums of
//! gradients and Hessians and the number of the node's samples falling in
//! that bin. Features are independent, so each feature's slice of the flat
//! buffer is filled by its own rayon task.

use crate::core::error::{GbdtError, Result};
use crate::core::types::{DataSize, FeatureIndex, GradientValue, Hessians, Hist};
use crate::dataset::BinnedMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Aggregated statistics of one bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub sum_gradients: Hist,
    pub sum_hessians: Hist,
    pub count: DataSize,
}

impl HistogramBin {
    #[inline]
    fn accumulate(&mut self, gradient: GradientValue, hessian: GradientValue) {
        self.sum_gradients += gradient as Hist;
        self.sum_hessians += hessian as Hist;
        self.count += 1;
    }
}

/// Histograms of every feature of one node, stored as one flat
/// `n_features * n_bins` buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Histograms {
    bins: Vec<HistogramBin>,
    n_features: usize,
    n_bins: usize,
}

impl Histograms {
    /// All-zero histograms
    pub fn zeros(n_features: usize, n_bins: usize) -> Self {
        Histograms {
            bins: vec![HistogramBin::default(); n_features * n_bins],
            n_features,
            n_bins,
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Bins of one feature
    #[inline]
    pub fn feature(&self, feature_idx: FeatureIndex) -> &[HistogramBin] {
        let start = feature_idx * self.n_bins;
        &self.bins[start..start + self.n_bins]
    }

    /// Histograms of a sibling node, computed as `parent - self`.
    ///
    /// Counts are exact; gradient and Hessian sums carry the rounding error of
    /// the subtraction.
    pub fn sibling_of(&self, parent: &Histograms) -> Result<Histograms> {
        if parent.n_features != self.n_features || parent.n_bins != self.n_bins {
            return Err(GbdtError::dimension_mismatch(
                format!("{}x{} histograms", parent.n_features, parent.n_bins),
                format!("{}x{} histograms", self.n_features, self.n_bins),
            ));
        }

        let mut bins = parent.bins.clone();
        bins.par_iter_mut()
            .zip(self.bins.par_iter())
            .for_each(|(out, child)| {
                out.sum_gradients -= child.sum_gradients;
                out.sum_hessians -= child.sum_hessians;
                out.count -= child.count;
            });

        Ok(Histograms {
            bins,
            n_features: self.n_features,
            n_bins: self.n_bins,
        })
    }
}

/// Builds node histograms from a binned matrix and per-sample gradients.
#[derive(Debug, Clone, Copy)]
pub struct HistogramBuilder<'a> {
    binned: &'a BinnedMatrix,
    gradients: &'a [GradientValue],
    hessians: Hessians<'a>,
    n_bins: usize,
}

impl<'a> HistogramBuilder<'a> {
    /// Create a builder; fails if the per-sample arrays do not match the
    /// number of rows of `binned`.
    pub fn new(
        binned: &'a BinnedMatrix,
        gradients: &'a [GradientValue],
        hessians: Hessians<'a>,
        n_bins: usize,
    ) -> Result<Self> {
        let n_samples = binned.n_samples();
        if gradients.len() != n_samples {
            return Err(GbdtError::dimension_mismatch(
                format!("{} gradients", n_samples),
                format!("{} gradients", gradients.len()),
            ));
        }
        if let Hessians::PerSample(values) = hessians {
            if values.len() != n_samples {
                return Err(GbdtError::dimension_mismatch(
                    format!("{} hessians", n_samples),
                    format!("{} hessians", values.len()),
                ));
            }
        }

        Ok(HistogramBuilder {
            binned,
            gradients,
            hessians,
            n_bins,
        })
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Histograms over every sample, without going through an index array.
    pub fn build_root(&self) -> Histograms {
        self.build_with(|column, out| match self.hessians {
            Hessians::Constant(_) => {
                for (&bin, &g) in column.iter().zip(self.gradients) {
                    let entry = &mut out[bin as usize];
                    entry.sum_gradients += g as Hist;
                    entry.count += 1;
                }
            }
            Hessians::PerSample(hessians) => {
                for ((&bin, &g), &h) in column.iter().zip(self.gradients).zip(hessians) {
                    out[bin as usize].accumulate(g, h);
                }
            }
        })
    }

    /// Histograms over the samples listed in `sample_indices`.
    pub fn build(&self, sample_indices: &[DataSize]) -> Histograms {
        self.build_with(|column, out| match self.hessians {
            Hessians::Constant(_) => {
                for &idx in sample_indices {
                    let idx = idx as usize;
                    let entry = &mut out[column[idx] as usize];
                    entry.sum_gradients += self.gradients[idx] as Hist;
                    entry.count += 1;
                }
            }
            Hessians::PerSample(hessians) => {
                for &idx in sample_indices {
                    let idx = idx as usize;
                    out[column[idx] as usize].accumulate(self.gradients[idx], hessians[idx]);
                }
            }
        })
    }

    fn build_with<F>(&self, fill: F) -> Histograms
    where
        F: Fn(&[u8], &mut [HistogramBin]) + Sync,
    {
        let n_features = self.binned.n_features();
        let mut histograms = Histograms::zeros(n_features, self.n_bins);
        if self.n_bins == 0 {
            return histograms;
        }

        histograms
            .bins
            .par_chunks_mut(self.n_bins)
            .enumerate()
            .for_each(|(feature_idx, out)| {
                fill(self.binned.column(feature_idx), out);
                if let Hessians::Constant(h) = self.hessians {
                    for entry in out.iter_mut() {
                        entry.sum_hessians = entry.count as Hist * h as Hist;
                    }
                }
            });

        histograms
    }
}
