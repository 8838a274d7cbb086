//! Configuration structures for the bin mapper and the tree grower.
//!
//! Both configurations follow the same pattern: a plain serde struct with
//! sensible defaults, a `validate()` method reporting the first invalid
//! parameter, and JSON/TOML file loading.

use crate::core::constants::*;
use crate::core::error::{GbdtError, Result};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a [`BinMapper`](crate::dataset::BinMapper).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinMapperConfig {
    /// Number of bins, including the bin reserved for missing values.
    /// Non-missing values use at most `n_bins - 1` bins.
    pub n_bins: usize,
    /// Row cap used when learning thresholds; `None` uses every row.
    /// An absent key in a config file means the default cap.
    pub subsample: Option<usize>,
    /// Categorical mask, one flag per feature; `None` means all numerical
    pub categorical: Option<Vec<bool>>,
    /// Seed of the subsampling generator
    pub random_state: u64,
}

impl Default for BinMapperConfig {
    fn default() -> Self {
        BinMapperConfig {
            n_bins: DEFAULT_N_BINS,
            subsample: Some(DEFAULT_SUBSAMPLE),
            categorical: None,
            random_state: DEFAULT_RANDOM_STATE,
        }
    }
}

impl BinMapperConfig {
    /// Create a configuration with `n_bins` bins and default settings otherwise
    pub fn with_n_bins(n_bins: usize) -> Self {
        BinMapperConfig {
            n_bins,
            ..Default::default()
        }
    }

    /// Number of bins available to non-missing values
    pub fn max_bins(&self) -> usize {
        self.n_bins - 1
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(MIN_N_BINS..=MAX_N_BINS).contains(&self.n_bins) {
            return Err(GbdtError::invalid_parameter(
                "n_bins",
                self.n_bins.to_string(),
                format!(
                    "should be no smaller than {} and no larger than {}",
                    MIN_N_BINS, MAX_N_BINS
                ),
            ));
        }

        if self.subsample == Some(0) {
            return Err(GbdtError::invalid_parameter(
                "subsample",
                "0",
                "must be positive or None",
            ));
        }

        Ok(())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = load_config_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_config_file(self, path.as_ref())
    }
}

/// Configuration of a [`TreeGrower`](crate::tree::TreeGrower).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowerConfig {
    /// Maximum number of leaves per tree; `None` means unbounded
    pub max_leaf_nodes: Option<usize>,
    /// Maximum depth of a leaf; `None` means unbounded
    pub max_depth: Option<usize>,
    /// Minimum number of samples on each side of a split
    pub min_samples_leaf: usize,
    /// A split is only considered if its gain exceeds this value
    pub min_gain_to_split: f64,
    /// Minimum Hessian sum on each side of a split
    pub min_hessian_to_split: f64,
    /// L2 regularization applied to leaf values and gains
    pub l2_regularization: f64,
    /// Factor applied to every leaf value once growth completes
    pub shrinkage: f64,
    /// Minimum sample count of a category to take part in categorical splits
    pub min_category_support: usize,
    /// Smoothing added to the Hessian sum when ranking categories
    pub cat_smooth: f64,
}

impl Default for GrowerConfig {
    fn default() -> Self {
        GrowerConfig {
            max_leaf_nodes: None,
            max_depth: None,
            min_samples_leaf: DEFAULT_MIN_SAMPLES_LEAF,
            min_gain_to_split: DEFAULT_MIN_GAIN_TO_SPLIT,
            min_hessian_to_split: DEFAULT_MIN_HESSIAN_TO_SPLIT,
            l2_regularization: DEFAULT_L2_REGULARIZATION,
            shrinkage: DEFAULT_SHRINKAGE,
            min_category_support: DEFAULT_MIN_CATEGORY_SUPPORT,
            cat_smooth: DEFAULT_CAT_SMOOTH,
        }
    }
}

impl GrowerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(max_leaf_nodes) = self.max_leaf_nodes {
            if max_leaf_nodes < 2 {
                return Err(GbdtError::invalid_parameter(
                    "max_leaf_nodes",
                    max_leaf_nodes.to_string(),
                    "must be at least 2",
                ));
            }
        }

        if let Some(max_depth) = self.max_depth {
            if max_depth < 1 {
                return Err(GbdtError::invalid_parameter(
                    "max_depth",
                    max_depth.to_string(),
                    "must be at least 1",
                ));
            }
        }

        if self.min_samples_leaf < 1 {
            return Err(GbdtError::invalid_parameter(
                "min_samples_leaf",
                self.min_samples_leaf.to_string(),
                "must be at least 1",
            ));
        }

        if !(self.min_gain_to_split >= 0.0) {
            return Err(GbdtError::invalid_parameter(
                "min_gain_to_split",
                self.min_gain_to_split.to_string(),
                "must be non-negative",
            ));
        }

        if !(self.min_hessian_to_split >= 0.0) {
            return Err(GbdtError::invalid_parameter(
                "min_hessian_to_split",
                self.min_hessian_to_split.to_string(),
                "must be non-negative",
            ));
        }

        if !(self.l2_regularization >= 0.0) {
            return Err(GbdtError::invalid_parameter(
                "l2_regularization",
                self.l2_regularization.to_string(),
                "must be non-negative",
            ));
        }

        if !(self.shrinkage > 0.0) || !self.shrinkage.is_finite() {
            return Err(GbdtError::invalid_parameter(
                "shrinkage",
                self.shrinkage.to_string(),
                "must be positive and finite",
            ));
        }

        if !(self.cat_smooth >= 0.0) {
            return Err(GbdtError::invalid_parameter(
                "cat_smooth",
                self.cat_smooth.to_string(),
                "must be non-negative",
            ));
        }

        Ok(())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = load_config_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_config_file(self, path.as_ref())
    }
}

/// Builder for [`GrowerConfig`] collecting validation errors as it goes.
#[derive(Debug)]
pub struct GrowerConfigBuilder {
    config: GrowerConfig,
    validation_errors: Vec<String>,
}

impl GrowerConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        GrowerConfigBuilder {
            config: GrowerConfig::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the maximum number of leaves
    pub fn max_leaf_nodes(mut self, leaves: usize) -> Self {
        if leaves < 2 {
            self.validation_errors
                .push("max_leaf_nodes must be at least 2".to_string());
        }
        self.config.max_leaf_nodes = Some(leaves);
        self
    }

    /// Set the maximum depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        if depth < 1 {
            self.validation_errors
                .push("max_depth must be at least 1".to_string());
        }
        self.config.max_depth = Some(depth);
        self
    }

    /// Set the minimum number of samples per leaf
    pub fn min_samples_leaf(mut self, min_samples: usize) -> Self {
        if min_samples < 1 {
            self.validation_errors
                .push("min_samples_leaf must be at least 1".to_string());
        }
        self.config.min_samples_leaf = min_samples;
        self
    }

    /// Set the minimum gain to split
    pub fn min_gain_to_split(mut self, gain: f64) -> Self {
        self.config.min_gain_to_split = gain;
        self
    }

    /// Set the minimum Hessian sum per side
    pub fn min_hessian_to_split(mut self, hessian: f64) -> Self {
        self.config.min_hessian_to_split = hessian;
        self
    }

    /// Set the L2 regularization
    pub fn l2_regularization(mut self, lambda: f64) -> Self {
        if lambda < 0.0 {
            self.validation_errors
                .push("l2_regularization must be non-negative".to_string());
        }
        self.config.l2_regularization = lambda;
        self
    }

    /// Set the shrinkage applied to leaf values
    pub fn shrinkage(mut self, shrinkage: f64) -> Self {
        self.config.shrinkage = shrinkage;
        self
    }

    /// Set the minimum support of a category in categorical splits
    pub fn min_category_support(mut self, support: usize) -> Self {
        self.config.min_category_support = support;
        self
    }

    /// Set the categorical ranking smoothing
    pub fn cat_smooth(mut self, smooth: f64) -> Self {
        self.config.cat_smooth = smooth;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<GrowerConfig> {
        if !self.validation_errors.is_empty() {
            return Err(GbdtError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for GrowerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn load_config_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GbdtError::config(format!("Failed to read config file: {}", e)))?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .map_err(|e| GbdtError::config(format!("Failed to parse JSON config: {}", e))),
        Some("toml") => toml::from_str(&content)
            .map_err(|e| GbdtError::config(format!("Failed to parse TOML config: {}", e))),
        _ => Err(GbdtError::config(
            "Unsupported config file format. Use .json or .toml",
        )),
    }
}

fn save_config_file<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::to_string_pretty(value)
            .map_err(|e| GbdtError::config(format!("Failed to serialize to JSON: {}", e)))?,
        Some("toml") => toml::to_string_pretty(value)
            .map_err(|e| GbdtError::config(format!("Failed to serialize to TOML: {}", e)))?,
        _ => {
            return Err(GbdtError::config(
                "Unsupported config file format. Use .json or .toml",
            ))
        }
    };

    std::fs::write(path, content)
        .map_err(|e| GbdtError::config(format!("Failed to write config file: {}", e)))?;

    Ok(())
}
