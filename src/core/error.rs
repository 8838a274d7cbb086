//! Error handling and error types for the histogram GBDT engine.
//!
//! Every fallible operation in the crate returns [`Result`]. Configuration and
//! shape problems are reported up front; once inputs pass validation the
//! binning, growing and predicting algorithms cannot fail.

use std::io;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum GbdtError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// A component was used before being fitted
    #[error("Not fitted: {component} must be fitted before calling {operation}")]
    NotFitted {
        component: String,
        operation: String,
    },

    /// Tree construction errors
    #[error("Tree construction error: {message}")]
    TreeConstruction { message: String },

    /// Prediction errors
    #[error("Prediction error: {message}")]
    Prediction { message: String },

    /// Predictor serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Bincode serialization errors
    #[error("Bincode error: {source}")]
    Bincode {
        #[from]
        source: bincode::Error,
    },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Type alias for Results using GbdtError
pub type Result<T> = std::result::Result<T, GbdtError>;

impl GbdtError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        GbdtError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        GbdtError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        GbdtError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a not-fitted error
    pub fn not_fitted<C, O>(component: C, operation: O) -> Self
    where
        C: Into<String>,
        O: Into<String>,
    {
        GbdtError::NotFitted {
            component: component.into(),
            operation: operation.into(),
        }
    }

    /// Create a tree construction error
    pub fn tree_construction<S: Into<String>>(message: S) -> Self {
        GbdtError::TreeConstruction {
            message: message.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction<S: Into<String>>(message: S) -> Self {
        GbdtError::Prediction {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        GbdtError::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        GbdtError::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Configuration and shape errors require the caller to change its
    /// inputs, so none of them is recoverable by retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GbdtError::Config { .. } => false,
            GbdtError::InvalidParameter { .. } => false,
            GbdtError::DimensionMismatch { .. } => false,
            GbdtError::NotFitted { .. } => false,
            GbdtError::TreeConstruction { .. } => false,
            GbdtError::Prediction { .. } => false,
            GbdtError::Serialization { .. } => false,
            GbdtError::IO { .. } => true,
            GbdtError::Json { .. } => false,
            GbdtError::Bincode { .. } => false,
            GbdtError::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            GbdtError::Config { .. } => "config",
            GbdtError::InvalidParameter { .. } => "invalid_parameter",
            GbdtError::DimensionMismatch { .. } => "dimension_mismatch",
            GbdtError::NotFitted { .. } => "not_fitted",
            GbdtError::TreeConstruction { .. } => "tree_construction",
            GbdtError::Prediction { .. } => "prediction",
            GbdtError::Serialization { .. } => "serialization",
            GbdtError::IO { .. } => "io",
            GbdtError::Json { .. } => "json",
            GbdtError::Bincode { .. } => "bincode",
            GbdtError::Internal { .. } => "internal",
        }
    }
}

/// Builds a [`GbdtError::Config`] from a message or a format string
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::GbdtError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::GbdtError::config(format!($fmt, $($arg)*))
    };
}
