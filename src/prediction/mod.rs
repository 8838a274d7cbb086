//! Prediction with grown trees.

pub mod predictor;

pub use predictor::{PredictorNode, TreePredictor};
