//! Shared data generators and metrics for the integration tests.

#![allow(dead_code)]

use ndarray::{s, Array1, Array2};
use rand::prelude::*;
use rand_distr::StandardNormal;

/// Linear regression problem with Gaussian features where only the first
/// `n_informative` features carry signal.
pub fn make_regression(
    n_samples: usize,
    n_features: usize,
    n_informative: usize,
    seed: u64,
) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_simple_fn((n_samples, n_features), || {
        rng.sample::<f64, _>(StandardNormal)
    });
    let coef: Vec<f64> = (0..n_informative).map(|_| 100.0 * rng.gen::<f64>()).collect();

    let y = x
        .rows()
        .into_iter()
        .map(|row| row.iter().zip(&coef).map(|(v, c)| v * c).sum::<f64>())
        .collect();
    (x, y)
}

/// Uniform features in `[-5, 5)`
pub fn create_test_features(n_samples: usize, n_features: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_simple_fn((n_samples, n_features), || rng.gen_range(-5.0..5.0))
}

/// Replace roughly `rate` of the entries of `x` by NaN
pub fn inject_missing(x: &mut Array2<f64>, rate: f64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for value in x.iter_mut() {
        if rng.gen::<f64>() < rate {
            *value = f64::NAN;
        }
    }
}

/// Shuffled train/test split keeping `test_fraction` of the rows for testing
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
    let n = x.nrows();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    let (test_idx, train_idx) = indices.split_at(n_test);

    (
        x.select(ndarray::Axis(0), train_idx),
        x.select(ndarray::Axis(0), test_idx),
        y.select(ndarray::Axis(0), train_idx),
        y.select(ndarray::Axis(0), test_idx),
    )
}

/// Least squares gradients at a zero prediction
pub fn least_squares_gradients(y: &Array1<f64>) -> Vec<f32> {
    y.iter().map(|&v| -v as f32).collect()
}

/// Coefficient of determination
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let mean = y_true.mean().unwrap_or(0.0);
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    1.0 - ss_res / ss_tot
}

/// First `n` rows of `x`
pub fn head(x: &Array2<f64>, n: usize) -> Array2<f64> {
    x.slice(s![..n, ..]).to_owned()
}
