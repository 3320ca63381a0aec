//! Случайное разбиение на train/test

#![allow(non_snake_case)]

use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;

use crate::error::{PipelineError, Result};
use crate::utils::seeded_rng;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array2<f64>,
    pub y_test: Array2<f64>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Размер test = floor(n * test_fraction), train получает остальное.
/// Без seed результат меняется от запуска к запуску
pub fn train_test_split(
    X: &Array2<f64>,
    y: &Array2<f64>,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<TrainTestSplit> {
    if X.nrows() != y.nrows() {
        return Err(PipelineError::shape(
            "train/test split",
            format!("{} target rows", X.nrows()),
            format!("{} target rows", y.nrows()),
        ));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::Config(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let n = X.nrows();
    let n_test = (n as f64 * test_fraction).floor() as usize;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = seeded_rng(seed);
    indices.shuffle(&mut rng);

    let test_indices = indices[..n_test].to_vec();
    let train_indices = indices[n_test..].to_vec();

    Ok(TrainTestSplit {
        x_train: X.select(Axis(0), &train_indices),
        x_test: X.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}
