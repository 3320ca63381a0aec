//! Min-max нормализация в [0, 1]

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Параметры, выученные скейлером: минимум и максимум по каждой колонке
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxParams {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
}

/// Скейлер создаётся только из данных, поэтому "необученного" состояния нет.
/// Для признаков и для target нужны два отдельных экземпляра
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    data_min: Array1<f64>,
    data_max: Array1<f64>,
}

impl MinMaxScaler {
    pub fn fit(X: &Array2<f64>) -> Result<Self> {
        if X.nrows() == 0 {
            return Err(PipelineError::shape("min-max fit", "at least 1 row", "0 rows"));
        }

        // f64::min/max пропускают NaN, как и sklearn
        let data_min = X.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
        let data_max = X.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));

        Ok(Self { data_min, data_max })
    }

    pub fn fit_transform(X: &Array2<f64>) -> Result<(Array2<f64>, Self)> {
        let scaler = Self::fit(X)?;
        let scaled = scaler.transform(X)?;
        Ok((scaled, scaler))
    }

    pub fn from_params(params: &MinMaxParams) -> Result<Self> {
        if params.data_min.len() != params.data_max.len() {
            return Err(PipelineError::shape(
                "min-max params",
                format!("{} values", params.data_min.len()),
                format!("{} values", params.data_max.len()),
            ));
        }

        Ok(Self {
            data_min: Array1::from(params.data_min.clone()),
            data_max: Array1::from(params.data_max.clone()),
        })
    }

    /// (x - min) / (max - min); постоянная колонка (max == min) переходит в 0.
    /// Пропуски (NaN) остаются NaN
    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width("min-max transform", X)?;

        let mut scaled = X.clone();
        for mut row in scaled.rows_mut() {
            Zip::from(&mut row)
                .and(&self.data_min)
                .and(&self.data_max)
                .for_each(|v, &min, &max| {
                    let range = max - min;
                    *v = if range == 0.0 && !v.is_nan() {
                        0.0
                    } else {
                        (*v - min) / range
                    };
                });
        }

        Ok(scaled)
    }

    /// Обратное преобразование. Для постоянной колонки возвращает её значение
    pub fn inverse_transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width("min-max inverse transform", X)?;

        let mut restored = X.clone();
        for mut row in restored.rows_mut() {
            Zip::from(&mut row)
                .and(&self.data_min)
                .and(&self.data_max)
                .for_each(|v, &min, &max| {
                    *v = *v * (max - min) + min;
                });
        }

        Ok(restored)
    }

    pub fn n_features(&self) -> usize {
        self.data_min.len()
    }

    pub fn data_min(&self) -> &Array1<f64> {
        &self.data_min
    }

    pub fn data_max(&self) -> &Array1<f64> {
        &self.data_max
    }

    pub fn params(&self) -> MinMaxParams {
        MinMaxParams {
            data_min: self.data_min.to_vec(),
            data_max: self.data_max.to_vec(),
        }
    }

    fn check_width(&self, context: &str, X: &Array2<f64>) -> Result<()> {
        if X.ncols() != self.n_features() {
            return Err(PipelineError::shape(
                context,
                format!("{} columns", self.n_features()),
                format!("{} columns", X.ncols()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn scales_each_column_independently() {
        let X = array![[0.0, 10.0], [5.0, 20.0], [10.0, 30.0]];
        let (scaled, scaler) = MinMaxScaler::fit_transform(&X).unwrap();

        assert_eq!(scaled, array![[0.0, 0.0], [0.5, 0.5], [1.0, 1.0]]);
        assert_eq!(scaler.data_min(), &array![0.0, 10.0]);
        assert_eq!(scaler.data_max(), &array![10.0, 30.0]);
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let X = array![[3.0, 1.0], [3.0, 2.0], [3.0, 4.0]];
        let (scaled, scaler) = MinMaxScaler::fit_transform(&X).unwrap();

        assert!(scaled.column(0).iter().all(|&v| v == 0.0));
        assert!(scaled.iter().all(|v| v.is_finite()));

        let restored = scaler.inverse_transform(&scaled).unwrap();
        assert!(restored.column(0).iter().all(|&v| v == 3.0));
    }

    #[test]
    fn feature_and_target_scalers_do_not_alias() {
        let X = array![[1.0, 100.0], [2.0, 200.0]];
        let y = array![[50_000.0], [70_000.0]];

        let (_, x_scaler) = MinMaxScaler::fit_transform(&X).unwrap();
        let (_, y_scaler) = MinMaxScaler::fit_transform(&y).unwrap();

        assert_eq!(x_scaler.data_max(), &array![2.0, 200.0]);
        assert_eq!(y_scaler.data_max(), &array![70_000.0]);

        let back = y_scaler.inverse_transform(&array![[0.5]]).unwrap();
        assert_eq!(back[[0, 0]], 60_000.0);
    }

    #[test]
    fn rejects_wrong_width() {
        let scaler = MinMaxScaler::fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();

        assert!(matches!(
            scaler.transform(&array![[1.0, 2.0, 3.0]]),
            Err(PipelineError::Shape { .. })
        ));
        assert!(matches!(
            scaler.inverse_transform(&array![[1.0]]),
            Err(PipelineError::Shape { .. })
        ));
    }

    #[test]
    fn rejects_empty_input() {
        let X = Array2::<f64>::zeros((0, 3));
        assert!(matches!(MinMaxScaler::fit(&X), Err(PipelineError::Shape { .. })));
    }

    #[test]
    fn missing_cells_are_ignored_by_fit_and_kept_by_transform() {
        let X = array![[2.0, 5.0], [f64::NAN, 5.0], [6.0, f64::NAN], [4.0, 5.0]];
        let (scaled, scaler) = MinMaxScaler::fit_transform(&X).unwrap();

        assert_eq!(scaler.data_min(), &array![2.0, 5.0]);
        assert_eq!(scaler.data_max(), &array![6.0, 5.0]);
        assert!(scaler.data_min().iter().all(|v| v.is_finite()));

        assert!(scaled[[1, 0]].is_nan());
        assert!(scaled[[2, 1]].is_nan());
        assert_eq!(scaled[[0, 0]], 0.0);
        assert_eq!(scaled[[3, 0]], 0.5);
        assert_eq!(scaled[[0, 1]], 0.0);
    }

    #[test]
    fn params_round_trip() {
        let scaler = MinMaxScaler::fit(&array![[1.0, 5.0], [3.0, 9.0]]).unwrap();
        let rebuilt = MinMaxScaler::from_params(&scaler.params()).unwrap();
        assert_eq!(rebuilt, scaler);
    }
}
