//! Конвейер: загрузка -> выбор колонок -> нормализация -> разбиение -> обучение -> прогноз

use ndarray::Array2;

use crate::config::PipelineConfig;
use crate::data::Table;
use crate::error::{PipelineError, Result};
use crate::models::history::TrainingHistory;
use crate::models::network::Regressor;
use crate::preprocessing::normalization::MinMaxScaler;
use crate::preprocessing::selection::select_features_and_target;
use crate::preprocessing::split::train_test_split;
use crate::types::{ColumnSummary, CorrelationMatrix, NullCount, PipelineReport, PredictionOutput};

/// Состояние после обучения. Расхождение потерь здесь ещё не проверено:
/// история доступна для диагностики до вызова `report`
pub struct TrainedPipeline {
    pub rows: usize,
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub summaries: Vec<ColumnSummary>,
    pub null_counts: Vec<NullCount>,
    pub correlation: CorrelationMatrix,
    pub feature_scaler: MinMaxScaler,
    pub target_scaler: MinMaxScaler,
    pub regressor: Regressor,
    pub train_rows: usize,
    pub test_rows: usize,
    pub history: TrainingHistory,
    pub test_loss: Option<f64>,
}

pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let table = Table::from_csv_path(&config.data_path, config.encoding)?;
    run_on_table(&table, config)
}

/// То же, что `run`, но для уже загруженной таблицы
pub fn run_on_table(table: &Table, config: &PipelineConfig) -> Result<PipelineReport> {
    train(table, config)?.report(&config.sample)
}

pub fn train(table: &Table, config: &PipelineConfig) -> Result<TrainedPipeline> {
    config.validate()?;
    tracing::info!("Loaded table: {} rows, {} columns", table.n_rows(), table.n_cols());
    for row in table.head(5) {
        tracing::debug!("head: {:?}", row);
    }

    let summaries = table.describe();
    for s in &summaries {
        tracing::debug!(
            "{}: count {}, mean {:.2}, std {:.2}, min {:.2}, max {:.2}",
            s.column,
            s.count,
            s.mean,
            s.std,
            s.min,
            s.max
        );
    }
    let null_counts = table.null_counts();
    let nulls: usize = null_counts.iter().map(|n| n.nulls).sum();
    if nulls > 0 {
        tracing::warn!("Table has {} empty cells", nulls);
    }
    let correlation = table.correlation_matrix();

    let (features, target) =
        select_features_and_target(table, &config.drop_columns, &config.target_column)?;
    tracing::info!("Features: {:?}, target: {}", features.columns, target.column);

    // Два независимых скейлера: параметры признаков и target не смешиваются
    let (x_scaled, feature_scaler) = MinMaxScaler::fit_transform(&features.values)?;
    let (y_scaled, target_scaler) = MinMaxScaler::fit_transform(&target.values)?;

    let split = train_test_split(&x_scaled, &y_scaled, config.test_fraction, config.seed)?;
    tracing::info!(
        "Split: {} train rows, {} test rows",
        split.x_train.nrows(),
        split.x_test.nrows()
    );

    let mut regressor = Regressor::new(config.regressor.clone(), config.seed)?;
    for layer in regressor.summary() {
        tracing::debug!("Dense({}, {}): {} params", layer.units, layer.activation, layer.params);
    }

    let history = regressor.fit(&split.x_train, &split.y_train, &config.training)?;

    let test_loss = if split.x_test.nrows() > 0 {
        let loss = regressor.evaluate(&split.x_test, &split.y_test)?;
        tracing::info!("Test loss (scaled MSE): {:.6}", loss);
        Some(loss)
    } else {
        None
    };

    Ok(TrainedPipeline {
        rows: table.n_rows(),
        feature_columns: features.columns,
        target_column: target.column,
        summaries,
        null_counts,
        correlation,
        feature_scaler,
        target_scaler,
        regressor,
        train_rows: split.train_indices.len(),
        test_rows: split.test_indices.len(),
        history,
        test_loss,
    })
}

impl TrainedPipeline {
    /// Прогноз для одного клиента в исходных единицах: признаки проходят через
    /// скейлер признаков, выход сети через обратное преобразование target-скейлера
    pub fn predict_amount(&self, sample: &[f64]) -> Result<PredictionOutput> {
        if sample.len() != self.regressor.input_width() {
            return Err(PipelineError::shape(
                "prediction sample",
                format!("{} values", self.regressor.input_width()),
                format!("{} values", sample.len()),
            ));
        }

        let x = Array2::from_shape_vec((1, sample.len()), sample.to_vec())
            .map_err(|e| PipelineError::shape("prediction sample", "1 row", e))?;
        let x_scaled = self.feature_scaler.transform(&x)?;
        let y_scaled = self.regressor.predict(&x_scaled)?;
        let amount = self.target_scaler.inverse_transform(&y_scaled)?;

        Ok(PredictionOutput {
            sample: sample.to_vec(),
            scaled: y_scaled[[0, 0]],
            amount: amount[[0, 0]],
        })
    }

    /// Прерывается с NumericInstability, если потери разошлись
    pub fn report(self, sample: &[f64]) -> Result<PipelineReport> {
        self.history.ensure_finite()?;
        let prediction = self.predict_amount(sample)?;
        tracing::info!("Expected purchase amount: {:.2}", prediction.amount);

        Ok(PipelineReport {
            rows: self.rows,
            feature_columns: self.feature_columns,
            target_column: self.target_column,
            summaries: self.summaries,
            null_counts: self.null_counts,
            correlation: self.correlation,
            feature_scaler: self.feature_scaler.params(),
            target_scaler: self.target_scaler.params(),
            layers: self.regressor.summary(),
            train_rows: self.train_rows,
            test_rows: self.test_rows,
            history: self.history,
            test_loss: self.test_loss,
            prediction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::data::synthetic::car_purchase_table;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            seed: Some(17),
            training: TrainingConfig {
                epochs: 5,
                batch_size: 16,
                validation_split: 0.2,
            },
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn train_reports_sizes_and_features() {
        let table = car_purchase_table(100, 2).unwrap();
        let trained = train(&table, &small_config()).unwrap();

        assert_eq!(trained.rows, 100);
        assert_eq!(trained.test_rows, 15);
        assert_eq!(trained.train_rows, 85);
        assert_eq!(trained.feature_columns.len(), 5);
        assert_eq!(trained.history.len(), 5);
        assert!(trained.test_loss.is_some());
    }

    #[test]
    fn sample_width_is_checked() {
        let table = car_purchase_table(60, 2).unwrap();
        let trained = train(&table, &small_config()).unwrap();

        let err = trained.predict_amount(&[50.0, 50_000.0, 10_000.0, 600_000.0]).unwrap_err();
        assert!(matches!(err, PipelineError::Shape { .. }));
    }

    #[test]
    fn report_carries_both_scalers() {
        let table = car_purchase_table(60, 2).unwrap();
        let report = train(&table, &small_config())
            .unwrap()
            .report(&[1.0, 50.0, 50_000.0, 10_000.0, 600_000.0])
            .unwrap();

        assert_eq!(report.feature_scaler.data_min.len(), 5);
        assert_eq!(report.target_scaler.data_min.len(), 1);
        assert_eq!(report.prediction.sample.len(), 5);
    }

    #[test]
    fn run_on_table_matches_train_then_report() {
        let table = car_purchase_table(60, 4).unwrap();
        let config = small_config();

        let direct = run_on_table(&table, &config).unwrap();
        let staged = train(&table, &config).unwrap().report(&config.sample).unwrap();

        assert_eq!(direct.rows, 60);
        assert_eq!(direct.history, staged.history);
        assert_eq!(direct.prediction.amount, staged.prediction.amount);
    }

    #[test]
    fn run_fails_on_missing_file() {
        let config = PipelineConfig {
            data_path: "/no/such/Car_Purchasing_Data.csv".into(),
            ..small_config()
        };
        assert!(matches!(run(&config), Err(PipelineError::Load { .. })));
    }
}
