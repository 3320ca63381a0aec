//! Ошибки конвейера

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Файл не найден, не читается или не разбирается как CSV
    #[error("failed to load {path}: {message}")]
    Load { path: String, message: String },

    /// Нет нужной колонки или она не числовая
    #[error("column '{column}': {message}")]
    Schema { column: String, message: String },

    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    Shape {
        context: String,
        expected: String,
        actual: String,
    },

    /// Потери стали NaN/inf. Обучение при этом доходит до конца
    #[error("loss is not finite at epoch {epoch} (train: {train_loss}, val: {val_loss:?})")]
    NumericInstability {
        epoch: usize,
        train_loss: f64,
        val_loss: Option<f64>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("model is not trained")]
    NotTrained,
}

impl PipelineError {
    pub(crate) fn shape(
        context: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        PipelineError::Shape {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
