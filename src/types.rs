/// Типы данных для конвейера

use serde::{Deserialize, Serialize};

use crate::models::history::TrainingHistory;
use crate::preprocessing::normalization::MinMaxParams;

/// Кодировка входного файла
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    Utf8,
    #[serde(alias = "iso-8859-1", alias = "latin-1")]
    Latin1,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> Result<String, std::str::Utf8Error> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).map(str::to_owned),
            // ISO-8859-1: каждый байт это кодовая точка U+0000..U+00FF
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Latin1 => "ISO-8859-1",
        }
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Latin1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>, // строки и столбцы в порядке columns
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub units: usize,
    pub activation: String,
    pub params: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub sample: Vec<f64>,
    pub scaled: f64, // в пространстве target-скейлера
    pub amount: f64, // в исходных единицах
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub rows: usize,
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub summaries: Vec<ColumnSummary>,
    pub null_counts: Vec<NullCount>,
    pub correlation: CorrelationMatrix,
    pub feature_scaler: MinMaxParams,
    pub target_scaler: MinMaxParams,
    pub layers: Vec<LayerSummary>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub history: TrainingHistory,
    pub test_loss: Option<f64>,
    pub prediction: PredictionOutput,
}
