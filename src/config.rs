/// Конфигурация конвейера

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::types::TextEncoding;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorConfig {
    #[serde(default = "default_input_width")]
    pub input_width: usize,
    #[serde(default = "default_hidden_units")]
    pub hidden_units: Vec<usize>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_validation_split")]
    pub validation_split: f64, // доля хвоста train-данных под валидацию
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default)]
    pub encoding: TextEncoding,
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
    #[serde(default = "default_target_column")]
    pub target_column: String,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default)]
    pub regressor: RegressorConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_sample")]
    pub sample: Vec<f64>, // Gender, Age, Annual Salary, Credit Card Debt, Net Worth
    #[serde(default)]
    pub history_output: Option<PathBuf>,
}

fn default_input_width() -> usize { 5 }
fn default_hidden_units() -> Vec<usize> { vec![15, 15] }
fn default_learning_rate() -> f64 { 0.001 }
fn default_epochs() -> usize { 100 }
fn default_batch_size() -> usize { 50 }
fn default_validation_split() -> f64 { 0.2 }
fn default_data_path() -> PathBuf { PathBuf::from("Car_Purchasing_Data.csv") }
fn default_target_column() -> String { "Car Purchase Amount".to_string() }
fn default_test_fraction() -> f64 { 0.15 }
fn default_sample() -> Vec<f64> { vec![1.0, 50.0, 50_000.0, 10_000.0, 600_000.0] }

fn default_drop_columns() -> Vec<String> {
    ["Customer Name", "Customer e-mail", "Country"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RegressorConfig {
    fn default() -> Self {
        Self {
            input_width: default_input_width(),
            hidden_units: default_hidden_units(),
            learning_rate: default_learning_rate(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            validation_split: default_validation_split(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            encoding: TextEncoding::default(),
            drop_columns: default_drop_columns(),
            target_column: default_target_column(),
            test_fraction: default_test_fraction(),
            regressor: RegressorConfig::default(),
            training: TrainingConfig::default(),
            seed: None,
            sample: default_sample(),
            history_output: None,
        }
    }
}

impl RegressorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.input_width == 0 || self.hidden_units.iter().any(|&u| u == 0) {
            return Err(PipelineError::Config("layer widths must be positive".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(PipelineError::Config(format!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(PipelineError::Config("epochs must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::Config("batch size must be > 0".to_string()));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(PipelineError::Config(format!(
                "validation split must be in [0, 1), got {}",
                self.validation_split
            )));
        }
        Ok(())
    }
}

impl PipelineConfig {
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            PipelineError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PipelineError::Config(format!(
                "test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        self.regressor.validate()?;
        self.training.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.encoding, TextEncoding::Latin1);
        assert_eq!(config.regressor.hidden_units, vec![15, 15]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"encoding": "iso-8859-1", "seed": 7, "training": {"epochs": 10}}"#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.training.epochs, 10);
        assert_eq!(config.training.batch_size, 50);
        assert_eq!(config.encoding, TextEncoding::Latin1);
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = PipelineConfig::default();
        config.training.batch_size = 0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));

        let mut config = PipelineConfig::default();
        config.training.validation_split = 1.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.regressor.learning_rate = f64::NAN;
        assert!(config.validate().is_err());
    }
}
