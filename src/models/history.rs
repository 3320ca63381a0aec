/// История обучения: потери по эпохам

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: Option<f64>,
}

impl EpochRecord {
    pub fn is_finite(&self) -> bool {
        self.train_loss.is_finite() && self.val_loss.map_or(true, f64::is_finite)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    records: Vec<EpochRecord>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&EpochRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    pub fn train_losses(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.train_loss).collect()
    }

    pub fn val_losses(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.val_loss).collect()
    }

    pub fn first_non_finite(&self) -> Option<&EpochRecord> {
        self.records.iter().find(|r| !r.is_finite())
    }

    /// Обучение не прерывается на NaN/inf; проверка делается уже после него
    pub fn ensure_finite(&self) -> Result<()> {
        match self.first_non_finite() {
            Some(r) => Err(PipelineError::NumericInstability {
                epoch: r.epoch,
                train_loss: r.train_loss,
                val_loss: r.val_loss,
            }),
            None => Ok(()),
        }
    }
}
