//! Полносвязная сеть для регрессии: Dense(relu) x N -> Dense(linear, 1)

#![allow(non_snake_case)]

use ndarray::{s, Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{RegressorConfig, TrainingConfig};
use crate::error::{PipelineError, Result};
use crate::models::history::{EpochRecord, TrainingHistory};
use crate::models::optimizer::Adam;
use crate::types::LayerSummary;
use crate::utils::seeded_rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Linear,
}

impl Activation {
    fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            // NaN проходит насквозь, чтобы расхождение было видно в потерях
            Activation::Relu => z.mapv(|v| if v < 0.0 { 0.0 } else { v }),
            Activation::Linear => z.clone(),
        }
    }

    fn derivative(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(z.raw_dim()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activation::Relu => "relu",
            Activation::Linear => "linear",
        }
    }
}

#[derive(Debug, Clone)]
struct Dense {
    weights: Array2<f64>, // (fan_in, fan_out)
    bias: Array1<f64>,
    activation: Activation,
}

impl Dense {
    /// Glorot uniform: U(-l, l), l = sqrt(6 / (fan_in + fan_out)); bias = 0
    fn glorot_uniform(
        fan_in: usize,
        fan_out: usize,
        activation: Activation,
        rng: &mut StdRng,
    ) -> Self {
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        let weights = Array2::from_shape_fn((fan_in, fan_out), |_| rng.gen_range(-limit..limit));

        Self {
            weights,
            bias: Array1::zeros(fan_out),
            activation,
        }
    }

    fn pre_activation(&self, input: &Array2<f64>) -> Array2<f64> {
        input.dot(&self.weights) + &self.bias
    }
}

struct LayerGradients {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

/// Untrained -> (fit) -> Trained. Повторный fit продолжает обучение с текущих весов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Untrained,
    Trained,
}

#[derive(Debug, Clone)]
pub struct Regressor {
    config: RegressorConfig,
    layers: Vec<Dense>,
    optimizer: Adam,
    rng: StdRng,
    state: ModelState,
}

impl Regressor {
    /// Один seed задаёт и начальные веса, и перемешивание батчей
    pub fn new(config: RegressorConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;

        let mut rng = seeded_rng(seed);
        let mut layers = Vec::with_capacity(config.hidden_units.len() + 1);
        let mut fan_in = config.input_width;
        for &units in &config.hidden_units {
            layers.push(Dense::glorot_uniform(fan_in, units, Activation::Relu, &mut rng));
            fan_in = units;
        }
        layers.push(Dense::glorot_uniform(fan_in, 1, Activation::Linear, &mut rng));

        Ok(Self {
            optimizer: Adam::new(config.learning_rate),
            config,
            layers,
            rng,
            state: ModelState::Untrained,
        })
    }

    pub fn input_width(&self) -> usize {
        self.config.input_width
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn summary(&self) -> Vec<LayerSummary> {
        self.layers
            .iter()
            .map(|layer| LayerSummary {
                units: layer.weights.ncols(),
                activation: layer.activation.name().to_string(),
                params: layer.weights.len() + layer.bias.len(),
            })
            .collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.summary().iter().map(|l| l.params).sum()
    }

    pub fn layer_weights(&self) -> Vec<(&Array2<f64>, &Array1<f64>)> {
        self.layers.iter().map(|l| (&l.weights, &l.bias)).collect()
    }

    /// Последняя доля `validation_split` строк откладывается под валидацию до
    /// перемешивания; веса обновляются после каждого батча. NaN/inf в потерях
    /// не останавливают обучение, они остаются в истории
    pub fn fit(
        &mut self,
        X: &Array2<f64>,
        y: &Array2<f64>,
        training: &TrainingConfig,
    ) -> Result<TrainingHistory> {
        self.check_input("fit", X)?;
        check_target("fit", X, y)?;
        training.validate()?;

        let n = X.nrows();
        let split_at = (n as f64 * (1.0 - training.validation_split)).floor() as usize;
        if split_at == 0 {
            return Err(PipelineError::Config(format!(
                "no rows left for training: {} rows with validation split {}",
                n, training.validation_split
            )));
        }

        let x_train = X.slice(s![..split_at, ..]).to_owned();
        let y_train = y.slice(s![..split_at, ..]).to_owned();
        let validation = if split_at < n {
            Some((
                X.slice(s![split_at.., ..]).to_owned(),
                y.slice(s![split_at.., ..]).to_owned(),
            ))
        } else {
            None
        };

        tracing::info!(
            "Training regressor: {} train rows, {} validation rows, {} epochs, batch size {}",
            split_at,
            n - split_at,
            training.epochs,
            training.batch_size
        );

        let mut history = TrainingHistory::new();
        let mut order: Vec<usize> = (0..split_at).collect();
        let mut warned = false;

        for epoch in 0..training.epochs {
            order.shuffle(&mut self.rng);

            let mut loss_sum = 0.0;
            for batch in order.chunks(training.batch_size) {
                let xb = x_train.select(Axis(0), batch);
                let yb = y_train.select(Axis(0), batch);
                loss_sum += self.train_batch(&xb, &yb) * batch.len() as f64;
            }

            let record = EpochRecord {
                epoch,
                train_loss: loss_sum / split_at as f64,
                val_loss: validation.as_ref().map(|(xv, yv)| mse(&self.forward(xv), yv)),
            };

            if !record.is_finite() && !warned {
                tracing::warn!(
                    "Loss is not finite at epoch {} (train: {}, val: {:?}), training continues",
                    epoch,
                    record.train_loss,
                    record.val_loss
                );
                warned = true;
            }
            tracing::debug!(
                "Epoch {}: loss {:.6}, val_loss {:?}",
                epoch,
                record.train_loss,
                record.val_loss
            );

            history.record(record);
        }

        self.state = ModelState::Trained;
        if let Some(last) = history.last() {
            tracing::info!("Regressor trained. Final loss: {:.6}", last.train_loss);
        }

        Ok(history)
    }

    /// Возвращает значения в нормализованном пространстве target;
    /// обратное преобразование делает вызывающий код
    pub fn predict(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input("predict", X)?;
        if self.state != ModelState::Trained {
            return Err(PipelineError::NotTrained);
        }
        Ok(self.forward(X))
    }

    /// MSE без обновления весов
    pub fn evaluate(&self, X: &Array2<f64>, y: &Array2<f64>) -> Result<f64> {
        check_target("evaluate", X, y)?;
        let predictions = self.predict(X)?;
        Ok(mse(&predictions, y))
    }

    fn forward(&self, X: &Array2<f64>) -> Array2<f64> {
        self.layers.iter().fold(X.to_owned(), |a, layer| {
            layer.activation.apply(&layer.pre_activation(&a))
        })
    }

    fn train_batch(&mut self, X: &Array2<f64>, y: &Array2<f64>) -> f64 {
        // Прямой проход с сохранением входов и пре-активаций слоёв
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut a = X.to_owned();
        for layer in &self.layers {
            let z = layer.pre_activation(&a);
            let next = layer.activation.apply(&z);
            inputs.push(a);
            pre_activations.push(z);
            a = next;
        }

        let loss = mse(&a, y);

        // dL/da для MSE по всем элементам батча
        let mut grad = (&a - y) * (2.0 / a.len() as f64);
        let mut grads = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate().rev() {
            let delta = grad * &layer.activation.derivative(&pre_activations[i]);
            grads.push(LayerGradients {
                weights: inputs[i].t().dot(&delta),
                bias: delta.sum_axis(Axis(0)),
            });
            grad = delta.dot(&layer.weights.t());
        }
        grads.reverse();

        let params = self.layers.iter_mut().zip(grads.iter()).flat_map(|(layer, g)| {
            let Dense { weights, bias, .. } = layer;
            [
                (weights.view_mut().into_dyn(), g.weights.view().into_dyn()),
                (bias.view_mut().into_dyn(), g.bias.view().into_dyn()),
            ]
        });
        self.optimizer.step(params);

        loss
    }

    fn check_input(&self, context: &str, X: &Array2<f64>) -> Result<()> {
        if X.ncols() != self.config.input_width {
            return Err(PipelineError::shape(
                context,
                format!("{} feature columns", self.config.input_width),
                format!("{} feature columns", X.ncols()),
            ));
        }
        Ok(())
    }
}

fn check_target(context: &str, X: &Array2<f64>, y: &Array2<f64>) -> Result<()> {
    if y.ncols() != 1 {
        return Err(PipelineError::shape(
            context,
            "1 target column",
            format!("{} target columns", y.ncols()),
        ));
    }
    if X.nrows() != y.nrows() {
        return Err(PipelineError::shape(
            context,
            format!("{} target rows", X.nrows()),
            format!("{} target rows", y.nrows()),
        ));
    }
    Ok(())
}

fn mse(predictions: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    (predictions - targets).mapv(|d| d * d).mean().unwrap_or(f64::NAN)
}
