//! Car purchase ML - прогноз суммы покупки автомобиля по данным клиента

pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod types;
pub mod utils;

pub use config::{PipelineConfig, RegressorConfig, TrainingConfig};
pub use data::{Column, Table};
pub use error::{PipelineError, Result};
pub use models::*;
pub use preprocessing::*;
pub use types::*;
