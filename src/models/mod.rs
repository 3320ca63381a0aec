/// Модель регрессии и её обучение

pub mod history;
pub mod network;
pub mod optimizer;

pub use history::{EpochRecord, TrainingHistory};
pub use network::{Activation, ModelState, Regressor};
pub use optimizer::Adam;
