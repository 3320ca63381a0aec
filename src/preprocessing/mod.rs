/// Модуль предобработки данных

pub mod normalization;
pub mod selection;
pub mod split;

pub use normalization::{MinMaxParams, MinMaxScaler};
pub use selection::{select_features_and_target, FeatureMatrix, TargetVector};
pub use split::{train_test_split, TrainTestSplit};
