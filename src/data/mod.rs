/// Загрузка и описание исходных данных

pub mod summary;
pub mod synthetic;
pub mod table;

pub use table::{Column, Table};
