//! Выбор признаков и целевой переменной

#![allow(non_snake_case)]

use ndarray::{Array2, Axis};

use crate::data::Table;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

/// Целевая колонка в форме (n, 1)
#[derive(Debug, Clone, PartialEq)]
pub struct TargetVector {
    pub column: String,
    pub values: Array2<f64>,
}

/// Признаки = таблица без `drop` и без `target`, в порядке заголовка.
/// Все имена проверяются до построения матрицы
pub fn select_features_and_target<S: AsRef<str>>(
    table: &Table,
    drop: &[S],
    target: &str,
) -> Result<(FeatureMatrix, TargetVector)> {
    let drop: Vec<&str> = drop.iter().map(|d| d.as_ref()).collect();
    for name in drop.iter().copied().chain(std::iter::once(target)) {
        table.column(name)?;
    }

    let target_values = numeric_column(table, target)?;
    let y = target_values.to_owned().insert_axis(Axis(1));

    let feature_names: Vec<String> = table
        .column_names()
        .iter()
        .filter(|name| name.as_str() != target && !drop.contains(&name.as_str()))
        .cloned()
        .collect();

    let mut X = Array2::zeros((table.n_rows(), feature_names.len()));
    for (j, name) in feature_names.iter().enumerate() {
        X.column_mut(j).assign(numeric_column(table, name)?);
    }

    Ok((
        FeatureMatrix {
            columns: feature_names,
            values: X,
        },
        TargetVector {
            column: target.to_string(),
            values: y,
        },
    ))
}

fn numeric_column<'a>(table: &'a Table, name: &str) -> Result<&'a ndarray::Array1<f64>> {
    table
        .column(name)?
        .as_numeric()
        .ok_or_else(|| PipelineError::Schema {
            column: name.to_string(),
            message: "is not numeric".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{car_purchase_table, CAR_PURCHASE_AMOUNT};

    const DROP: [&str; 3] = ["Customer Name", "Customer e-mail", "Country"];

    #[test]
    fn keeps_numeric_features_in_header_order() {
        let table = car_purchase_table(20, 3).unwrap();
        let (features, target) =
            select_features_and_target(&table, &DROP, CAR_PURCHASE_AMOUNT).unwrap();

        assert_eq!(
            features.columns,
            vec!["Gender", "Age", "Annual Salary", "Credit Card Debt", "Net Worth"]
        );
        assert_eq!(features.values.dim(), (20, 5));
        assert_eq!(target.values.dim(), (20, 1));

        let amount = table.column(CAR_PURCHASE_AMOUNT).unwrap().as_numeric().unwrap();
        assert_eq!(target.values[[7, 0]], amount[7]);
    }

    #[test]
    fn missing_drop_column_is_schema_error() {
        let table = car_purchase_table(5, 3).unwrap();
        let err = select_features_and_target(&table, &["Phone"], CAR_PURCHASE_AMOUNT).unwrap_err();

        match err {
            PipelineError::Schema { column, .. } => assert_eq!(column, "Phone"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_target_is_schema_error() {
        let table = car_purchase_table(5, 3).unwrap();
        let err = select_features_and_target(&table, &DROP, "Price").unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn text_feature_is_rejected() {
        let table = car_purchase_table(5, 3).unwrap();
        let err = select_features_and_target(&table, &["Customer Name"], CAR_PURCHASE_AMOUNT)
            .unwrap_err();

        match err {
            PipelineError::Schema { column, message } => {
                assert_eq!(column, "Customer e-mail");
                assert!(message.contains("not numeric"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
