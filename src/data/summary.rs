//! Описательная статистика по таблице

use ndarray::Array1;

use crate::data::table::Table;
use crate::types::{ColumnSummary, CorrelationMatrix, NullCount};

impl Table {
    /// Статистика по числовым колонкам; пропуски (NaN) не учитываются
    pub fn describe(&self) -> Vec<ColumnSummary> {
        self.columns()
            .filter_map(|(name, column)| {
                let values = column.as_numeric()?;
                let mut present: Vec<f64> =
                    values.iter().copied().filter(|v| !v.is_nan()).collect();
                present.sort_by(|a, b| a.total_cmp(b));
                Some(summarize(name, Array1::from(present)))
            })
            .collect()
    }

    pub fn null_counts(&self) -> Vec<NullCount> {
        self.columns()
            .map(|(name, column)| NullCount {
                column: name.to_string(),
                nulls: column.null_count(),
            })
            .collect()
    }

    /// Корреляция Пирсона между числовыми колонками (по парам без пропусков)
    pub fn correlation_matrix(&self) -> CorrelationMatrix {
        let numeric: Vec<(&str, &Array1<f64>)> = self
            .columns()
            .filter_map(|(name, c)| c.as_numeric().map(|values| (name, values)))
            .collect();

        let mut values = vec![vec![f64::NAN; numeric.len()]; numeric.len()];
        for i in 0..numeric.len() {
            for j in i..numeric.len() {
                let (x, y): (Vec<f64>, Vec<f64>) = numeric[i]
                    .1
                    .iter()
                    .zip(numeric[j].1.iter())
                    .filter(|(x, y)| !x.is_nan() && !y.is_nan())
                    .map(|(&x, &y)| (x, y))
                    .unzip();
                let r = pearson(&Array1::from(x), &Array1::from(y));
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix {
            columns: numeric.iter().map(|(name, _)| name.to_string()).collect(),
            values,
        }
    }
}

fn summarize(name: &str, sorted: Array1<f64>) -> ColumnSummary {
    let count = sorted.len();
    let mean = sorted.mean().unwrap_or(f64::NAN);
    // Выборочное стандартное отклонение (ddof = 1)
    let std = if count > 1 { sorted.std(1.0) } else { f64::NAN };

    ColumnSummary {
        column: name.to_string(),
        count,
        mean,
        std,
        min: quantile(&sorted, 0.0),
        p25: quantile(&sorted, 0.25),
        p50: quantile(&sorted, 0.5),
        p75: quantile(&sorted, 0.75),
        max: quantile(&sorted, 1.0),
    }
}

/// Квантиль с линейной интерполяцией; `sorted` уже отсортирован
fn quantile(sorted: &Array1<f64>, q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn pearson(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    if x.len() < 2 {
        return f64::NAN;
    }
    let dx = x - x.mean().unwrap_or(0.0);
    let dy = y - y.mean().unwrap_or(0.0);

    let var_x = dx.dot(&dx);
    let var_y = dy.dot(&dy);
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    dx.dot(&dy) / (var_x.sqrt() * var_y.sqrt())
}
