//! Таблица клиентов и загрузка CSV

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ndarray::Array1;

use crate::error::{PipelineError, Result};
use crate::types::TextEncoding;

/// Колонка таблицы. Пустые ячейки числовой колонки хранятся как NaN
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Array1<f64>),
    Text(Vec<String>),
}

impl Column {
    /// Колонка числовая, если каждая непустая ячейка разбирается как f64
    pub fn from_cells(cells: Vec<String>) -> Self {
        let parsed: Option<Vec<f64>> = cells
            .iter()
            .map(|cell| match cell.trim() {
                "" => Some(f64::NAN),
                trimmed => trimmed.parse::<f64>().ok(),
            })
            .collect();

        match parsed {
            Some(values) if values.iter().any(|v| !v.is_nan()) => {
                Column::Numeric(Array1::from(values))
            }
            _ => Column::Text(cells),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&Array1<f64>> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Text(_) => None,
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            Column::Numeric(values) => values.iter().filter(|v| v.is_nan()).count(),
            Column::Text(values) => values.iter().filter(|v| v.trim().is_empty()).count(),
        }
    }

    fn cell(&self, row: usize) -> String {
        match self {
            Column::Numeric(values) if values[row].is_nan() => String::new(),
            Column::Numeric(values) => values[row].to_string(),
            Column::Text(values) => values[row].clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(PipelineError::shape(
                "table columns",
                format!("{} columns", names.len()),
                format!("{} columns", columns.len()),
            ));
        }

        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != n_rows {
                return Err(PipelineError::shape(
                    format!("column '{}'", name),
                    format!("{} rows", n_rows),
                    format!("{} rows", column.len()),
                ));
            }
        }

        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    pub fn from_csv_path(path: impl AsRef<Path>, encoding: TextEncoding) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| PipelineError::Load {
            path: source.clone(),
            message: e.to_string(),
        })?;

        Self::from_csv_reader(file, encoding, &source)
    }

    /// Разбор CSV с заголовком. `source` используется только в сообщениях об ошибках
    /// Файл без строк данных считается ошибкой загрузки
    pub fn from_csv_reader<R: Read>(
        reader: R,
        encoding: TextEncoding,
        source: &str,
    ) -> Result<Self> {
        let load_error = |message: String| PipelineError::Load {
            path: source.to_string(),
            message,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = rdr
            .byte_headers()
            .map_err(|e| load_error(format!("failed to read header: {}", e)))?
            .clone();
        if headers.is_empty() {
            return Err(load_error("missing header row".to_string()));
        }

        let names = headers
            .iter()
            .map(|field| {
                encoding.decode(field).map(|s| s.trim().to_string()).map_err(|e| {
                    load_error(format!("header is not valid {}: {}", encoding.name(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];

        // Количество полей в строке проверяет сам csv (flexible = false)
        for record in rdr.byte_records() {
            let record = record.map_err(|e| load_error(e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            for (column, field) in cells.iter_mut().zip(record.iter()) {
                let value = encoding.decode(field).map_err(|e| {
                    load_error(format!(
                        "line {}: field is not valid {}: {}",
                        line,
                        encoding.name(),
                        e
                    ))
                })?;
                column.push(value);
            }
        }

        if cells.first().map_or(true, Vec::is_empty) {
            return Err(load_error("no data rows after header".to_string()));
        }

        let columns = cells.into_iter().map(Column::from_cells).collect();
        Self::new(names, columns)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_index(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| PipelineError::Schema {
                column: name.to_string(),
                message: format!("not found; available: {:?}", self.names),
            })
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        self.rows(0..n.min(self.n_rows))
    }

    pub fn tail(&self, n: usize) -> Vec<Vec<String>> {
        self.rows(self.n_rows.saturating_sub(n)..self.n_rows)
    }

    fn rows(&self, range: std::ops::Range<usize>) -> Vec<Vec<String>> {
        range
            .map(|row| self.columns.iter().map(|c| c.cell(row)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Customer Name,Customer e-mail,Country,Gender,Age,Annual Salary,Credit Card Debt,Net Worth,Car Purchase Amount\n\
Martina Avila,cubilia.Curae.Phasellus@quisaccumsanconvallis.edu,Bulgaria,0,41.8517198,62812.09301,11609.38091,238961.2505,35321.45877\n\
Harlan Barnes,eu.dolor@diam.co.uk,Belize,0,40.87062335,66646.89292,9572.957136,530973.9078,45115.52566\n\
Naomi Rodriquez,vulputate.mauris.sagittis@ametconsectetueradipiscing.co.uk,Algeria,1,43.15289747,53798.55112,11160.35506,638467.1773,42925.70921\n";

    #[test]
    fn parses_numeric_and_text_columns() {
        let table =
            Table::from_csv_reader(SAMPLE.as_bytes(), TextEncoding::Utf8, "sample").unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 9);
        assert!(matches!(table.column("Country").unwrap(), Column::Text(_)));

        let age = table.column("Age").unwrap().as_numeric().unwrap();
        assert!((age[1] - 40.87062335).abs() < 1e-9);
    }

    #[test]
    fn decodes_latin1_bytes() {
        let mut bytes = b"Name,Age\n".to_vec();
        bytes.extend_from_slice(b"Jos\xe9,30\n");

        let table =
            Table::from_csv_reader(bytes.as_slice(), TextEncoding::Latin1, "latin1").unwrap();
        match table.column("Name").unwrap() {
            Column::Text(values) => assert_eq!(values[0], "José"),
            other => panic!("unexpected column {:?}", other),
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        let bytes = b"Name,Age\nJos\xe9,30\n".to_vec();
        let err = Table::from_csv_reader(bytes.as_slice(), TextEncoding::Utf8, "utf8").unwrap_err();
        assert!(matches!(err, PipelineError::Load { .. }));
    }

    #[test]
    fn rejects_ragged_rows() {
        let csv = "a,b,c\n1,2,3\n4,5\n";
        let err = Table::from_csv_reader(csv.as_bytes(), TextEncoding::Utf8, "ragged").unwrap_err();
        assert!(matches!(err, PipelineError::Load { .. }));
    }

    #[test]
    fn header_without_rows_is_load_error() {
        let csv = "Gender,Age,Car Purchase Amount\n";
        let err = Table::from_csv_reader(csv.as_bytes(), TextEncoding::Utf8, "header-only")
            .unwrap_err();

        match err {
            PipelineError::Load { path, message } => {
                assert_eq!(path, "header-only");
                assert!(message.contains("no data rows"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_load_error() {
        let err =
            Table::from_csv_path("/definitely/not/here.csv", TextEncoding::Latin1).unwrap_err();
        match err {
            PipelineError::Load { path, .. } => assert!(path.contains("not/here.csv")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn empty_cells_become_nan_in_numeric_columns() {
        let csv = "a,b\n1,x\n,y\n3,\n";
        let table = Table::from_csv_reader(csv.as_bytes(), TextEncoding::Utf8, "gaps").unwrap();

        assert_eq!(table.column("a").unwrap().null_count(), 1);
        assert_eq!(table.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn head_and_tail() {
        let table =
            Table::from_csv_reader(SAMPLE.as_bytes(), TextEncoding::Utf8, "sample").unwrap();

        assert_eq!(table.head(2).len(), 2);
        assert_eq!(table.head(2)[0][0], "Martina Avila");
        assert_eq!(table.tail(1)[0][0], "Naomi Rodriquez");
        assert_eq!(table.tail(10).len(), 3);
    }
}
