use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Blob serialization error: {0}")]
    Blob(#[from] serde_pickle::Error),
}

/// A single cell of a tabular record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Number(f64),
    Text(String),
}

impl Field {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) => Field::Number(value),
            Err(_) => Field::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Field::Number(v) => Some(*v),
            Field::Text(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(v) => write!(f, "{}", v),
            Field::Text(s) => f.write_str(s),
        }
    }
}

/// Rows of delimited fields with no header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabularRecord {
    rows: Vec<Vec<Field>>,
}

impl TabularRecord {
    pub fn new(rows: Vec<Vec<Field>>) -> Self {
        Self { rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(Field::parse).collect());
        }
        Ok(Self { rows })
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn rows(&self) -> &[Vec<Field>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row; rows may be ragged.
    pub fn num_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column, `None` where a row is too short.
    pub fn column(&self, index: usize) -> Vec<Option<&Field>> {
        self.rows.iter().map(|row| row.get(index)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_numbers_and_text_without_header() {
        let record = TabularRecord::from_reader(Cursor::new("0.0,1.5\n10.0,n/a\n")).unwrap();
        assert_eq!(record.num_rows(), 2);
        assert_eq!(record.rows()[0], vec![Field::Number(0.0), Field::Number(1.5)]);
        assert_eq!(
            record.rows()[1],
            vec![Field::Number(10.0), Field::Text("n/a".into())]
        );
    }

    #[test]
    fn tolerates_leading_empty_column_and_ragged_rows() {
        let record = TabularRecord::from_reader(Cursor::new(",1.0,2.0\n3.0\n")).unwrap();
        assert!(record.rows()[0][0].is_empty());
        assert_eq!(record.num_columns(), 3);

        let column = record.column(2);
        assert_eq!(column[0].and_then(Field::as_f64), Some(2.0));
        assert_eq!(column[1], None);
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let bytes: &[u8] = b"1.0,\xff\xfe\n";
        let result = TabularRecord::from_reader(bytes);
        assert!(matches!(result, Err(TableError::Csv(_))));
    }

    #[test]
    fn empty_input_gives_empty_record() {
        let record = TabularRecord::from_reader(Cursor::new("")).unwrap();
        assert!(record.is_empty());
        assert_eq!(record.num_columns(), 0);
    }
}
