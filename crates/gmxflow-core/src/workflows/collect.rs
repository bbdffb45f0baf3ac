//! Side-by-side comparison of one analysis across several runs.

use crate::core::tables::TableCollection;
use crate::core::tabular::Field;
use crate::engine::error::EngineError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Value column of a two-column converted series (time, value).
pub const DEFAULT_VALUE_COLUMN: usize = 1;

/// Keys for which the value column is well known.
pub const STANDARD_KEYS: [&str; 4] = ["rmsd", "rg", "sasa", "hbond"];

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedTable {
    pub labels: Vec<String>,
    pub columns: Vec<Vec<Option<Field>>>,
}

impl CombinedTable {
    pub fn num_rows(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Writes a header of labels followed by rows aligned by position;
    /// shorter columns are padded with empty cells.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.labels)?;
        for row in 0..self.num_rows() {
            let cells = self.columns.iter().map(|column| {
                column
                    .get(row)
                    .and_then(Option::as_ref)
                    .map(Field::to_string)
                    .unwrap_or_default()
            });
            csv_writer.write_record(cells)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Takes column `column` of table `key` from each run's serialized
/// collection, labelled with the run directory name.
#[instrument(skip_all, name = "collect_workflow", fields(key = %key))]
pub fn run(
    run_dirs: &[PathBuf],
    key: &str,
    column: usize,
    blob_name: &str,
) -> Result<CombinedTable, EngineError> {
    let mut labels = Vec::with_capacity(run_dirs.len());
    let mut columns = Vec::with_capacity(run_dirs.len());

    for dir in run_dirs {
        let blob = dir.join(blob_name);
        let collection = TableCollection::read_blob(&blob).map_err(|source| EngineError::Table {
            path: blob.clone(),
            source,
        })?;
        let table = collection
            .get(key)
            .ok_or_else(|| EngineError::MissingTable {
                key: key.to_string(),
                path: blob.clone(),
            })?;

        let values: Vec<Option<Field>> = table.column(column).into_iter().map(|f| f.cloned()).collect();
        debug!("Collected {} value(s) of '{}' from {:?}", values.len(), key, dir);

        labels.push(run_label(dir));
        columns.push(values);
    }

    Ok(CombinedTable { labels, columns })
}

fn run_label(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
