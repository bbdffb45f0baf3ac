//! Loading every tabular file of a results directory into one named
//! collection, and persisting that collection as a single pickle blob.

use crate::core::tabular::{TableError, TabularRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension of the files picked up by [`load_dir`].
pub const TABLE_EXTENSION: &str = "csv";

/// File name of the serialized collection inside a results directory.
pub const DEFAULT_BLOB_NAME: &str = "ana.pickle";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableCollection {
    tables: BTreeMap<String, TabularRecord>,
}

impl TableCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, record: TabularRecord) -> Option<TabularRecord> {
        self.tables.insert(name.into(), record)
    }

    pub fn get(&self, name: &str) -> Option<&TabularRecord> {
        self.tables.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TabularRecord)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Writes the collection as a Python pickle: a dict mapping each name
    /// to a list of rows.
    pub fn write_blob(&self, path: &Path) -> Result<(), TableError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_pickle::to_writer(&mut writer, self, serde_pickle::SerOptions::new())?;
        writer.flush()?;
        info!("Serialized {} table(s) to {:?}", self.len(), path);
        Ok(())
    }

    pub fn read_blob(path: &Path) -> Result<Self, TableError> {
        let reader = BufReader::new(File::open(path)?);
        let collection = serde_pickle::from_reader(reader, serde_pickle::DeOptions::new())?;
        Ok(collection)
    }
}

/// A file that matched the scan but could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub name: String,
    pub path: PathBuf,
    pub error: TableError,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub collection: TableCollection,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads every `*.csv` directly inside `dir`, keyed by file stem.
///
/// A missing or unreadable directory yields an empty report and a warning
/// rather than an error. A file that fails to parse is recorded in
/// [`LoadReport::failures`] and skipped.
pub fn load_dir(dir: &Path) -> LoadReport {
    let mut report = LoadReport::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot scan table directory {:?}: {}", dir, e);
            return report;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_table_extension(path))
        .collect();
    paths.sort();

    if paths.is_empty() {
        warn!("No .{} files found in {:?}", TABLE_EXTENSION, dir);
        return report;
    }

    for path in paths {
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        match TabularRecord::from_path(&path) {
            Ok(record) => {
                debug!(
                    "Loaded table '{}' ({} rows, {} columns)",
                    name,
                    record.num_rows(),
                    record.num_columns()
                );
                report.collection.insert(name, record);
            }
            Err(error) => {
                warn!("Skipping {:?}: {}", path, error);
                report.failures.push(LoadFailure { name, path, error });
            }
        }
    }

    info!(
        "Loaded {} table(s) from {:?} ({} failed)",
        report.collection.len(),
        dir,
        report.failures.len()
    );
    report
}

fn has_table_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TABLE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tabular::Field;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    #[test]
    fn missing_directory_returns_empty_collection() {
        let dir = tempdir().unwrap();
        let report = load_dir(&dir.path().join("does-not-exist"));
        assert!(report.collection.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn directory_without_tables_returns_empty_collection() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "1,2\n").unwrap();
        let report = load_dir(dir.path());
        assert!(report.collection.is_empty());
    }

    #[test]
    fn keys_match_csv_stems_present() {
        let dir = tempdir().unwrap();
        for name in ["rmsd", "rg", "sasa"] {
            fs::write(dir.path().join(format!("{name}.csv")), "0.0,1.0\n").unwrap();
        }
        fs::write(dir.path().join("rmsd.xvg"), "# leftover\n").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();
        fs::write(dir.path().join("nested.csv/inner.csv"), "1\n").unwrap();

        let report = load_dir(dir.path());

        let names: BTreeSet<&str> = report.collection.names().collect();
        assert_eq!(names, BTreeSet::from(["rg", "rmsd", "sasa"]));
        assert_eq!(
            report.collection.get("rg").unwrap().rows()[0],
            vec![Field::Number(0.0), Field::Number(1.0)]
        );
    }

    #[test]
    fn unparsable_file_is_reported_and_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.csv"), "1,2\n").unwrap();
        fs::write(dir.path().join("bad.csv"), b"1,\xff\n").unwrap();

        let report = load_dir(dir.path());

        assert_eq!(report.collection.len(), 1);
        assert!(report.collection.get("good").is_some());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "bad");
        assert!(matches!(report.failures[0].error, TableError::Csv(_)));
    }

    #[test]
    fn blob_round_trip_preserves_collection() {
        let dir = tempdir().unwrap();
        let mut collection = TableCollection::new();
        collection.insert(
            "hbond",
            TabularRecord::new(vec![
                vec![Field::Number(0.0), Field::Number(12.0)],
                vec![Field::Number(10.0), Field::Text("x".into())],
            ]),
        );
        collection.insert("empty", TabularRecord::default());

        let blob = dir.path().join(DEFAULT_BLOB_NAME);
        collection.write_blob(&blob).unwrap();
        let restored = TableCollection::read_blob(&blob).unwrap();

        assert_eq!(restored, collection);
    }

    #[test]
    fn reading_missing_blob_is_io_error() {
        let dir = tempdir().unwrap();
        let result = TableCollection::read_blob(&dir.path().join("none.pickle"));
        assert!(matches!(result, Err(TableError::Io(_))));
    }
}
