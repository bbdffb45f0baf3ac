//! Extraction of the per-component energy tables from a gmx_MMPBSA
//! `FINAL_RESULTS_MMPBSA.dat` report.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_RESULTS_STEM: &str = "FINAL_RESULTS_MMPBSA";

#[derive(Debug, Error)]
pub enum MmpbsaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnergySystem {
    Complex,
    Receptor,
    Ligand,
    Delta,
}

impl EnergySystem {
    /// Recognizes a section title such as `Complex:` or
    /// `Delta (Complex - Receptor - Ligand):`.
    fn from_header(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if !trimmed.ends_with(':') {
            return None;
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("delta") || lower.contains(" delta") {
            Some(Self::Delta)
        } else if lower.starts_with("complex") {
            Some(Self::Complex)
        } else if lower.starts_with("receptor") {
            Some(Self::Receptor)
        } else if lower.starts_with("ligand") {
            Some(Self::Ligand)
        } else {
            None
        }
    }
}

/// Column names of the converted table, in `EnergyRow` field order.
pub const CSV_HEADER: [&str; 7] = [
    "System",
    "Energy_Component",
    "Average",
    "SD(Prop.)",
    "SD",
    "SEM(Prop.)",
    "SEM",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyRow {
    #[serde(rename = "System")]
    pub system: EnergySystem,
    #[serde(rename = "Energy_Component")]
    pub component: String,
    #[serde(rename = "Average")]
    pub average: f64,
    #[serde(rename = "SD(Prop.)")]
    pub sd_prop: f64,
    #[serde(rename = "SD")]
    pub sd: f64,
    #[serde(rename = "SEM(Prop.)")]
    pub sem_prop: f64,
    #[serde(rename = "SEM")]
    pub sem: f64,
}

impl EnergyRow {
    fn parse(system: EnergySystem, line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            return None;
        }
        let mut values = [0.0f64; 5];
        for (slot, raw) in values.iter_mut().zip(&parts[1..6]) {
            *slot = raw.parse().ok()?;
        }
        Some(Self {
            system,
            component: parts[0].to_string(),
            average: values[0],
            sd_prop: values[1],
            sd: values[2],
            sem_prop: values[3],
            sem: values[4],
        })
    }
}

/// Collects every numeric energy row, tagged with the section it appears in.
///
/// Any other line ending in `:` (for example `GENERALIZED BORN:`) closes the
/// current section; rows outside a section are ignored.
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<EnergyRow>, MmpbsaError> {
    let mut rows = Vec::new();
    let mut current: Option<EnergySystem> = None;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('-') {
            continue;
        }

        if let Some(system) = EnergySystem::from_header(trimmed) {
            current = Some(system);
            continue;
        }
        if trimmed.ends_with(':') {
            current = None;
            continue;
        }

        if let Some(system) = current {
            if let Some(row) = EnergyRow::parse(system, trimmed) {
                rows.push(row);
            }
        }
    }

    Ok(rows)
}

/// Writes [`CSV_HEADER`] followed by one record per row. The header is
/// present even when `rows` is empty.
pub fn write_csv<W: io::Write>(rows: &[EnergyRow], writer: W) -> Result<(), MmpbsaError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Parses `path` and writes the rows next to it with a `.csv` extension.
pub fn convert_file(path: &Path) -> Result<PathBuf, MmpbsaError> {
    debug!("Parsing gmx_MMPBSA results from {:?}", path);
    let rows = parse(BufReader::new(File::open(path)?))?;

    let output = path.with_extension("csv");
    write_csv(&rows, File::create(&output)?)?;
    info!("Wrote {} energy row(s) to {:?}", rows.len(), output);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const REPORT: &str = "\
| Run on Tue Oct 14 2026
GENERALIZED BORN:

Complex:
Energy Component            Average     SD(Prop.)         SD   SEM(Prop.)        SEM
-------------------------------------------------------------------------------------
BOND                      1510.2031       29.0812    29.0812       2.9081     2.9081
VDWAALS                  -2094.7305       20.1117    20.1117       2.0112     2.0112

TOTAL                    -5561.8418       35.5214    35.5214       3.5521     3.5521

Receptor:
Energy Component            Average     SD(Prop.)         SD   SEM(Prop.)        SEM
-------------------------------------------------------------------------------------
BOND                      1480.0015       28.1234    28.1234       2.8123     2.8123

Ligand:
Energy Component            Average     SD(Prop.)         SD   SEM(Prop.)        SEM
-------------------------------------------------------------------------------------
BOND                        30.2016        3.1010     3.1010       0.3101     0.3101

Delta (Complex - Receptor - Ligand):
Energy Component            Average     SD(Prop.)         SD   SEM(Prop.)        SEM
-------------------------------------------------------------------------------------
ΔVDWAALS                   -45.1234        3.4567     3.4567       0.3457     0.3457
ΔTOTAL                     -30.5000        4.0000     4.0000       0.4000     0.4000
-------------------------------------------------------------------------------------
Using Normal Mode Entropy Approximation:
BOGUS                         1.0           2.0        3.0          4.0        5.0
";

    #[test]
    fn rows_are_grouped_by_system() {
        let rows = parse(Cursor::new(REPORT)).unwrap();
        let summary: Vec<(EnergySystem, &str)> = rows
            .iter()
            .map(|r| (r.system, r.component.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (EnergySystem::Complex, "BOND"),
                (EnergySystem::Complex, "VDWAALS"),
                (EnergySystem::Complex, "TOTAL"),
                (EnergySystem::Receptor, "BOND"),
                (EnergySystem::Ligand, "BOND"),
                (EnergySystem::Delta, "ΔVDWAALS"),
                (EnergySystem::Delta, "ΔTOTAL"),
            ]
        );
        let total = rows.last().unwrap();
        assert_eq!(total.average, -30.5);
        assert_eq!(total.sem, 0.4);
    }

    #[test]
    fn header_and_short_lines_are_skipped() {
        let rows = parse(Cursor::new("Complex:\nEnergy Component Average\nEEL 1 2 3\n")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn csv_has_fixed_header() {
        let rows = parse(Cursor::new(REPORT)).unwrap();
        let mut out = Vec::new();
        write_csv(&rows[..1], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("System,Energy_Component,Average,SD(Prop.),SD,SEM(Prop.),SEM")
        );
        assert_eq!(
            lines.next(),
            Some("Complex,BOND,1510.2031,29.0812,29.0812,2.9081,2.9081")
        );
    }

    #[test]
    fn report_without_rows_still_gets_a_header() {
        let rows = parse(Cursor::new("GENERALIZED BORN:\n\nComplex:\n")).unwrap();
        assert!(rows.is_empty());

        let mut out = Vec::new();
        write_csv(&rows, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "System,Energy_Component,Average,SD(Prop.),SD,SEM(Prop.),SEM\n"
        );
    }

    #[test]
    fn convert_file_replaces_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("{DEFAULT_RESULTS_STEM}.dat"));
        std::fs::write(&path, REPORT).unwrap();

        let output = convert_file(&path).unwrap();

        assert_eq!(output, dir.path().join(format!("{DEFAULT_RESULTS_STEM}.csv")));
        let content = std::fs::read_to_string(output).unwrap();
        assert_eq!(content.lines().count(), 8);
    }
}
