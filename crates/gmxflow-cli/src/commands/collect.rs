use crate::cli::CollectArgs;
use crate::error::{CliError, Result};
use gmxflow::workflows::{
    self,
    collect::{DEFAULT_VALUE_COLUMN, STANDARD_KEYS},
};
use std::fs::File;
use tracing::{info, warn};

pub fn run(args: CollectArgs) -> Result<()> {
    if args.column == DEFAULT_VALUE_COLUMN && !STANDARD_KEYS.contains(&args.key.as_str()) {
        warn!(
            "Table '{}' has no known value column; using column {}.",
            args.key, args.column
        );
    }
    let table = workflows::collect::run(&args.runs, &args.key, args.column, &args.blob_name)?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!("Writing combined '{}' table to {:?}", args.key, &args.output);
    File::create(&args.output)
        .map_err(anyhow::Error::from)
        .and_then(|file| table.write_csv(file).map_err(anyhow::Error::from))
        .map_err(|source| CliError::Output {
            path: args.output.clone(),
            source,
        })?;

    println!(
        "✓ Combined {} run(s), {} row(s) into {}",
        table.labels.len(),
        table.num_rows(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gmxflow::core::tables::{DEFAULT_BLOB_NAME, TableCollection};
    use gmxflow::core::tabular::{Field, TabularRecord};
    use gmxflow::engine::error::EngineError;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn write_run(root: &Path, name: &str, values: &[f64]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, v)| vec![Field::Number(i as f64 * 10.0), Field::Number(*v)])
            .collect();
        let mut collection = TableCollection::new();
        collection.insert("rg", TabularRecord::new(rows));
        collection.write_blob(&dir.join(DEFAULT_BLOB_NAME)).unwrap();
        dir
    }

    fn args(runs: Vec<PathBuf>, key: &str, output: PathBuf) -> CollectArgs {
        CollectArgs {
            runs,
            key: key.to_string(),
            column: DEFAULT_VALUE_COLUMN,
            output,
            blob_name: DEFAULT_BLOB_NAME.to_string(),
        }
    }

    #[test]
    fn combined_table_is_written_to_a_new_directory() {
        let root = tempdir().unwrap();
        let runs = vec![
            write_run(root.path(), "wt", &[1.5, 1.25]),
            write_run(root.path(), "mutant", &[2.5]),
        ];
        let output = root.path().join("summary/rg.csv");

        run(args(runs, "rg", output.clone())).unwrap();

        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "wt,mutant\n1.5,2.5\n1.25,\n"
        );
    }

    #[test]
    fn unknown_table_key_fails_without_output() {
        let root = tempdir().unwrap();
        let runs = vec![write_run(root.path(), "wt", &[1.5])];
        let output = root.path().join("sasa.csv");

        let result = run(args(runs, "sasa", output.clone()));

        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::MissingTable { .. }))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn output_path_that_is_a_directory_is_an_output_error() {
        let root = tempdir().unwrap();
        let runs = vec![write_run(root.path(), "wt", &[1.5])];

        let result = run(args(runs, "rg", root.path().to_path_buf()));

        assert!(matches!(result, Err(CliError::Output { .. })));
    }
}
