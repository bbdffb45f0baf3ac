use crate::cli::TablesArgs;
use crate::error::Result;
use gmxflow::core::tables;
use gmxflow::engine::error::EngineError;
use tracing::info;

pub fn run(args: TablesArgs) -> Result<()> {
    info!("Loading tables from {:?}", &args.dir);
    let report = tables::load_dir(&args.dir);

    if report.collection.is_empty() && report.failures.is_empty() {
        println!("No tables found in {}.", args.dir.display());
        return Ok(());
    }

    for (name, record) in report.collection.iter() {
        println!(
            "  {:<12} {} row(s) x {} column(s)",
            name,
            record.num_rows(),
            record.num_columns()
        );
    }
    if !report.is_clean() {
        println!("{} file(s) could not be loaded:", report.failures.len());
    }
    for failure in &report.failures {
        println!("  ✗ {:<10} {}: {}", failure.name, failure.path.display(), failure.error);
    }

    if let Some(blob) = &args.blob {
        report
            .collection
            .write_blob(blob)
            .map_err(|source| EngineError::Table {
                path: blob.clone(),
                source,
            })?;
        println!(
            "✓ Wrote {} table(s) to {}",
            report.collection.len(),
            blob.display()
        );
    }
    Ok(())
}
