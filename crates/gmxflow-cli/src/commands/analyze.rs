use crate::cli::AnalyzeArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use gmxflow::engine::progress::ProgressReporter;
use gmxflow::engine::toolchain::ProcessRunner;
use gmxflow::workflows::{self, analyze::StepStatus};
use tracing::{info, warn};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_analysis(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Running {} analysis step(s) on {}...",
        config.analyses.len(),
        config.input_dir.display()
    );
    let outcome = workflows::analyze::run(&config, &ProcessRunner, &reporter)?;

    for step in &outcome.steps {
        match &step.status {
            StepStatus::Converted { table, rows } => {
                println!("  ✓ {:<7} {} ({} rows)", step.kind, table.display(), rows)
            }
            StepStatus::ToolFailed { code, message } => {
                let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
                println!("  ✗ {:<7} gmx failed (exit {}): {}", step.kind, code, message)
            }
            StepStatus::MissingOutput => {
                println!("  ✗ {:<7} produced no output file", step.kind)
            }
            StepStatus::ConversionFailed { message } => {
                println!("  ✗ {:<7} conversion failed: {}", step.kind, message)
            }
        }
    }

    for failure in &outcome.tables.failures {
        warn!("Table '{}' could not be loaded: {}", failure.name, failure.error);
    }

    println!(
        "{} of {} step(s) converted, {} table(s) loaded.",
        outcome.converted(),
        outcome.steps.len(),
        outcome.tables.collection.len()
    );
    if let Some(blob) = &outcome.blob {
        println!("  Collection: {}", blob.display());
    }
    if let Some(loader) = &outcome.loader {
        println!("  Loader:     {}", loader.display());
    }
    Ok(())
}
