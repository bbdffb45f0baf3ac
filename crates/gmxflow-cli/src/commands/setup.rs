use crate::cli::SetupArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use gmxflow::{engine::progress::ProgressReporter, workflows};
use tracing::info;

pub fn run(args: SetupArgs) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_setup(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Staging '{}' from {} into {}...",
        config.name,
        config.source_dir.display(),
        config.target_dir.display()
    );
    let outcome = workflows::setup::run(&config, &reporter)?;

    println!(
        "✓ Staged {} file(s) and {}/",
        outcome.copied_files.len(),
        outcome.copied_tree.display()
    );
    println!("  Parameters: {}", outcome.parameter_file.display());
    println!("  Run script: {}", outcome.run_script.display());
    Ok(())
}
