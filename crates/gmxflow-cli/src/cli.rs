use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan",
    version,
    about = "gmxflow - Stage GROMACS/gmx_MMPBSA runs, drive trajectory analyses and collect their results as tables.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stage simulation inputs and generate the gmx_MMPBSA control files.
    Setup(SetupArgs),
    /// Run the trajectory analyses and convert their output to CSV tables.
    Analyze(AnalyzeArgs),
    /// Load every CSV table in a directory and optionally serialize the collection.
    Tables(TablesArgs),
    /// Convert a gmx_MMPBSA results file (FINAL_RESULTS_MMPBSA.dat) to CSV.
    Mmpbsa(MmpbsaArgs),
    /// Combine one column of one table across several analysis directories.
    Collect(CollectArgs),
    /// Check that the GROMACS binary can be found.
    Check(CheckArgs),
}

/// Arguments for the `setup` subcommand.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// System name substituted into the generated control files.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Directory containing the simulation inputs to stage.
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Run directory to create and populate.
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S setup.index=complex.ndx
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Directory containing the production run outputs (tpr, xtc, edr).
    #[arg(short, long, required = true, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory receiving the converted tables.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GROMACS executable name or path.
    #[arg(long, value_name = "BIN")]
    pub gmx: Option<PathBuf>,

    /// Run only these analyses (rmsd, rmsf, rg, sasa, hbond, energy).
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub only: Vec<String>,

    /// Do not write the serialized table collection.
    #[arg(long)]
    pub no_blob: bool,

    /// Do not write the loader script.
    #[arg(long)]
    pub no_loader: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S analysis.time-unit=ps
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `tables` subcommand.
#[derive(Args, Debug)]
pub struct TablesArgs {
    /// Directory to scan for CSV tables.
    #[arg(required = true, value_name = "DIR")]
    pub dir: PathBuf,

    /// Serialize the loaded collection to this path.
    #[arg(short, long, value_name = "PATH")]
    pub blob: Option<PathBuf>,
}

/// Arguments for the `mmpbsa` subcommand.
#[derive(Args, Debug)]
pub struct MmpbsaArgs {
    /// gmx_MMPBSA results file; the CSV is written next to it.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Arguments for the `collect` subcommand.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Analysis directories, one per run.
    #[arg(required = true, value_name = "RUN_DIR", num_args(1..))]
    pub runs: Vec<PathBuf>,

    /// Table to extract from each run (e.g. rmsd, rg, sasa, hbond).
    #[arg(short, long, required = true, value_name = "KEY")]
    pub key: String,

    /// Zero-based column of the table to extract.
    #[arg(long, value_name = "INT", default_value_t = gmxflow::workflows::collect::DEFAULT_VALUE_COLUMN)]
    pub column: usize,

    /// Output CSV path.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Name of the serialized collection inside each run directory.
    #[arg(long, value_name = "FILE", default_value = gmxflow::core::tables::DEFAULT_BLOB_NAME)]
    pub blob_name: String,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// GROMACS executable name or path.
    #[arg(long, value_name = "BIN", default_value = "gmx")]
    pub gmx: PathBuf,
}
