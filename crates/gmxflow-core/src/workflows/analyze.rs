use crate::core::tables::{self, LoadReport, TABLE_EXTENSION};
use crate::core::tabular::Converter;
use crate::core::template::{TABLE_LOADER, Template};
use crate::engine::analysis::{AnalysisKind, AnalysisSpec};
use crate::engine::config::{AnalysisConfig, LOADER_FILE_NAME};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::toolchain::{Invocation, ToolRunner, locate_executable};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Converted { table: PathBuf, rows: usize },
    /// The tool exited non-zero or could not be started; nothing to convert.
    ToolFailed { code: Option<i32>, message: String },
    /// The tool reported success but its output file is absent.
    MissingOutput,
    ConversionFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub kind: AnalysisKind,
    pub status: StepStatus,
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub steps: Vec<StepOutcome>,
    pub tables: LoadReport,
    pub blob: Option<PathBuf>,
    pub loader: Option<PathBuf>,
}

impl AnalysisOutcome {
    pub fn converted(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Converted { .. }))
            .count()
    }
}

/// Runs every configured analysis in order, then collects the results.
///
/// A missing `gmx` executable or input file is fatal and is detected before
/// the output directory is created. A failing step is logged and
/// the remaining steps still run.
#[instrument(skip_all, name = "analysis_workflow", fields(name = %config.name))]
pub fn run(
    config: &AnalysisConfig,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<AnalysisOutcome, EngineError> {
    // === Phase 0: Prerequisites ===
    let gmx = locate_executable(&config.gmx).ok_or_else(|| EngineError::ToolNotFound {
        tool: config.gmx.display().to_string(),
    })?;
    info!("Using GROMACS binary at {:?}", gmx);
    check_inputs(config)?;

    fs::create_dir_all(&config.output_dir).map_err(|e| EngineError::io(&config.output_dir, e))?;

    // === Phase 1: Run the analyses ===
    reporter.report(Progress::PhaseStart { name: "Analyses" });
    reporter.report(Progress::TaskStart {
        total_steps: config.analyses.len() as u64,
    });

    let converter = Converter::default();
    let mut steps = Vec::with_capacity(config.analyses.len());
    for spec in &config.analyses {
        let kind = spec.kind();
        reporter.step_start(kind.name());
        let status = run_step(config, &gmx, spec, runner, &converter);
        let converted = matches!(status, StepStatus::Converted { .. });
        reporter.step_finish(kind.name(), converted);
        steps.push(StepOutcome { kind, status });
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Collect tables ===
    reporter.report(Progress::PhaseStart { name: "Collecting tables" });
    let tables = tables::load_dir(&config.output_dir);

    let blob = match &config.blob_name {
        Some(blob_name) => {
            let path = config.output_dir.join(blob_name);
            tables
                .collection
                .write_blob(&path)
                .map_err(|source| EngineError::Table {
                    path: path.clone(),
                    source,
                })?;
            Some(path)
        }
        None => None,
    };

    let loader = if config.emit_loader {
        let path = config.output_dir.join(LOADER_FILE_NAME);
        let vars = BTreeMap::from([
            ("name", config.name.clone()),
            ("extension", TABLE_EXTENSION.to_string()),
            (
                "blob",
                config
                    .blob_name
                    .clone()
                    .unwrap_or_else(|| tables::DEFAULT_BLOB_NAME.to_string()),
            ),
        ]);
        let text = Template::new(LOADER_FILE_NAME, TABLE_LOADER).render(&vars)?;
        fs::write(&path, text).map_err(|e| EngineError::io(&path, e))?;
        Some(path)
    } else {
        None
    };
    reporter.report(Progress::PhaseFinish);

    let outcome = AnalysisOutcome {
        steps,
        tables,
        blob,
        loader,
    };
    info!(
        "Analysis finished: {}/{} step(s) converted, {} table(s) loaded.",
        outcome.converted(),
        outcome.steps.len(),
        outcome.tables.collection.len()
    );
    Ok(outcome)
}

/// Fails on the first input file the selected analyses need but cannot find.
fn check_inputs(config: &AnalysisConfig) -> Result<(), EngineError> {
    let inputs = &config.inputs;
    let needs_energy = config
        .analyses
        .iter()
        .any(|spec| spec.kind() == AnalysisKind::Energy);
    let needs_trajectory = config
        .analyses
        .iter()
        .any(|spec| spec.kind() != AnalysisKind::Energy);

    let mut required: Vec<(&'static str, &std::path::Path)> = Vec::new();
    if needs_trajectory {
        required.push(("structure", inputs.structure.as_path()));
        required.push(("trajectory", inputs.trajectory.as_path()));
        if let Some(index) = &inputs.index {
            required.push(("index", index.as_path()));
        }
    }
    if needs_energy {
        required.push(("energy", inputs.energy.as_path()));
    }

    match required.into_iter().find(|(_, path)| !path.is_file()) {
        Some((kind, path)) => Err(EngineError::MissingInput {
            kind,
            path: path.to_path_buf(),
        }),
        None => Ok(()),
    }
}

/// Deletes what an earlier run left for this step so a failure now cannot
/// be mistaken for a result.
fn remove_stale_output(path: &std::path::Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed stale {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove stale {:?}: {}", path, e),
    }
}

fn run_step(
    config: &AnalysisConfig,
    gmx: &std::path::Path,
    spec: &AnalysisSpec,
    runner: &dyn ToolRunner,
    converter: &Converter,
) -> StepStatus {
    let kind = spec.kind();
    let xvg = config.output_dir.join(kind.xvg_file_name());
    let table = xvg.with_extension(TABLE_EXTENSION);
    remove_stale_output(&xvg);
    remove_stale_output(&table);

    let invocation = Invocation {
        program: gmx.to_path_buf(),
        args: spec.arguments(&config.inputs, &xvg, &config.time_unit),
        stdin: spec.scripted_input(),
        working_dir: config.output_dir.clone(),
    };
    info!("Running analysis '{}' ({})", kind, invocation.stdin);

    let failure = match runner.run(&invocation) {
        Ok(status) if status.success() => None,
        Ok(status) => {
            warn!(
                "'{}' exited with status {:?}: {}",
                invocation.command_line(),
                status.code,
                status.stderr_tail
            );
            Some(StepStatus::ToolFailed {
                code: status.code,
                message: status.stderr_tail,
            })
        }
        Err(e) => {
            warn!("Analysis '{}' could not run: {}", kind, e);
            Some(StepStatus::ToolFailed {
                code: None,
                message: e.to_string(),
            })
        }
    };

    if !xvg.is_file() {
        if failure.is_none() {
            warn!("Analysis '{}' produced no {:?}; skipping conversion.", kind, xvg);
        }
        return failure.unwrap_or(StepStatus::MissingOutput);
    }

    match converter.convert_file(&xvg, &table) {
        Ok(stats) => {
            if let Err(e) = fs::remove_file(&xvg) {
                warn!("Could not remove intermediate {:?}: {}", xvg, e);
            }
            StepStatus::Converted {
                table,
                rows: stats.lines_written,
            }
        }
        Err(e) => {
            warn!("Converting {:?} failed: {}", xvg, e);
            StepStatus::ConversionFailed {
                message: e.to_string(),
            }
        }
    }
}
