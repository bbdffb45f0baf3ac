use crate::engine::config::{ConfigError, SetupConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOutcome {
    pub target_dir: PathBuf,
    pub copied_files: Vec<PathBuf>,
    pub copied_tree: PathBuf,
    pub parameter_file: PathBuf,
    pub run_script: PathBuf,
}

/// Stages a run directory for free-energy estimation.
///
/// Every required input is checked and both templates are rendered before
/// anything is written, so a missing file leaves no control files behind.
#[instrument(skip_all, name = "setup_workflow", fields(name = %config.name))]
pub fn run(config: &SetupConfig, reporter: &ProgressReporter) -> Result<SetupOutcome, EngineError> {
    // === Phase 1: Validate prerequisites ===
    reporter.report(Progress::PhaseStart { name: "Validation" });
    if same_directory(&config.source_dir, &config.target_dir) {
        return Err(ConfigError::TargetIsSource(config.target_dir.clone()).into());
    }
    let files = config.inputs.files();
    for file in &files {
        let path = config.source_dir.join(file);
        if !path.is_file() {
            return Err(EngineError::MissingInput { kind: "file", path });
        }
    }
    let tree_source = config.source_dir.join(&config.inputs.topology_dir);
    if !tree_source.is_dir() {
        return Err(EngineError::MissingInput {
            kind: "directory",
            path: tree_source,
        });
    }

    let vars = template_vars(config);
    let parameters = config.parameter_template.render(&vars)?;
    let run_script = config.run_script_template.render(&vars)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Copy inputs ===
    reporter.report(Progress::PhaseStart { name: "Staging" });
    fs::create_dir_all(&config.target_dir).map_err(|e| EngineError::io(&config.target_dir, e))?;
    info!("Staging {} file(s) into {:?}", files.len(), config.target_dir);

    reporter.report(Progress::TaskStart {
        total_steps: files.len() as u64 + 1,
    });
    let mut copied_files = Vec::with_capacity(files.len());
    for file in &files {
        let src = config.source_dir.join(file);
        let dst = config.target_dir.join(file);
        reporter.step_start(*file);
        fs::copy(&src, &dst).map_err(|e| EngineError::io(&src, e))?;
        debug!("Copied {:?} -> {:?}", src, dst);
        copied_files.push(dst);
        reporter.step_finish(*file, true);
    }

    let copied_tree = config.target_dir.join(&config.inputs.topology_dir);
    reporter.step_start(config.inputs.topology_dir.as_str());
    copy_tree(&tree_source, &copied_tree)?;
    reporter.step_finish(config.inputs.topology_dir.as_str(), true);
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Generate control files ===
    reporter.report(Progress::PhaseStart { name: "Control files" });
    let parameter_file = config.target_dir.join(config.parameter_template.name());
    fs::write(&parameter_file, parameters).map_err(|e| EngineError::io(&parameter_file, e))?;

    let run_script_path = config.target_dir.join(config.run_script_template.name());
    fs::write(&run_script_path, run_script).map_err(|e| EngineError::io(&run_script_path, e))?;
    make_executable(&run_script_path)?;
    reporter.report(Progress::Message(format!(
        "Wrote {} and {}",
        parameter_file.display(),
        run_script_path.display()
    )));
    reporter.report(Progress::PhaseFinish);

    info!("Run directory {:?} is ready.", config.target_dir);
    Ok(SetupOutcome {
        target_dir: config.target_dir.clone(),
        copied_files,
        copied_tree,
        parameter_file,
        run_script: run_script_path,
    })
}

fn template_vars(config: &SetupConfig) -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("name", config.name.clone()),
        ("parameter_file", config.parameter_template.name().to_string()),
        ("structure", config.inputs.structure.clone()),
        ("trajectory", config.inputs.trajectory.clone()),
        ("topology", config.inputs.topology.clone()),
        ("index", config.inputs.index.clone()),
        ("topology_dir", config.inputs.topology_dir.clone()),
    ])
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(dst).map_err(|e| EngineError::io(dst, e))?;
    for entry in fs::read_dir(src).map_err(|e| EngineError::io(src, e))? {
        let entry = entry.map_err(|e| EngineError::io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| EngineError::io(&from, e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), EngineError> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)
        .map_err(|e| EngineError::io(path, e))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions).map_err(|e| EngineError::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), EngineError> {
    Ok(())
}
