use super::analysis::{AnalysisKind, AnalysisSpec, TrajectoryInputs};
use crate::core::tables::DEFAULT_BLOB_NAME;
use crate::core::template::{MMGBSA_PARAMETERS, MMGBSA_RUN_SCRIPT, Template};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

pub const PARAMETER_FILE_NAME: &str = "mmgbsa.in";
pub const RUN_SCRIPT_NAME: &str = "run_mmgbsa.sh";
pub const LOADER_FILE_NAME: &str = "load_ana.py";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Parameter '{0}' must not be empty")]
    EmptyParameter(&'static str),
    #[error("Analysis '{0}' is listed more than once")]
    DuplicateAnalysis(AnalysisKind),
    #[error("Target directory {0:?} is the source directory")]
    TargetIsSource(PathBuf),
}

/// Names of the simulation inputs copied into a run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedInputs {
    pub structure: String,
    pub trajectory: String,
    pub topology: String,
    pub index: String,
    pub extra_files: Vec<String>,
    pub topology_dir: String,
}

impl Default for StagedInputs {
    fn default() -> Self {
        Self {
            structure: "md.tpr".to_string(),
            trajectory: "md.xtc".to_string(),
            topology: "topol.top".to_string(),
            index: "index.ndx".to_string(),
            extra_files: Vec::new(),
            topology_dir: "toppar".to_string(),
        }
    }
}

impl StagedInputs {
    /// Every file that must exist in the source directory, in copy order.
    pub fn files(&self) -> Vec<&str> {
        let mut files = vec![
            self.structure.as_str(),
            self.trajectory.as_str(),
            self.topology.as_str(),
            self.index.as_str(),
        ];
        files.extend(self.extra_files.iter().map(String::as_str));
        files
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupConfig {
    pub name: String,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub inputs: StagedInputs,
    pub parameter_template: Template,
    pub run_script_template: Template,
}

#[derive(Default)]
pub struct SetupConfigBuilder {
    name: Option<String>,
    source_dir: Option<PathBuf>,
    target_dir: Option<PathBuf>,
    inputs: Option<StagedInputs>,
    parameter_template: Option<String>,
    run_script_template: Option<String>,
}

impl SetupConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn source_dir(mut self, path: PathBuf) -> Self {
        self.source_dir = Some(path);
        self
    }
    pub fn target_dir(mut self, path: PathBuf) -> Self {
        self.target_dir = Some(path);
        self
    }
    pub fn inputs(mut self, inputs: StagedInputs) -> Self {
        self.inputs = Some(inputs);
        self
    }
    pub fn parameter_template(mut self, text: String) -> Self {
        self.parameter_template = Some(text);
        self
    }
    pub fn run_script_template(mut self, text: String) -> Self {
        self.run_script_template = Some(text);
        self
    }

    pub fn build(self) -> Result<SetupConfig, ConfigError> {
        let name = self.name.ok_or(ConfigError::MissingParameter("name"))?;
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyParameter("name"));
        }
        Ok(SetupConfig {
            name,
            source_dir: self
                .source_dir
                .ok_or(ConfigError::MissingParameter("source_dir"))?,
            target_dir: self
                .target_dir
                .ok_or(ConfigError::MissingParameter("target_dir"))?,
            inputs: self.inputs.unwrap_or_default(),
            parameter_template: Template::new(
                PARAMETER_FILE_NAME,
                self.parameter_template
                    .unwrap_or_else(|| MMGBSA_PARAMETERS.to_string()),
            ),
            run_script_template: Template::new(
                RUN_SCRIPT_NAME,
                self.run_script_template
                    .unwrap_or_else(|| MMGBSA_RUN_SCRIPT.to_string()),
            ),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub name: String,
    pub gmx: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub inputs: TrajectoryInputs,
    pub time_unit: String,
    pub analyses: Vec<AnalysisSpec>,
    pub blob_name: Option<String>,
    pub emit_loader: bool,
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    name: Option<String>,
    gmx: Option<PathBuf>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    structure: Option<String>,
    trajectory: Option<String>,
    energy: Option<String>,
    index: Option<String>,
    time_unit: Option<String>,
    analyses: Option<Vec<AnalysisSpec>>,
    blob_name: Option<Option<String>>,
    emit_loader: Option<bool>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn gmx(mut self, path: PathBuf) -> Self {
        self.gmx = Some(path);
        self
    }
    pub fn input_dir(mut self, path: PathBuf) -> Self {
        self.input_dir = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn structure(mut self, file: impl Into<String>) -> Self {
        self.structure = Some(file.into());
        self
    }
    pub fn trajectory(mut self, file: impl Into<String>) -> Self {
        self.trajectory = Some(file.into());
        self
    }
    pub fn energy(mut self, file: impl Into<String>) -> Self {
        self.energy = Some(file.into());
        self
    }
    pub fn index(mut self, file: impl Into<String>) -> Self {
        self.index = Some(file.into());
        self
    }
    pub fn time_unit(mut self, unit: impl Into<String>) -> Self {
        self.time_unit = Some(unit.into());
        self
    }
    pub fn analyses(mut self, analyses: Vec<AnalysisSpec>) -> Self {
        self.analyses = Some(analyses);
        self
    }
    /// `None` disables writing the serialized table collection.
    pub fn blob_name(mut self, name: Option<String>) -> Self {
        self.blob_name = Some(name);
        self
    }
    pub fn emit_loader(mut self, emit: bool) -> Self {
        self.emit_loader = Some(emit);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let input_dir = self
            .input_dir
            .ok_or(ConfigError::MissingParameter("input_dir"))?;
        let output_dir = self
            .output_dir
            .ok_or(ConfigError::MissingParameter("output_dir"))?;

        let analyses = self.analyses.unwrap_or_else(|| {
            AnalysisKind::ALL
                .into_iter()
                .map(AnalysisSpec::default_for)
                .collect()
        });
        let mut seen = HashSet::new();
        for spec in &analyses {
            if !seen.insert(spec.kind()) {
                return Err(ConfigError::DuplicateAnalysis(spec.kind()));
            }
        }

        let inputs = TrajectoryInputs {
            structure: input_dir.join(self.structure.as_deref().unwrap_or("md.tpr")),
            trajectory: input_dir.join(self.trajectory.as_deref().unwrap_or("md.xtc")),
            energy: input_dir.join(self.energy.as_deref().unwrap_or("md.edr")),
            index: self.index.map(|i| input_dir.join(i)),
        };

        let name = self.name.unwrap_or_else(|| {
            input_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "system".to_string())
        });

        Ok(AnalysisConfig {
            name,
            gmx: self.gmx.unwrap_or_else(|| PathBuf::from("gmx")),
            input_dir,
            output_dir,
            inputs,
            time_unit: self.time_unit.unwrap_or_else(|| "ns".to_string()),
            analyses,
            blob_name: self
                .blob_name
                .unwrap_or_else(|| Some(DEFAULT_BLOB_NAME.to_string())),
            emit_loader: self.emit_loader.unwrap_or(true),
        })
    }
}
