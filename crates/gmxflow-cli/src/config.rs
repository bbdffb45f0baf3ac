pub mod defaults;

use crate::cli::{AnalyzeArgs, SetupArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use gmxflow::engine::analysis::{AnalysisKind, AnalysisSpec};
use gmxflow::engine::config as core_config;
use gmxflow::engine::selection::GroupSelection;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSetupConfig {
    name: Option<String>,
    source: Option<PathBuf>,
    target: Option<PathBuf>,
    structure: Option<String>,
    trajectory: Option<String>,
    topology: Option<String>,
    index: Option<String>,
    extra_files: Option<Vec<String>>,
    topology_dir: Option<String>,
    parameter_template: Option<PathBuf>,
    run_script_template: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialRmsdConfig {
    fit_group: Option<GroupSelection>,
    output_group: Option<GroupSelection>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialRmsfConfig {
    group: Option<GroupSelection>,
    per_residue: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialGroupConfig {
    group: Option<GroupSelection>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSasaConfig {
    surface_group: Option<GroupSelection>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialHbondConfig {
    donor_group: Option<GroupSelection>,
    acceptor_group: Option<GroupSelection>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialEnergyConfig {
    terms: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialAnalysisConfig {
    name: Option<String>,
    gmx: Option<PathBuf>,
    structure: Option<String>,
    trajectory: Option<String>,
    energy: Option<String>,
    index: Option<String>,
    time_unit: Option<String>,
    enabled: Option<Vec<String>>,
    blob_name: Option<String>,
    write_blob: Option<bool>,
    emit_loader: Option<bool>,
    rmsd: Option<PartialRmsdConfig>,
    rmsf: Option<PartialRmsfConfig>,
    rg: Option<PartialGroupConfig>,
    sasa: Option<PartialSasaConfig>,
    hbond: Option<PartialHbondConfig>,
    #[serde(rename = "energy-terms")]
    energy_terms: Option<PartialEnergyConfig>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    setup: Option<PartialSetupConfig>,
    analysis: Option<PartialAnalysisConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file when given, otherwise starts from an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_setup(mut self, args: &SetupArgs) -> Result<core_config::SetupConfig> {
        self.apply_set_values(&args.set_values)?;
        let file = self.setup.take().unwrap_or_default();

        let name = args.name.clone().or(file.name).ok_or_else(|| {
            CliError::Config(
                "A system name is required via --name or `setup.name`.".to_string(),
            )
        })?;
        let source = args.source.clone().or(file.source).ok_or_else(|| {
            CliError::Config("A source directory is required via --source or `setup.source`.".to_string())
        })?;
        let target = args.target.clone().or(file.target).ok_or_else(|| {
            CliError::Config("A target directory is required via --target or `setup.target`.".to_string())
        })?;

        let fallback = core_config::StagedInputs::default();
        let inputs = core_config::StagedInputs {
            structure: file.structure.unwrap_or(fallback.structure),
            trajectory: file.trajectory.unwrap_or(fallback.trajectory),
            topology: file.topology.unwrap_or(fallback.topology),
            index: file.index.unwrap_or(fallback.index),
            extra_files: file.extra_files.unwrap_or(fallback.extra_files),
            topology_dir: file.topology_dir.unwrap_or(fallback.topology_dir),
        };

        let mut builder = core_config::SetupConfigBuilder::new()
            .name(name)
            .source_dir(source)
            .target_dir(target)
            .inputs(inputs);
        if let Some(path) = file.parameter_template {
            builder = builder.parameter_template(read_template(&path)?);
        }
        if let Some(path) = file.run_script_template {
            builder = builder.run_script_template(read_template(&path)?);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn merge_analysis(mut self, args: &AnalyzeArgs) -> Result<core_config::AnalysisConfig> {
        self.apply_set_values(&args.set_values)?;
        let file = self.analysis.take().unwrap_or_default();
        let defaults = DefaultsConfig::default();

        let kinds = Self::resolve_kinds(&args.only, file.enabled.as_deref(), &defaults)?;
        let analyses = kinds
            .into_iter()
            .map(|kind| Self::merge_spec(kind, &file))
            .collect();

        let blob_name = if args.no_blob || !file.write_blob.unwrap_or(defaults.write_blob) {
            None
        } else {
            Some(file.blob_name.clone().unwrap_or(defaults.blob_name))
        };

        let mut builder = core_config::AnalysisConfigBuilder::new()
            .gmx(
                args.gmx
                    .clone()
                    .or(file.gmx)
                    .unwrap_or_else(|| PathBuf::from(defaults.gmx)),
            )
            .input_dir(args.input.clone())
            .output_dir(args.output.clone())
            .time_unit(file.time_unit.unwrap_or(defaults.time_unit))
            .analyses(analyses)
            .blob_name(blob_name)
            .emit_loader(!args.no_loader && file.emit_loader.unwrap_or(defaults.emit_loader));

        if let Some(name) = file.name {
            builder = builder.name(name);
        }
        if let Some(structure) = file.structure {
            builder = builder.structure(structure);
        }
        if let Some(trajectory) = file.trajectory {
            builder = builder.trajectory(trajectory);
        }
        if let Some(energy) = file.energy {
            builder = builder.energy(energy);
        }
        if let Some(index) = file.index {
            builder = builder.index(index);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn resolve_kinds(
        cli_only: &[String],
        file_enabled: Option<&[String]>,
        defaults: &DefaultsConfig,
    ) -> Result<Vec<AnalysisKind>> {
        let names: &[String] = if !cli_only.is_empty() {
            cli_only
        } else if let Some(enabled) = file_enabled {
            enabled
        } else {
            return Ok(defaults.analyses.clone());
        };

        names
            .iter()
            .map(|name| {
                name.parse::<AnalysisKind>()
                    .map_err(|e| CliError::Argument(e.to_string()))
            })
            .collect()
    }

    fn merge_spec(kind: AnalysisKind, file: &PartialAnalysisConfig) -> AnalysisSpec {
        let spec = AnalysisSpec::default_for(kind);
        match spec {
            AnalysisSpec::Rmsd { fit, output } => {
                let p = file.rmsd.as_ref();
                AnalysisSpec::Rmsd {
                    fit: p.and_then(|p| p.fit_group.clone()).unwrap_or(fit),
                    output: p.and_then(|p| p.output_group.clone()).unwrap_or(output),
                }
            }
            AnalysisSpec::Rmsf { group, per_residue } => {
                let p = file.rmsf.as_ref();
                AnalysisSpec::Rmsf {
                    group: p.and_then(|p| p.group.clone()).unwrap_or(group),
                    per_residue: p.and_then(|p| p.per_residue).unwrap_or(per_residue),
                }
            }
            AnalysisSpec::Gyration { group } => AnalysisSpec::Gyration {
                group: file
                    .rg
                    .as_ref()
                    .and_then(|p| p.group.clone())
                    .unwrap_or(group),
            },
            AnalysisSpec::Sasa { surface } => AnalysisSpec::Sasa {
                surface: file
                    .sasa
                    .as_ref()
                    .and_then(|p| p.surface_group.clone())
                    .unwrap_or(surface),
            },
            AnalysisSpec::Hbond { donor, acceptor } => {
                let p = file.hbond.as_ref();
                AnalysisSpec::Hbond {
                    donor: p.and_then(|p| p.donor_group.clone()).unwrap_or(donor),
                    acceptor: p.and_then(|p| p.acceptor_group.clone()).unwrap_or(acceptor),
                }
            }
            AnalysisSpec::Energy { terms } => AnalysisSpec::Energy {
                terms: file
                    .energy_terms
                    .as_ref()
                    .and_then(|p| p.terms.clone())
                    .unwrap_or(terms),
            },
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let value = value_str.to_string();
            let group = || -> GroupSelection {
                value_str
                    .parse()
                    .unwrap_or_else(|never| match never {})
            };
            let parse_bool = || -> Result<bool> {
                value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                })
            };

            match key {
                "setup.name" => self.setup.get_or_insert_with(Default::default).name = Some(value),
                "setup.structure" => self.setup.get_or_insert_with(Default::default).structure = Some(value),
                "setup.trajectory" => self.setup.get_or_insert_with(Default::default).trajectory = Some(value),
                "setup.topology" => self.setup.get_or_insert_with(Default::default).topology = Some(value),
                "setup.index" => self.setup.get_or_insert_with(Default::default).index = Some(value),
                "setup.topology-dir" => {
                    self.setup.get_or_insert_with(Default::default).topology_dir = Some(value)
                }
                "analysis.name" => self.analysis.get_or_insert_with(Default::default).name = Some(value),
                "analysis.gmx" => {
                    self.analysis.get_or_insert_with(Default::default).gmx = Some(PathBuf::from(value))
                }
                "analysis.structure" => {
                    self.analysis.get_or_insert_with(Default::default).structure = Some(value)
                }
                "analysis.trajectory" => {
                    self.analysis.get_or_insert_with(Default::default).trajectory = Some(value)
                }
                "analysis.energy" => self.analysis.get_or_insert_with(Default::default).energy = Some(value),
                "analysis.index" => self.analysis.get_or_insert_with(Default::default).index = Some(value),
                "analysis.time-unit" => {
                    self.analysis.get_or_insert_with(Default::default).time_unit = Some(value)
                }
                "analysis.blob-name" => {
                    self.analysis.get_or_insert_with(Default::default).blob_name = Some(value)
                }
                "analysis.write-blob" => {
                    self.analysis.get_or_insert_with(Default::default).write_blob = Some(parse_bool()?)
                }
                "analysis.emit-loader" => {
                    self.analysis.get_or_insert_with(Default::default).emit_loader = Some(parse_bool()?)
                }
                "analysis.rmsd.fit-group" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .rmsd
                        .get_or_insert_with(Default::default)
                        .fit_group = Some(group())
                }
                "analysis.rmsd.output-group" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .rmsd
                        .get_or_insert_with(Default::default)
                        .output_group = Some(group())
                }
                "analysis.rmsf.group" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .rmsf
                        .get_or_insert_with(Default::default)
                        .group = Some(group())
                }
                "analysis.rg.group" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .rg
                        .get_or_insert_with(Default::default)
                        .group = Some(group())
                }
                "analysis.sasa.surface-group" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .sasa
                        .get_or_insert_with(Default::default)
                        .surface_group = Some(group())
                }
                "analysis.hbond.donor-group" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .hbond
                        .get_or_insert_with(Default::default)
                        .donor_group = Some(group())
                }
                "analysis.hbond.acceptor-group" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .hbond
                        .get_or_insert_with(Default::default)
                        .acceptor_group = Some(group())
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn read_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
