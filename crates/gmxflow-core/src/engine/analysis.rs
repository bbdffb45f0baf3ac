use super::selection::{GroupSelection, ScriptedInput};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown analysis '{0}'. Expected one of: rmsd, rmsf, rg, sasa, hbond, energy")]
pub struct UnknownAnalysis(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisKind {
    Rmsd,
    Rmsf,
    Gyration,
    Sasa,
    Hbond,
    Energy,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 6] = [
        Self::Rmsd,
        Self::Rmsf,
        Self::Gyration,
        Self::Sasa,
        Self::Hbond,
        Self::Energy,
    ];

    /// Table name; also the stem of the intermediate and converted files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rmsd => "rmsd",
            Self::Rmsf => "rmsf",
            Self::Gyration => "rg",
            Self::Sasa => "sasa",
            Self::Hbond => "hbond",
            Self::Energy => "energy",
        }
    }

    /// GROMACS subcommand that performs the analysis.
    pub fn tool(self) -> &'static str {
        match self {
            Self::Rmsd => "rms",
            Self::Rmsf => "rmsf",
            Self::Gyration => "gyrate",
            Self::Sasa => "sasa",
            Self::Hbond => "hbond",
            Self::Energy => "energy",
        }
    }

    pub fn xvg_file_name(self) -> String {
        format!("{}.xvg", self.name())
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = UnknownAnalysis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAnalysis(s.to_string()))
    }
}

/// Simulation outputs the analyses read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectoryInputs {
    pub structure: PathBuf,
    pub trajectory: PathBuf,
    pub energy: PathBuf,
    pub index: Option<PathBuf>,
}

/// One analysis step with its prompt answers.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisSpec {
    Rmsd {
        fit: GroupSelection,
        output: GroupSelection,
    },
    Rmsf {
        group: GroupSelection,
        per_residue: bool,
    },
    Gyration {
        group: GroupSelection,
    },
    Sasa {
        surface: GroupSelection,
    },
    Hbond {
        donor: GroupSelection,
        acceptor: GroupSelection,
    },
    Energy {
        terms: Vec<String>,
    },
}

impl AnalysisSpec {
    pub fn default_for(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::Rmsd => Self::Rmsd {
                fit: GroupSelection::name("Backbone"),
                output: GroupSelection::name("Backbone"),
            },
            AnalysisKind::Rmsf => Self::Rmsf {
                group: GroupSelection::name("C-alpha"),
                per_residue: true,
            },
            AnalysisKind::Gyration => Self::Gyration {
                group: GroupSelection::name("Protein"),
            },
            AnalysisKind::Sasa => Self::Sasa {
                surface: GroupSelection::name("Protein"),
            },
            AnalysisKind::Hbond => Self::Hbond {
                donor: GroupSelection::name("Protein"),
                acceptor: GroupSelection::name("Protein"),
            },
            AnalysisKind::Energy => Self::Energy {
                terms: vec!["Potential".to_string()],
            },
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::Rmsd { .. } => AnalysisKind::Rmsd,
            Self::Rmsf { .. } => AnalysisKind::Rmsf,
            Self::Gyration { .. } => AnalysisKind::Gyration,
            Self::Sasa { .. } => AnalysisKind::Sasa,
            Self::Hbond { .. } => AnalysisKind::Hbond,
            Self::Energy { .. } => AnalysisKind::Energy,
        }
    }

    /// Arguments following the `gmx` binary, including the subcommand.
    pub fn arguments(&self, inputs: &TrajectoryInputs, output: &Path, time_unit: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-nobackup".into(), self.kind().tool().into()];
        let mut push = |flag: &str, value: &Path| {
            args.push(flag.into());
            args.push(value.as_os_str().to_owned());
        };

        match self {
            Self::Energy { .. } => {
                push("-f", &inputs.energy);
                push("-o", output);
            }
            _ => {
                push("-s", &inputs.structure);
                push("-f", &inputs.trajectory);
                if let Some(index) = &inputs.index {
                    push("-n", index);
                }
                let output_flag = if matches!(self, Self::Hbond { .. }) { "-num" } else { "-o" };
                push(output_flag, output);
            }
        }

        match self {
            Self::Rmsd { .. } | Self::Sasa { .. } | Self::Hbond { .. } => {
                args.push("-tu".into());
                args.push(time_unit.into());
            }
            Self::Rmsf { per_residue: true, .. } => args.push("-res".into()),
            _ => {}
        }

        args
    }

    pub fn scripted_input(&self) -> ScriptedInput {
        match self {
            Self::Rmsd { fit, output } => ScriptedInput::new().with("fit", fit).with("output", output),
            Self::Rmsf { group, .. } => ScriptedInput::new().with("group", group),
            Self::Gyration { group } => ScriptedInput::new().with("group", group),
            Self::Sasa { surface } => ScriptedInput::new().with("surface", surface),
            Self::Hbond { donor, acceptor } => {
                ScriptedInput::new().with("donor", donor).with("acceptor", acceptor)
            }
            Self::Energy { terms } => terms
                .iter()
                .fold(ScriptedInput::new(), |input, term| input.with("term", term))
                .with("end", ""),
        }
    }
}
