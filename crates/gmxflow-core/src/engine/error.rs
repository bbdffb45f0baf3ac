use crate::core::mmpbsa::MmpbsaError;
use crate::core::tabular::{ConvertError, TableError};
use crate::core::template::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Required tool '{tool}' was not found on PATH")]
    ToolNotFound { tool: String },

    #[error("Required input {kind} is missing: {path:?}")]
    MissingInput { kind: &'static str, path: PathBuf },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Conversion of {path:?} failed: {source}")]
    Conversion {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },

    #[error("Table error for {path:?}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    #[error("Table '{key}' not found in {path:?}")]
    MissingTable { key: String, path: PathBuf },

    #[error(transparent)]
    Mmpbsa(#[from] MmpbsaError),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
