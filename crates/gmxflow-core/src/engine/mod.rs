//! # Engine Module
//!
//! Configuration, typed tool invocations and process plumbing shared by the
//! workflows.
//!
//! - **Configuration** ([`config`]) - Builders for the setup and analysis runs
//! - **Analyses** ([`analysis`]) - The six GROMACS analyses and their arguments
//! - **Selections** ([`selection`]) - Named answers to interactive tool prompts
//! - **Toolchain** ([`toolchain`]) - Locating and running external binaries
//! - **Progress Monitoring** ([`progress`]) - Progress reporting callbacks
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod analysis;
pub mod config;
pub mod error;
pub mod progress;
pub mod selection;
pub mod toolchain;
