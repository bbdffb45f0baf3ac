//! # gmxflow Core Library
//!
//! Staging, analysis orchestration and tabular post-processing for GROMACS
//! and gmx_MMPBSA runs. All numerical work is done by the external tools;
//! this library prepares their inputs, drives them and reshapes their text
//! output.
//!
//! ## Layers
//!
//! - **[`core`]: Stateless pieces.** Whitespace-to-CSV conversion, the table
//!   collection loader and its pickle blob, the gmx_MMPBSA report parser and
//!   template rendering.
//!
//! - **[`engine`]: Plumbing.** Configuration builders, typed analysis steps
//!   with named prompt answers, and the [`ToolRunner`](engine::toolchain::ToolRunner)
//!   seam over external processes.
//!
//! - **[`workflows`]: The Public API.** `setup`, `analyze` and `collect`.

pub mod core;
pub mod engine;
pub mod workflows;
