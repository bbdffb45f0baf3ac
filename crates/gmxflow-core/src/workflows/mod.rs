//! # Workflows Module
//!
//! Top-level entry points. Each workflow validates its prerequisites,
//! performs its steps in order and reports progress through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! - **Setup** ([`setup`]) - Stage inputs and generate the free-energy control files
//! - **Analysis** ([`analyze`]) - Run the six trajectory analyses and collect their tables
//! - **Collection** ([`collect`]) - Combine one table column across several runs

pub mod analyze;
pub mod collect;
pub mod setup;
