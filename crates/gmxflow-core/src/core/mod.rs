//! Stateless building blocks: text conversion, table loading, report
//! parsing and template rendering. Nothing here spawns processes.

pub mod mmpbsa;
pub mod tables;
pub mod tabular;
pub mod template;
