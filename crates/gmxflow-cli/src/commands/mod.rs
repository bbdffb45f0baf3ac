pub mod analyze;
pub mod check;
pub mod collect;
pub mod mmpbsa;
pub mod setup;
pub mod tables;
