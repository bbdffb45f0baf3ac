//! Line-oriented conversion of tool output into delimited rows, and the
//! in-memory representation of those rows.

pub mod convert;
pub mod record;

pub use convert::{ConversionStats, ConvertError, Converter};
pub use record::{Field, TableError, TabularRecord};
