//! Diff module
//!
//! Changeset/hunk model and unified diff parsing.

pub mod model;
pub mod parser;

pub use model::*;
pub use parser::{DiffParser, ParserConfig};
