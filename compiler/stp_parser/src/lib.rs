//! Parser for the Stp matrix scripting language.
//!
//! Turns source text into the concrete syntax tree defined by `stp_ast`,
//! either failing fast on the first error or recovering at statement
//! boundaries and reporting every problem found.

pub mod parser;

pub use parser::{
    parse_source, parse_source_recovering, reparse, ParseOutcome, SourceEdit, StpError,
};
