//! Integration and system tests for the Stp parsing engine.
//!
//! The actual tests live in `tests/`; this library only hosts shared
//! helpers.

use stp_ast::ast::ProgramNode;

/// Parses `source`, panicking with the error message on failure.
pub fn parse_ok(source: &str) -> ProgramNode {
    match stp_parser::parse_source(source) {
        Ok(program) => program,
        Err(err) => panic!("source should parse: {err}\n---\n{source}"),
    }
}
