//! Concrete syntax tree for the Stp language.
//!
//! The tree is built bottom-up by the parser and is immutable afterwards.
//! Besides the typed node structs in [`ast`], every node exposes a kind tag,
//! its ordered children, and a named-field table through [`query`] — the
//! stable vocabulary downstream tools (formatters, interpreters, editors)
//! query against. [`source`] renders a tree back to parseable text and
//! [`visit`] provides a visitor for traversals.

pub mod ast;
pub mod query;
pub mod source;
pub mod visit;
