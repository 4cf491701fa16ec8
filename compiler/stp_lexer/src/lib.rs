//! Stp lexical analyzer module
//!
//! This module provides lexical analysis for the Stp matrix scripting
//! language, converting source code into a stream of tokens for the parser.
//! String literals are handled by a modal sub-lexer that also recognizes
//! escape sequences and `\{ ... \}` formatting snippets.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod lexer;
pub mod logos_token;
pub mod string_interner;
pub mod token;

// Re-export the main types for convenience
pub use lexer::{tokenize, LexError, Lexer};
pub use logos_token::LogosToken;
pub use string_interner::InternedString;
pub use token::{Location, Token, TokenType};
