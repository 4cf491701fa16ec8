//! Shared helpers for the parser's unit tests.

use stp_ast::ast::{ExpressionNode, StatementNode};
use stp_lexer::Token;

use crate::parser::{expressions, statements, TokenSlice};

/// Lexes `source`, panicking on lexical errors.
pub fn tokenize(source: &str) -> Vec<Token> {
    stp_lexer::tokenize(source).expect("test source should lex")
}

/// Parses `source` as one expression, asserting every token is consumed.
pub fn expr(source: &str) -> ExpressionNode {
    let tokens = tokenize(source);
    let (rest, expr) =
        expressions::parse_expression(TokenSlice::new(&tokens)).expect("expression should parse");
    assert!(
        rest.is_empty(),
        "expression left tokens behind: {:?}",
        rest.first()
    );
    expr
}

/// Parses `source` as one statement, asserting every token is consumed.
pub fn stmt(source: &str) -> StatementNode {
    let tokens = tokenize(source);
    let (rest, stmt) =
        statements::parse_statement(TokenSlice::new(&tokens)).expect("statement should parse");
    let rest = rest.skip_separators();
    assert!(
        rest.is_empty(),
        "statement left tokens behind: {:?}",
        rest.first()
    );
    stmt
}
