//! Parser plumbing: the token-slice input type, error types, and the
//! top-level entry points.
//!
//! Parsing functions follow the `nom` convention of taking an input and
//! returning the remaining input alongside the parsed node, but the actual
//! token matching is hand-written; `nom` supplies the `IResult`/`Err`
//! plumbing and the error-kind vocabulary the diagnostics layer maps from.

use nom::IResult;

use stp_ast::ast::{ProgramNode, Span};
use stp_lexer::{tokenize, LexError, Token, TokenType};

pub mod diagnostics;
pub mod expressions;
pub mod statements;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

pub use diagnostics::{Diagnostic, Severity};
pub use expressions::parse_expression;
pub use statements::{parse_block, parse_statement};

/// Brackets, matrices, calls, blocks, and formatting snippets deeper than
/// this fail fast with a stack-limit error instead of overflowing the call
/// stack on adversarial input.
pub const MAX_NESTING_DEPTH: u16 = 128;

/// A cursor over the lexer's token output. Cheap to copy; parsing functions
/// thread it through and return the advanced remainder. The `depth` field
/// counts nested bracketing constructs for the stack-limit guard.
#[derive(Debug, Clone, Copy)]
pub struct TokenSlice<'a> {
    tokens: &'a [Token],
    depth: u16,
}

/// The result type of every parsing function.
pub type PResult<'a, O> = IResult<TokenSlice<'a>, O, ParserError<'a>>;

impl<'a> TokenSlice<'a> {
    /// Wraps a token slice with zero nesting depth.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, depth: 0 }
    }

    /// The current token, if any.
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.first()
    }

    /// The current token's type, if any.
    pub fn peek_type(&self) -> Option<&'a TokenType> {
        self.tokens.first().map(|t| &t.token_type)
    }

    /// The token `n` positions ahead.
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(n)
    }

    /// Alias for [`TokenSlice::peek`], used by the diagnostics layer.
    pub fn first(&self) -> Option<&'a Token> {
        self.tokens.first()
    }

    /// The remainder after the current token.
    pub fn advance(&self) -> Self {
        Self {
            tokens: &self.tokens[1.min(self.tokens.len())..],
            depth: self.depth,
        }
    }

    /// True when no tokens remain.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The number of remaining tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Enters a nested bracketing construct, failing once the depth limit
    /// is exceeded.
    pub fn deeper(self) -> Result<Self, nom::Err<ParserError<'a>>> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(nom::Err::Failure(ParserError {
                input: self,
                kind: ParserErrorKind::StackLimit,
            }));
        }
        Ok(Self {
            tokens: self.tokens,
            depth: self.depth + 1,
        })
    }

    /// Restores the nesting depth of `outer` after leaving a bracketing
    /// construct.
    pub fn at_depth_of(self, outer: &TokenSlice<'a>) -> Self {
        Self {
            tokens: self.tokens,
            depth: outer.depth,
        }
    }

    /// Skips statement-separating newline tokens.
    pub fn skip_newlines(mut self) -> Self {
        while matches!(self.peek_type(), Some(TokenType::Newline)) {
            self = self.advance();
        }
        self
    }

    /// Skips newline and semicolon tokens between statements.
    pub fn skip_separators(mut self) -> Self {
        while matches!(
            self.peek_type(),
            Some(TokenType::Newline) | Some(TokenType::Semicolon)
        ) {
            self = self.advance();
        }
        self
    }
}

/// What went wrong at a position in the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ParserErrorKind {
    /// A grammar alternative was required but not found.
    Expected(&'static str),
    /// An opening delimiter was never closed (or a closer never opened).
    UnbalancedDelimiter {
        /// The opening delimiter's spelling.
        open: &'static str,
        /// The expected closing delimiter's spelling.
        close: &'static str,
    },
    /// The nesting-depth guard tripped.
    StackLimit,
    /// A raw `nom` error kind from the generic plumbing.
    Nom(nom::error::ErrorKind),
}

/// A parse error anchored at the remaining input.
#[derive(Debug, Clone)]
pub struct ParserError<'a> {
    /// The input at the failure point; its first token locates the error.
    pub input: TokenSlice<'a>,
    /// What went wrong.
    pub kind: ParserErrorKind,
}

impl<'a> ParserError<'a> {
    pub(crate) fn expected(input: TokenSlice<'a>, what: &'static str) -> nom::Err<Self> {
        nom::Err::Error(ParserError {
            input,
            kind: ParserErrorKind::Expected(what),
        })
    }

    pub(crate) fn failure(input: TokenSlice<'a>, what: &'static str) -> nom::Err<Self> {
        nom::Err::Failure(ParserError {
            input,
            kind: ParserErrorKind::Expected(what),
        })
    }

    pub(crate) fn unbalanced(
        input: TokenSlice<'a>,
        open: &'static str,
        close: &'static str,
    ) -> nom::Err<Self> {
        nom::Err::Failure(ParserError {
            input,
            kind: ParserErrorKind::UnbalancedDelimiter { open, close },
        })
    }
}

impl<'a> nom::error::ParseError<TokenSlice<'a>> for ParserError<'a> {
    fn from_error_kind(input: TokenSlice<'a>, kind: nom::error::ErrorKind) -> Self {
        ParserError {
            input,
            kind: ParserErrorKind::Nom(kind),
        }
    }

    fn append(_input: TokenSlice<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

/// Returns a parser that consumes one token matching `pred`, or fails with
/// an "expected `what`" error.
pub fn take_token_if<'a, F>(
    pred: F,
    what: &'static str,
) -> impl Fn(TokenSlice<'a>) -> PResult<'a, &'a Token>
where
    F: Fn(&TokenType) -> bool,
{
    move |input: TokenSlice<'a>| match input.peek() {
        Some(token) if pred(&token.token_type) => Ok((input.advance(), token)),
        _ => Err(ParserError::expected(input, what)),
    }
}

/// Builds an AST span covering a whole token.
pub fn span_from_token(token: &Token) -> Span {
    Span::new(
        token.location.offset,
        token.end_offset(),
        token.location.line as u32,
        token.location.column as u32,
    )
}

// ---- Top-level entry points ----

/// The typed failure surface of [`parse_source`].
#[derive(Debug, thiserror::Error)]
pub enum StpError {
    /// The lexer rejected the input.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The token sequence matches no grammar alternative.
    #[error("{message}")]
    Syntax {
        /// Human-readable description.
        message: String,
        /// Where the error sits.
        span: Span,
        /// Optional hint for fixing the problem.
        help: Option<String>,
    },

    /// A delimiter was left unbalanced.
    #[error("{message}")]
    UnbalancedDelimiter {
        /// Human-readable description.
        message: String,
        /// Where the error sits.
        span: Span,
    },

    /// The nesting-depth guard tripped.
    #[error("nesting too deep (limit {MAX_NESTING_DEPTH})")]
    StackLimit {
        /// Where the limit was exceeded.
        span: Span,
    },
}

impl StpError {
    /// The source span the error points at.
    pub fn span(&self) -> Span {
        match self {
            StpError::Lex(err) => {
                let loc = err.location();
                Span::new(loc.offset, loc.offset, loc.line as u32, loc.column as u32)
            }
            StpError::Syntax { span, .. }
            | StpError::UnbalancedDelimiter { span, .. }
            | StpError::StackLimit { span } => *span,
        }
    }
}

fn stp_error_from(err: nom::Err<ParserError<'_>>) -> StpError {
    let inner = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => {
            return StpError::Syntax {
                message: "unexpected end of input".to_string(),
                span: Span::default(),
                help: None,
            }
        }
    };
    let span = inner
        .input
        .first()
        .map(span_from_token)
        .unwrap_or_default();
    match inner.kind {
        ParserErrorKind::StackLimit => StpError::StackLimit { span },
        ParserErrorKind::UnbalancedDelimiter { open, close } => StpError::UnbalancedDelimiter {
            message: format!("unbalanced delimiters: '{open}' without a matching '{close}'"),
            span,
        },
        _ => {
            let diag = Diagnostic::from_parser_error(&inner);
            StpError::Syntax {
                message: diag.message,
                span: diag.span,
                help: diag.help,
            }
        }
    }
}

/// A recovered parse: the tree (with error-marker statements where
/// recovery kicked in) plus every diagnostic gathered along the way.
#[derive(Debug)]
pub struct ParseOutcome {
    /// The parsed program; never silently drops input.
    pub program: ProgramNode,
    /// The problems found, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// True when the parse completed without errors.
    pub fn is_clean(&self) -> bool {
        self.diagnostics
            .iter()
            .all(|d| d.severity != Severity::Error)
    }
}

/// Parses a whole source file, failing fast on the first error.
///
/// This is the batch/compiler-style entry point; interactive consumers
/// should prefer [`parse_source_recovering`].
pub fn parse_source(source: &str) -> Result<ProgramNode, StpError> {
    let tokens = tokenize(source)?;
    let input = TokenSlice::new(&tokens);
    let (rest, program) = statements::parse_program(input).map_err(stp_error_from)?;
    debug_assert!(rest.is_empty());
    log::debug!(
        "parsed {} top-level statements from {} tokens",
        program.statements.len(),
        tokens.len()
    );
    Ok(program)
}

/// Parses a whole source file, recovering at statement boundaries.
///
/// On a statement-level error the parser records a diagnostic, inserts a
/// [`StatementNode::Error`] marker covering the skipped tokens, resumes at
/// the next statement separator, and keeps going. Input is never silently
/// dropped.
pub fn parse_source_recovering(source: &str) -> ParseOutcome {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(err) => {
            // Lexical errors poison the whole token stream; report and
            // return an empty tree rather than guessing.
            let loc = err.location();
            let span = Span::new(loc.offset, loc.offset, loc.line as u32, loc.column as u32);
            return ParseOutcome {
                program: ProgramNode {
                    statements: Vec::new(),
                    span: Span::default(),
                },
                diagnostics: vec![Diagnostic::at_span(span, err.to_string())],
            };
        }
    };
    let input = TokenSlice::new(&tokens);
    let (program, diagnostics) = statements::parse_program_recovering(input);
    ParseOutcome {
        program,
        diagnostics,
    }
}

/// A byte-range replacement applied to previously parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEdit {
    /// Start of the replaced range.
    pub start: usize,
    /// End of the replaced range in the old text (exclusive).
    pub old_end: usize,
    /// End of the replacement in the new text (exclusive).
    pub new_end: usize,
}

/// Re-parses after an edit.
///
/// This is a performance contract, not a correctness one: the current
/// implementation is the conforming fallback that re-parses `new_text` in
/// full. The signature is stable so an incremental engine can slot in
/// without breaking callers.
pub fn reparse(
    _previous: &ProgramNode,
    _edit: &SourceEdit,
    new_text: &str,
) -> Result<ProgramNode, StpError> {
    parse_source(new_text)
}

/// Parses `source` as a single expression, for tools that evaluate
/// fragments (e.g. a REPL prompt).
pub fn parse_expression_source(source: &str) -> Result<stp_ast::ast::ExpressionNode, StpError> {
    let tokens = tokenize(source)?;
    let input = TokenSlice::new(&tokens);
    let (rest, expr) = expressions::parse_expression(input).map_err(stp_error_from)?;
    let rest = rest.skip_newlines();
    if let Some(token) = rest.first() {
        return Err(StpError::Syntax {
            message: format!("unexpected trailing input: {}", diagnostics::pretty_token(&token.token_type)),
            span: span_from_token(token),
            help: None,
        });
    }
    Ok(expr)
}

/// Statement-level helper shared by the statement parser: true when the
/// token can end a statement.
pub(crate) fn ends_statement(token_type: &TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Newline
            | TokenType::Semicolon
            | TokenType::RightBrace
            | TokenType::Comment(_)
    )
}
