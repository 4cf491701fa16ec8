//! User-facing diagnostics: converting internal parse errors into messages
//! with spans and help text, and rendering source snippets for the CLI.

use stp_ast::ast::Span;
use stp_lexer::{Token, TokenType};

use crate::parser::{span_from_token, ParserError, ParserErrorKind, MAX_NESTING_DEPTH};

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The input does not parse.
    Error,
    /// Suspicious but parseable.
    Warning,
    /// Additional context.
    Note,
}

/// A diagnostic describing a problem in source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// How severe the problem is.
    pub severity: Severity,
    /// What went wrong.
    pub message: String,
    /// Where it went wrong.
    pub span: Span,
    /// An optional hint for fixing it.
    pub help: Option<String>,
}

impl Diagnostic {
    /// Creates an error diagnostic at a specific token.
    pub fn at_token<S: Into<String>>(token: &Token, message: S) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span: span_from_token(token),
            help: default_help_for_token(&token.token_type),
        }
    }

    /// Creates an error diagnostic with an explicit span.
    pub fn at_span<S: Into<String>>(span: Span, message: S) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            help: None,
        }
    }

    /// Converts an internal parser error into a diagnostic.
    pub fn from_parser_error(err: &ParserError<'_>) -> Self {
        let token = err.input.first();
        let span = token.map(span_from_token).unwrap_or_default();
        let (message, help) = match &err.kind {
            ParserErrorKind::Expected(what) => match token {
                Some(token) => (
                    format!("expected {what}, found {}", pretty_token(&token.token_type)),
                    default_help_for_token(&token.token_type),
                ),
                None => (format!("expected {what}, found end of input"), None),
            },
            ParserErrorKind::UnbalancedDelimiter { open, close } => (
                format!("unbalanced delimiters: '{open}' without a matching '{close}'"),
                Some(format!("add the missing '{close}'")),
            ),
            ParserErrorKind::StackLimit => (
                format!("nesting too deep (limit {MAX_NESTING_DEPTH})"),
                Some("flatten the expression or split it across statements".to_string()),
            ),
            ParserErrorKind::Nom(kind) => match token {
                Some(token) => (
                    format!("unexpected {}", pretty_token(&token.token_type)),
                    default_help_for_token(&token.token_type),
                ),
                None => (format!("syntax error ({kind:?}) at end of input"), None),
            },
        };
        Self {
            severity: Severity::Error,
            message,
            span,
            help,
        }
    }
}

/// Converts a `nom` error wrapper into a single diagnostic.
pub fn diagnostic_from_err(err: &nom::Err<ParserError<'_>>) -> Diagnostic {
    match err {
        nom::Err::Error(inner) | nom::Err::Failure(inner) => Diagnostic::from_parser_error(inner),
        nom::Err::Incomplete(_) => Diagnostic {
            severity: Severity::Error,
            message: "incomplete input".to_string(),
            span: Span::default(),
            help: Some("did the file end unexpectedly?".to_string()),
        },
    }
}

/// Provides a default help message for a token type.
fn default_help_for_token(tt: &TokenType) -> Option<String> {
    use TokenType::*;
    match tt {
        RightBrace => Some("did you forget a matching '{' earlier?".to_string()),
        RightParen => Some("did you forget a matching '(' earlier?".to_string()),
        RightBracket => Some("did you forget a matching '[' earlier?".to_string()),
        Comma => Some("use ',' to separate parameters or arguments".to_string()),
        Semicolon => {
            Some("';' separates matrix rows and optionally terminates statements".to_string())
        }
        Equal => Some("'=' assigns; use '==' to compare".to_string()),
        EqualEqual => Some("use '=' to assign and '==' to compare".to_string()),
        Ellipsis => Some("ranges are 'start...end' or 'start...step...end'".to_string()),
        Percent => Some("'%' attaches directly to a number, as in '50%'".to_string()),
        Mod => Some("'mod' needs whitespace on both sides".to_string()),
        Elseif => Some("'elseif' belongs to an 'if' chain, before any 'else'".to_string()),
        Else => Some("'else' closes an 'if' chain".to_string()),
        Newline => Some("the statement seems incomplete at the line break".to_string()),
        Identifier(_) => {
            Some("identifiers start with a letter or '_' and continue with letters, digits, or '_'"
                .to_string())
        }
        Number(_) => Some("a number appeared where a name was expected".to_string()),
        _ => None,
    }
}

/// Formats a token type for display.
pub fn pretty_token(tt: &TokenType) -> String {
    match tt {
        TokenType::Identifier(name) => format!("identifier '{name}'"),
        TokenType::Number(value) => format!("number '{value}'"),
        TokenType::Comment(_) => "comment".to_string(),
        TokenType::Newline => "end of line".to_string(),
        TokenType::StringStart | TokenType::StringEnd => "'\"'".to_string(),
        TokenType::StringChars(_) => "string text".to_string(),
        TokenType::EscapeSequence(_)
        | TokenType::UnicodeEscape { .. }
        | TokenType::OctalEscape { .. } => "string escape".to_string(),
        TokenType::FormatStart => "'\\{'".to_string(),
        TokenType::FormatEnd => "'\\}'".to_string(),
        other => {
            if let Some(spelling) = spelling_of(other) {
                format!("'{spelling}'")
            } else {
                format!("{other:?}")
            }
        }
    }
}

fn spelling_of(tt: &TokenType) -> Option<&'static str> {
    use TokenType::*;
    Some(match tt {
        Sym => "sym",
        If => "if",
        Elseif => "elseif",
        Else => "else",
        While => "while",
        For => "for",
        In => "in",
        Fn => "fn",
        Import => "import",
        Break => "break",
        Cont => "cont",
        Exit => "exit",
        Ret => "ret",
        Mod => "mod",
        And => "and",
        Or => "or",
        Not => "not",
        Plus => "+",
        Minus => "-",
        Star => "*",
        Slash => "/",
        Caret => "^",
        DotStar => ".*",
        DotSlash => "./",
        DotCaret => ".^",
        At => "@",
        Amp => "&",
        Tilde => "~",
        Percent => "%",
        Quote => "'",
        Bang => "!",
        Equal => "=",
        EqualEqual => "==",
        NotEqual => "!=",
        Less => "<",
        LessEqual => "<=",
        Greater => ">",
        GreaterEqual => ">=",
        Ellipsis => "...",
        Dot => ".",
        LeftParen => "(",
        RightParen => ")",
        LeftBrace => "{",
        RightBrace => "}",
        LeftBracket => "[",
        RightBracket => "]",
        Comma => ",",
        Semicolon => ";",
        _ => return None,
    })
}

/// Renders the source lines a span covers, with a tilde underline, for
/// terminal output:
///
/// ```text
///  3  | x = [1 2; 3]
///     |     ~~~~~~~~
/// ```
pub fn render_snippet(source: &str, span: &Span) -> String {
    let lines: Vec<&str> = source.lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let line_idx = (span.line as usize).saturating_sub(1).min(lines.len() - 1);
    let line = lines[line_idx];
    let line_no = format!("{:>4}", line_idx + 1);

    let col = (span.column as usize).saturating_sub(1).min(line.len());
    let width = span.end.saturating_sub(span.start).clamp(1, line.len() - col.min(line.len()) + 1);

    let mut out = String::new();
    out.push_str(&format!("{line_no} | {line}\n"));
    out.push_str(&format!(
        "{} | {}{}\n",
        " ".repeat(line_no.len()),
        " ".repeat(col),
        "~".repeat(width)
    ));
    out
}
