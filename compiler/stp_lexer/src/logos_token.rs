//! Raw token recognition for normal (non-string) lexing mode.
//!
//! Keywords are deliberately absent from this enum: the lexer matches a
//! maximal identifier first and only then consults the keyword table, so
//! `mod` is a keyword while `modx` and `xmod` stay identifiers.

use logos::Logos;

/// Raw token type produced by the `logos`-derived scanner.
///
/// String interiors are not scanned here; the driver in [`crate::lexer`]
/// switches to the hand-written string sub-lexer after a `"` and back again
/// around `\{ ... \}` formatting snippets.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum LogosToken {
    // Whitespace and line continuations are skipped; newlines are not,
    // because they separate statements.
    #[regex(r"[ \t\r]+", logos::skip)]
    Whitespace,
    #[regex(r"\\\r?\n", logos::skip)]
    LineContinuation,
    #[token("\n")]
    Newline,

    // Comments run to end of line and are kept as trivia.
    #[regex(r"#[^\n]*")]
    Comment,

    // Identifiers; keyword disambiguation happens afterwards.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // Numbers: integer or decimal. A trailing `%` is a separate token the
    // parser folds in as a postfix percentage marker.
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Multi-character operators before their single-character prefixes.
    #[token("...")]
    Ellipsis,
    #[token(".*")]
    DotStar,
    #[token("./")]
    DotSlash,
    #[token(".^")]
    DotCaret,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,

    #[token(".")]
    Dot,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("=")]
    Equal,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("@")]
    At,
    #[token("&")]
    Amp,
    #[token("~")]
    Tilde,
    #[token("%")]
    Percent,
    #[token("'")]
    Quote,
    #[token("!")]
    Bang,

    // Delimiters
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,

    // A `"` hands control to the string sub-lexer.
    #[token("\"")]
    DoubleQuote,

    // Closes a formatting snippet, returning control to the sub-lexer.
    // Only legal while a string is suspended on the mode stack.
    #[token("\\}")]
    FormatEnd,
}
