//! Lexer for the Stp language using the 'logos' crate for raw tokens.
//!
//! The lexer is modal. Normal mode delegates to the `logos`-derived scanner
//! and resolves keywords after a maximal identifier match. A `"` pushes
//! string mode, a hand-written maximal-munch scanner that recognizes literal
//! runs, escape sequences, and `\{ ... \}` formatting snippets. The snippet
//! interior is lexed in normal mode again (pushed on the mode stack), so a
//! `}` belonging to a block or matrix inside the snippet can never be
//! mistaken for the closing `\}`.

use logos::Logos;
use thiserror::Error;

use crate::logos_token::LogosToken;
use crate::string_interner::InternedString;
use crate::token::{Location, Token, TokenType};

/// Errors produced during lexical analysis. Every variant carries the
/// location of the offending text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    /// A character that no token can start with, outside any literal.
    #[error("unrecognized character '{ch}' at {location}")]
    UnexpectedChar {
        /// The offending character
        ch: char,
        /// Where it was found
        location: Location,
    },

    /// End of input was reached inside a string literal or an unclosed
    /// formatting snippet.
    #[error("unterminated string literal starting at {start}")]
    UnterminatedString {
        /// Where the string literal opened
        start: Location,
        /// End of input, where the closing quote was expected
        location: Location,
    },

    /// A `\` at the very end of the input, with nothing to escape.
    #[error("unterminated escape sequence at {location}")]
    UnterminatedEscape {
        /// Where the dangling backslash sits
        location: Location,
    },

    /// An escape sequence that matches none of the recognized forms.
    #[error("invalid escape sequence '{text}' at {location}")]
    InvalidEscape {
        /// The escape text as written
        text: String,
        /// Where the escape starts
        location: Location,
    },

    /// A `\}` with no formatting snippet open.
    #[error("'\\}}' outside a formatting snippet at {location}")]
    StraySnippetClose {
        /// Where the stray `\}` sits
        location: Location,
    },
}

impl LexError {
    /// The location the error points at.
    pub fn location(&self) -> Location {
        match self {
            LexError::UnexpectedChar { location, .. }
            | LexError::UnterminatedString { location, .. }
            | LexError::UnterminatedEscape { location }
            | LexError::InvalidEscape { location, .. }
            | LexError::StraySnippetClose { location } => *location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Normal,
    InString,
}

/// Converts Stp source text into a token sequence.
///
/// Tokens are produced in a single left-to-right scan; each carries its
/// source location and original lexeme. Comments and newlines are kept in
/// the stream (the parser treats comments as trivia and newlines as
/// statement separators); spaces, tabs, `\r`, and backslash-newline
/// continuations are dropped.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    modes: Vec<Mode>,
    string_starts: Vec<Location>,
    line: usize,
    column: usize,
    cursor: usize,
}

/// Tokenizes `source`, failing on the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            modes: vec![Mode::Normal],
            string_starts: Vec::new(),
            line: 1,
            column: 1,
            cursor: 0,
        }
    }

    /// Runs the scan to completion.
    pub fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut lex = LogosToken::lexer(self.source);
        loop {
            match self.modes.last().copied().unwrap_or(Mode::Normal) {
                Mode::Normal => {
                    let Some(item) = lex.next() else { break };
                    let span = lex.span();
                    let slice = lex.slice();
                    match item {
                        Ok(raw) => self.emit_normal(raw, slice, span.start)?,
                        Err(()) => {
                            let ch = slice.chars().next().unwrap_or('\u{FFFD}');
                            let location = self.location_at(span.start);
                            return Err(LexError::UnexpectedChar { ch, location });
                        }
                    }
                }
                Mode::InString => self.scan_string_segment(&mut lex)?,
            }
        }

        if self.modes.len() > 1 {
            // An unclosed string, or an unclosed snippet suspending one.
            let start = self.string_starts.last().copied().unwrap_or_default();
            let location = self.location_at(self.source.len());
            return Err(LexError::UnterminatedString { start, location });
        }

        #[cfg(feature = "logging")]
        log::debug!("lexed {} tokens", self.tokens.len());

        Ok(self.tokens)
    }

    fn emit_normal(&mut self, raw: LogosToken, slice: &str, offset: usize) -> Result<(), LexError> {
        let token_type = match raw {
            // logos skips these; they never reach the driver
            LogosToken::Whitespace | LogosToken::LineContinuation => return Ok(()),
            LogosToken::Newline => TokenType::Newline,
            LogosToken::Comment => TokenType::Comment(InternedString::from(slice)),
            LogosToken::Identifier => TokenType::keyword_from_str(slice)
                .unwrap_or_else(|| TokenType::Identifier(InternedString::from(slice))),
            LogosToken::Number(value) => TokenType::Number(value),
            LogosToken::Ellipsis => TokenType::Ellipsis,
            LogosToken::DotStar => TokenType::DotStar,
            LogosToken::DotSlash => TokenType::DotSlash,
            LogosToken::DotCaret => TokenType::DotCaret,
            LogosToken::EqualEqual => TokenType::EqualEqual,
            LogosToken::NotEqual => TokenType::NotEqual,
            LogosToken::LessEqual => TokenType::LessEqual,
            LogosToken::GreaterEqual => TokenType::GreaterEqual,
            LogosToken::Dot => TokenType::Dot,
            LogosToken::Less => TokenType::Less,
            LogosToken::Greater => TokenType::Greater,
            LogosToken::Equal => TokenType::Equal,
            LogosToken::Plus => TokenType::Plus,
            LogosToken::Minus => TokenType::Minus,
            LogosToken::Star => TokenType::Star,
            LogosToken::Slash => TokenType::Slash,
            LogosToken::Caret => TokenType::Caret,
            LogosToken::At => TokenType::At,
            LogosToken::Amp => TokenType::Amp,
            LogosToken::Tilde => TokenType::Tilde,
            LogosToken::Percent => TokenType::Percent,
            LogosToken::Quote => TokenType::Quote,
            LogosToken::Bang => TokenType::Bang,
            LogosToken::LeftParen => TokenType::LeftParen,
            LogosToken::RightParen => TokenType::RightParen,
            LogosToken::LeftBrace => TokenType::LeftBrace,
            LogosToken::RightBrace => TokenType::RightBrace,
            LogosToken::LeftBracket => TokenType::LeftBracket,
            LogosToken::RightBracket => TokenType::RightBracket,
            LogosToken::Comma => TokenType::Comma,
            LogosToken::Semicolon => TokenType::Semicolon,
            LogosToken::DoubleQuote => {
                self.push_token(TokenType::StringStart, slice, offset);
                let start = self
                    .tokens
                    .last()
                    .map(|t| t.location)
                    .unwrap_or_default();
                self.string_starts.push(start);
                self.modes.push(Mode::InString);
                return Ok(());
            }
            LogosToken::FormatEnd => {
                let suspended_string = self.modes.len() >= 2
                    && self.modes[self.modes.len() - 2] == Mode::InString;
                if !suspended_string {
                    let location = self.location_at(offset);
                    return Err(LexError::StraySnippetClose { location });
                }
                self.push_token(TokenType::FormatEnd, slice, offset);
                self.modes.pop();
                return Ok(());
            }
        };
        self.push_token(token_type, slice, offset);
        Ok(())
    }

    /// Scans one string segment: the closing quote, an escape, or a maximal
    /// literal run. Uses `remainder`/`bump` to keep the logos cursor in sync.
    fn scan_string_segment(
        &mut self,
        lex: &mut logos::Lexer<'a, LogosToken>,
    ) -> Result<(), LexError> {
        let rem = lex.remainder();
        let base = self.source.len() - rem.len();

        let Some(first) = rem.chars().next() else {
            let start = self.string_starts.last().copied().unwrap_or_default();
            let location = self.location_at(self.source.len());
            return Err(LexError::UnterminatedString { start, location });
        };

        match first {
            '"' => {
                self.push_token(TokenType::StringEnd, "\"", base);
                lex.bump(1);
                self.modes.pop();
                self.string_starts.pop();
            }
            '\\' => {
                let consumed = self.scan_escape(rem, base)?;
                lex.bump(consumed);
            }
            _ => {
                let end = rem.find(['"', '\\']).unwrap_or(rem.len());
                let run = &rem[..end];
                self.push_token(TokenType::StringChars(InternedString::from(run)), run, base);
                lex.bump(end);
            }
        }
        Ok(())
    }

    /// Scans an escape at `rem[0] == '\\'`; emits its token and returns the
    /// number of bytes consumed.
    fn scan_escape(&mut self, rem: &str, base: usize) -> Result<usize, LexError> {
        let mut chars = rem.chars();
        chars.next();
        let Some(kind) = chars.next() else {
            let location = self.location_at(base);
            return Err(LexError::UnterminatedEscape { location });
        };

        match kind {
            'r' | 'n' | 't' | 'b' | 'f' | '"' | '\\' => {
                let value = match kind {
                    'r' => '\r',
                    'n' => '\n',
                    't' => '\t',
                    'b' => '\u{0008}',
                    'f' => '\u{000C}',
                    other => other,
                };
                self.push_token(TokenType::EscapeSequence(value), &rem[..2], base);
                Ok(2)
            }
            '{' => {
                self.push_token(TokenType::FormatStart, &rem[..2], base);
                self.modes.push(Mode::Normal);
                Ok(2)
            }
            '}' => {
                let location = self.location_at(base);
                Err(LexError::StraySnippetClose { location })
            }
            'x' => {
                // Exact lengths only, longest first: 8, then 4, then 2.
                let run = rem[2..]
                    .chars()
                    .take(8)
                    .take_while(char::is_ascii_hexdigit)
                    .count();
                let take = if run >= 8 {
                    8
                } else if run >= 4 {
                    4
                } else if run >= 2 {
                    2
                } else {
                    let location = self.location_at(base);
                    return Err(LexError::InvalidEscape {
                        text: rem[..rem.len().min(4)].to_string(),
                        location,
                    });
                };
                let digits = &rem[2..2 + take];
                let Some(value) = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
                else {
                    let location = self.location_at(base);
                    return Err(LexError::InvalidEscape {
                        text: rem[..2 + take].to_string(),
                        location,
                    });
                };
                self.push_token(
                    TokenType::UnicodeEscape {
                        digits: digits.into(),
                        value,
                    },
                    &rem[..2 + take],
                    base,
                );
                Ok(2 + take)
            }
            '0'..='7' => {
                let run = rem[1..]
                    .chars()
                    .take(3)
                    .take_while(|c| ('0'..='7').contains(c))
                    .count();
                if run < 3 {
                    let location = self.location_at(base);
                    return Err(LexError::InvalidEscape {
                        text: rem[..rem.len().min(4)].to_string(),
                        location,
                    });
                }
                let digits = &rem[1..4];
                let Some(value) = u32::from_str_radix(digits, 8).ok().and_then(char::from_u32)
                else {
                    let location = self.location_at(base);
                    return Err(LexError::InvalidEscape {
                        text: rem[..4].to_string(),
                        location,
                    });
                };
                self.push_token(
                    TokenType::OctalEscape {
                        digits: digits.into(),
                        value,
                    },
                    &rem[..4],
                    base,
                );
                Ok(4)
            }
            other => {
                let location = self.location_at(base);
                Err(LexError::InvalidEscape {
                    text: format!("\\{other}"),
                    location,
                })
            }
        }
    }

    fn push_token(&mut self, token_type: TokenType, lexeme: &str, offset: usize) {
        let location = self.location_at(offset);
        self.tokens.push(Token::new(token_type, lexeme, location));
    }

    /// Advances the line/column trackers to `offset` and returns the
    /// location there. Offsets are visited in increasing order only.
    fn location_at(&mut self, offset: usize) -> Location {
        debug_assert!(offset >= self.cursor);
        for ch in self.source[self.cursor..offset].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.cursor = offset;
        Location {
            line: self.line,
            column: self.column,
            offset,
        }
    }
}
