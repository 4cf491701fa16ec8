use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use crate::string_interner::InternedString;

/// Represents a token's location in the source code.
///
/// Tracks the position of a token in the source text, including line and
/// column numbers (1-based) and the byte offset (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// The 1-based line number in the source file
    pub line: usize,
    /// The 1-based column number in the source file
    pub column: usize,
    /// The 0-based byte offset from the start of the source
    pub offset: usize,
}

/// Represents the type of a token in the Stp language.
///
/// Covers keywords, literals, operators, punctuation, trivia, and the
/// string-mode tokens produced by the string sub-lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Keywords
    Sym,
    If,
    Elseif,
    Else,
    While,
    For,
    In,
    Fn,
    Import,
    Break,
    Cont,
    Exit,
    Ret,
    Mod,
    And,
    Or,
    Not,

    // Literals and identifiers
    Identifier(InternedString),
    Number(f64),

    // Trivia; never participates in grammar decisions
    Comment(InternedString),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    DotStar,
    DotSlash,
    DotCaret,
    At,
    Amp,
    Tilde,
    Percent,
    Quote,
    Bang,
    Equal,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Ellipsis,
    Dot,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Newline,

    // String-mode tokens
    StringStart,
    StringEnd,
    StringChars(InternedString),
    EscapeSequence(char),
    UnicodeEscape {
        /// The hexadecimal digits as written (2, 4, or 8 of them)
        digits: InternedString,
        /// The decoded scalar value
        value: char,
    },
    OctalEscape {
        /// Exactly three octal digits as written
        digits: InternedString,
        /// The decoded scalar value
        value: char,
    },
    FormatStart,
    FormatEnd,
}

lazy_static! {
    /// Reserved words, looked up after a maximal identifier match.
    pub static ref KEYWORDS: HashMap<&'static str, TokenType> = {
        let mut m = HashMap::new();
        m.insert("sym", TokenType::Sym);
        m.insert("if", TokenType::If);
        m.insert("elseif", TokenType::Elseif);
        m.insert("else", TokenType::Else);
        m.insert("while", TokenType::While);
        m.insert("for", TokenType::For);
        m.insert("in", TokenType::In);
        m.insert("fn", TokenType::Fn);
        m.insert("import", TokenType::Import);
        m.insert("break", TokenType::Break);
        m.insert("cont", TokenType::Cont);
        m.insert("exit", TokenType::Exit);
        m.insert("ret", TokenType::Ret);
        m.insert("mod", TokenType::Mod);
        m.insert("and", TokenType::And);
        m.insert("or", TokenType::Or);
        m.insert("not", TokenType::Not);
        m
    };
}

impl TokenType {
    /// Resolves an identifier lexeme to its keyword token, if reserved.
    pub fn keyword_from_str(ident: &str) -> Option<TokenType> {
        KEYWORDS.get(ident).cloned()
    }
}

/// A token in the source code: its type, original text, and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of the token
    pub token_type: TokenType,
    /// The original source text of the token
    pub lexeme: InternedString,
    /// The location of the token in the source code
    pub location: Location,
}

impl Token {
    /// Creates a new token, interning the lexeme if necessary.
    pub fn new<S: Into<InternedString>>(token_type: TokenType, lexeme: S, location: Location) -> Self {
        Self {
            token_type,
            lexeme: lexeme.into(),
            location,
        }
    }

    /// Byte offset one past the end of this token's lexeme.
    pub fn end_offset(&self) -> usize {
        self.location.offset + self.lexeme.len()
    }

    /// Returns true if this token is a reserved word.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self.token_type,
            TokenType::Sym
                | TokenType::If
                | TokenType::Elseif
                | TokenType::Else
                | TokenType::While
                | TokenType::For
                | TokenType::In
                | TokenType::Fn
                | TokenType::Import
                | TokenType::Break
                | TokenType::Cont
                | TokenType::Exit
                | TokenType::Ret
                | TokenType::Mod
                | TokenType::And
                | TokenType::Or
                | TokenType::Not
        )
    }

    /// Returns true for trivia the grammar ignores (comments).
    pub fn is_trivia(&self) -> bool {
        matches!(self.token_type, TokenType::Comment(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.token_type, self.location)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.line, self.column, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_creation() {
        let location = Location {
            line: 1,
            column: 1,
            offset: 0,
        };
        let token = Token::new(TokenType::Sym, "sym", location);
        assert_eq!(token.token_type, TokenType::Sym);
        assert_eq!(token.lexeme, "sym");
        assert_eq!(token.location, location);
        assert_eq!(token.end_offset(), 3);
    }

    #[test]
    fn keyword_lookup_is_exact() {
        assert_eq!(TokenType::keyword_from_str("mod"), Some(TokenType::Mod));
        assert_eq!(TokenType::keyword_from_str("modx"), None);
        assert_eq!(TokenType::keyword_from_str("Mod"), None);
    }

    #[test]
    fn is_keyword() {
        let location = Location::default();
        let keyword_token = Token::new(TokenType::Ret, "ret", location);
        let ident_token = Token::new(TokenType::Identifier("retries".into()), "retries", location);

        assert!(keyword_token.is_keyword());
        assert!(!ident_token.is_keyword());
    }
}
