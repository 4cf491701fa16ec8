// Integration tests for the lexer: whole-file token streams and a
// property check over generated token soup.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use stp_lexer::{tokenize, TokenType};

#[test]
fn a_small_program_produces_the_expected_stream() {
    let source = "total = 0\nfor i in 1...10 {\n    total = total + i\n}\n";
    let tokens = tokenize(source).unwrap();
    let types: Vec<&TokenType> = tokens.iter().map(|t| &t.token_type).collect();

    assert!(matches!(types[0], TokenType::Identifier(n) if n.as_str() == "total"));
    assert!(matches!(types[1], TokenType::Equal));
    assert!(matches!(types[2], TokenType::Number(v) if *v == 0.0));
    assert!(matches!(types[3], TokenType::Newline));
    assert!(matches!(types[4], TokenType::For));
    assert!(matches!(types[6], TokenType::In));
    assert!(types.iter().any(|t| matches!(t, TokenType::Ellipsis)));
    assert!(types.iter().any(|t| matches!(t, TokenType::LeftBrace)));
    assert!(types.iter().any(|t| matches!(t, TokenType::RightBrace)));
}

#[test]
fn lexemes_slice_back_into_the_source() {
    let source = "x = [1 2; 3 4]' .* y mod 2 # done\n";
    let tokens = tokenize(source).unwrap();
    for token in &tokens {
        let start = token.location.offset;
        let end = token.end_offset();
        assert_eq!(
            &source[start..end],
            token.lexeme.as_str(),
            "lexeme of {token} does not match its span"
        );
    }
}

#[test]
fn string_tokens_cover_the_literal_without_gaps() {
    let source = r#"msg = "a\tb\{x + 1\}c""#;
    let tokens = tokenize(source).unwrap();
    let string_tokens: Vec<_> = tokens
        .iter()
        .skip_while(|t| !matches!(t.token_type, TokenType::StringStart))
        .collect();
    let mut cursor = string_tokens[0].location.offset;
    for token in &string_tokens {
        assert_eq!(token.location.offset, cursor, "gap before {token}");
        cursor = token.end_offset();
    }
    assert_eq!(cursor, source.len());
}

proptest! {
    #[test]
    fn token_soup_lexes_with_tiling_spans(
        words in prop::collection::vec(
            prop_oneof![
                "[a-z_][a-z0-9_]{0,6}",
                "[0-9]{1,3}(\\.[0-9]{1,2})?",
                Just("+".to_string()),
                Just("-".to_string()),
                Just("*".to_string()),
                Just("==".to_string()),
                Just("(".to_string()),
                Just(")".to_string()),
                Just("...".to_string()),
            ],
            1..40,
        )
    ) {
        let source = words.join(" ");
        let tokens = tokenize(&source).expect("token soup should lex");
        prop_assert_eq!(tokens.is_empty(), source.is_empty());
        let mut last_end = 0usize;
        for token in &tokens {
            prop_assert!(token.location.offset >= last_end);
            prop_assert_eq!(
                &source[token.location.offset..token.end_offset()],
                token.lexeme.as_str()
            );
            last_end = token.end_offset();
        }
    }
}
