//! Expression parsing: precedence climbing over the four binary operator
//! classes, with prefix, postfix, and primary layers.
//!
//! Postfix forms (calls, member accesses, and the suffix operators `'`,
//! `!`, `%`) fold left-to-right immediately after a primary. The tight
//! prefixes `~ + -` bind above every binary class; `not` binds below them
//! all and captures the rest of the expression.

use std::mem;

use stp_ast::ast::{
    BinaryExpressionNode, BinaryOperator, CallExpressionNode, ExpressionNode,
    FormattingSnippetNode, IdentifierNode, KeywordArgNode, MatrixNode, MatrixRowNode,
    MemberExpressionNode, NumberLiteralNode, RangeNode, Spanned, StringLiteralNode,
    StringSegmentNode, SuffixExpressionNode, SuffixOperator, UnaryExpressionNode, UnaryOperator,
    EscapeSequenceNode, OctalEscapeNode, UnicodeEscapeNode,
};
use stp_lexer::TokenType;

use crate::parser::{span_from_token, take_token_if, ParserError, PResult, TokenSlice};

/// Parses one full expression.
pub fn parse_expression(input: TokenSlice<'_>) -> PResult<'_, ExpressionNode> {
    parse_binary_expression(input, 0)
}

/// Maps an operator token to its binary operator, if it is one.
pub fn binary_operator_of(token_type: &TokenType) -> Option<BinaryOperator> {
    match token_type {
        TokenType::Plus => Some(BinaryOperator::Add),
        TokenType::Minus => Some(BinaryOperator::Sub),
        TokenType::Star => Some(BinaryOperator::Mul),
        TokenType::Slash => Some(BinaryOperator::Div),
        TokenType::DotStar => Some(BinaryOperator::ElemMul),
        TokenType::DotSlash => Some(BinaryOperator::ElemDiv),
        TokenType::Caret => Some(BinaryOperator::Pow),
        TokenType::DotCaret => Some(BinaryOperator::ElemPow),
        TokenType::Mod => Some(BinaryOperator::Mod),
        TokenType::At => Some(BinaryOperator::MatMul),
        TokenType::Amp => Some(BinaryOperator::ElemAnd),
        TokenType::EqualEqual => Some(BinaryOperator::Eq),
        TokenType::NotEqual => Some(BinaryOperator::Ne),
        TokenType::Less => Some(BinaryOperator::Lt),
        TokenType::LessEqual => Some(BinaryOperator::Le),
        TokenType::Greater => Some(BinaryOperator::Gt),
        TokenType::GreaterEqual => Some(BinaryOperator::Ge),
        TokenType::In => Some(BinaryOperator::In),
        TokenType::And => Some(BinaryOperator::And),
        TokenType::Or => Some(BinaryOperator::Or),
        _ => None,
    }
}

/// Precedence-climbing loop over binary operators at or above `min_prec`.
pub fn parse_binary_expression(input: TokenSlice<'_>, min_prec: u8) -> PResult<'_, ExpressionNode> {
    let (mut input, mut left) = parse_prefix(input)?;
    loop {
        let Some(token) = input.peek() else { break };
        let Some(operator) = binary_operator_of(&token.token_type) else {
            break;
        };
        let prec = operator.precedence();
        if prec < min_prec {
            break;
        }

        // ` mod ` is a spaced keyword operator: whitespace is mandatory on
        // both sides.
        if operator == BinaryOperator::Mod {
            let spaced_before = token.location.offset > left.span().end;
            let spaced_after = match input.advance().first() {
                Some(next) => next.location.offset > token.end_offset(),
                None => true,
            };
            if !spaced_before || !spaced_after {
                return Err(ParserError::failure(input, "whitespace around 'mod'"));
            }
        }

        let next_min = if operator.is_right_assoc() {
            prec
        } else {
            prec + 1
        };
        let (rest, right) = parse_binary_expression(input.advance(), next_min)?;
        let span = left.span().to(&right.span());
        left = ExpressionNode::Binary(Spanned::new(
            Box::new(BinaryExpressionNode {
                left,
                operator,
                right,
            }),
            span,
        ));
        input = rest;
    }
    Ok((input, left))
}

/// Prefix layer: `~ + -` bind tighter than any binary operator and are
/// right-associative; `not` captures the rest of the expression.
fn parse_prefix(input: TokenSlice<'_>) -> PResult<'_, ExpressionNode> {
    let Some(token) = input.peek() else {
        return Err(ParserError::expected(input, "expression"));
    };
    match &token.token_type {
        // A signed range bound: `-1...5` is a range, not a negation.
        TokenType::Minus | TokenType::Plus if starts_range(&input) => parse_range(input),
        TokenType::Minus | TokenType::Plus | TokenType::Tilde => {
            let operator = match token.token_type {
                TokenType::Minus => UnaryOperator::Neg,
                TokenType::Plus => UnaryOperator::Plus,
                _ => UnaryOperator::BitNot,
            };
            let op_span = span_from_token(token);
            let (rest, operand) = parse_prefix(input.advance())?;
            let span = op_span.to(&operand.span());
            Ok((
                rest,
                ExpressionNode::Unary(Spanned::new(
                    Box::new(UnaryExpressionNode { operator, operand }),
                    span,
                )),
            ))
        }
        TokenType::Not => {
            let op_span = span_from_token(token);
            let (rest, operand) = parse_binary_expression(input.advance(), 0)?;
            let span = op_span.to(&operand.span());
            Ok((
                rest,
                ExpressionNode::Unary(Spanned::new(
                    Box::new(UnaryExpressionNode {
                        operator: UnaryOperator::Not,
                        operand,
                    }),
                    span,
                )),
            ))
        }
        _ => parse_postfix(input),
    }
}

/// Postfix layer: member accesses, calls, and suffix operators fold
/// left-to-right after a primary.
fn parse_postfix(input: TokenSlice<'_>) -> PResult<'_, ExpressionNode> {
    let (mut input, mut expr) = parse_primary(input)?;
    loop {
        let Some(token) = input.peek() else { break };
        match &token.token_type {
            TokenType::Dot => {
                let (rest, property) = parse_identifier(input.advance())?;
                let span = expr.span().to(&property.span);
                expr = ExpressionNode::Member(Spanned::new(
                    Box::new(MemberExpressionNode {
                        object: expr,
                        property,
                    }),
                    span,
                ));
                input = rest;
            }
            TokenType::LeftParen => {
                let (rest, call) = parse_call(input, expr)?;
                expr = call;
                input = rest;
            }
            TokenType::Quote => {
                expr = fold_suffix(expr, SuffixOperator::Transpose, token);
                input = input.advance();
            }
            TokenType::Bang => {
                expr = fold_suffix(expr, SuffixOperator::Factorial, token);
                input = input.advance();
            }
            TokenType::Percent => {
                // The percentage marker attaches directly, with no
                // intervening whitespace.
                if token.location.offset != expr.span().end {
                    return Err(ParserError::failure(input, "'%' directly after its operand"));
                }
                expr = fold_suffix(expr, SuffixOperator::Percent, token);
                input = input.advance();
            }
            _ => break,
        }
    }
    Ok((input, expr))
}

fn fold_suffix(
    value: ExpressionNode,
    operator: SuffixOperator,
    token: &stp_lexer::Token,
) -> ExpressionNode {
    let span = value.span().to(&span_from_token(token));
    ExpressionNode::Suffix(Spanned::new(
        Box::new(SuffixExpressionNode { value, operator }),
        span,
    ))
}

/// Primary forms: matrix, range, bracketed expression, string, number,
/// identifier.
fn parse_primary(input: TokenSlice<'_>) -> PResult<'_, ExpressionNode> {
    let Some(token) = input.peek() else {
        return Err(ParserError::expected(input, "expression"));
    };
    match &token.token_type {
        TokenType::Number(_) if starts_range(&input) => parse_range(input),
        TokenType::Number(value) => {
            let node = NumberLiteralNode {
                value: *value,
                raw: token.lexeme.as_str().to_string(),
            };
            Ok((
                input.advance(),
                ExpressionNode::Number(Spanned::new(node, span_from_token(token))),
            ))
        }
        TokenType::Identifier(_) => {
            let (rest, ident) = parse_identifier(input)?;
            Ok((rest, ExpressionNode::Identifier(ident)))
        }
        TokenType::StringStart => parse_string(input),
        TokenType::LeftBracket => parse_matrix(input),
        TokenType::LeftParen => {
            let inner = input.advance().deeper()?.skip_newlines();
            let (rest, expr) = parse_expression(inner)?;
            let rest = rest.skip_newlines();
            match rest.peek_type() {
                Some(TokenType::RightParen) => Ok((rest.advance().at_depth_of(&input), expr)),
                Some(_) => Err(ParserError::failure(rest, "')'")),
                None => Err(ParserError::unbalanced(rest, "(", ")")),
            }
        }
        _ => Err(ParserError::expected(input, "expression")),
    }
}

/// Parses an identifier token into a spanned node.
pub(crate) fn parse_identifier(input: TokenSlice<'_>) -> PResult<'_, Spanned<IdentifierNode>> {
    match input.peek() {
        Some(token) => {
            if let TokenType::Identifier(name) = &token.token_type {
                Ok((
                    input.advance(),
                    Spanned::new(
                        IdentifierNode {
                            name: name.as_str().to_string(),
                        },
                        span_from_token(token),
                    ),
                ))
            } else {
                Err(ParserError::expected(input, "identifier"))
            }
        }
        None => Err(ParserError::expected(input, "identifier")),
    }
}

/// True when the input starts a range literal: `[sign] number '...'`.
fn starts_range(input: &TokenSlice<'_>) -> bool {
    let mut idx = 0;
    if matches!(
        input.peek_type(),
        Some(TokenType::Minus) | Some(TokenType::Plus)
    ) {
        idx = 1;
    }
    matches!(
        input.peek_nth(idx).map(|t| &t.token_type),
        Some(TokenType::Number(_))
    ) && matches!(
        input.peek_nth(idx + 1).map(|t| &t.token_type),
        Some(TokenType::Ellipsis)
    )
}

fn parse_signed_number(input: TokenSlice<'_>) -> PResult<'_, Spanned<NumberLiteralNode>> {
    let (input, sign) = match input.peek() {
        Some(token) if matches!(token.token_type, TokenType::Minus) => (input.advance(), Some(token)),
        Some(token) if matches!(token.token_type, TokenType::Plus) => (input.advance(), Some(token)),
        _ => (input, None),
    };
    let Some(token) = input.peek() else {
        return Err(ParserError::expected(input, "number"));
    };
    let TokenType::Number(value) = &token.token_type else {
        return Err(ParserError::expected(input, "number"));
    };

    let mut raw = String::new();
    let mut span = span_from_token(token);
    let mut value = *value;
    if let Some(sign_token) = sign {
        raw.push_str(sign_token.lexeme.as_str());
        span = span_from_token(sign_token).to(&span);
        if matches!(sign_token.token_type, TokenType::Minus) {
            value = -value;
        }
    }
    raw.push_str(token.lexeme.as_str());
    Ok((
        input.advance(),
        Spanned::new(NumberLiteralNode { value, raw }, span),
    ))
}

/// Parses a range literal. The only legal shapes are `start...end` and
/// `start...step...end`, with numeric (optionally signed) bounds.
pub fn parse_range(input: TokenSlice<'_>) -> PResult<'_, ExpressionNode> {
    let (input, start) = parse_signed_number(input)?;
    let (input, _) = take_token_if(|t| matches!(t, TokenType::Ellipsis), "'...'")(input)?;
    let (input, second) = parse_signed_number(input)?;

    let (input, step, end) = if matches!(input.peek_type(), Some(TokenType::Ellipsis)) {
        let (input, end) = parse_signed_number(input.advance())?;
        (input, Some(second), end)
    } else {
        (input, None, second)
    };

    let span = start.span.to(&end.span);
    Ok((
        input,
        ExpressionNode::Range(Spanned::new(RangeNode { start, step, end }, span)),
    ))
}

/// Parses a matrix literal. Cells are juxtaposed expressions; `;`
/// terminates every row but the last. Newlines inside the brackets are
/// not row separators.
pub fn parse_matrix(outer: TokenSlice<'_>) -> PResult<'_, ExpressionNode> {
    let (after_open, open) = take_token_if(|t| matches!(t, TokenType::LeftBracket), "'['")(outer)?;
    let mut input = after_open.deeper()?;

    let mut rows: Vec<MatrixRowNode> = Vec::new();
    let mut cells: Vec<ExpressionNode> = Vec::new();

    loop {
        input = input.skip_newlines();
        let Some(token) = input.peek() else {
            return Err(ParserError::unbalanced(input, "[", "]"));
        };
        match &token.token_type {
            TokenType::RightBracket => {
                if !cells.is_empty() {
                    rows.push(finish_row(&mut cells));
                } else if rows.is_empty() {
                    return Err(ParserError::failure(input, "at least one matrix cell"));
                } else {
                    return Err(ParserError::failure(input, "a matrix row after ';'"));
                }
                let span = span_from_token(open).to(&span_from_token(token));
                return Ok((
                    input.advance().at_depth_of(&outer),
                    ExpressionNode::Matrix(Spanned::new(MatrixNode { rows }, span)),
                ));
            }
            TokenType::Semicolon => {
                if cells.is_empty() {
                    return Err(ParserError::failure(input, "a matrix cell before ';'"));
                }
                rows.push(finish_row(&mut cells));
                input = input.advance();
            }
            _ => {
                let (rest, cell) = parse_expression(input)?;
                cells.push(cell);
                input = rest;
            }
        }
    }
}

fn finish_row(cells: &mut Vec<ExpressionNode>) -> MatrixRowNode {
    let first = cells.first().map(|c| c.span()).unwrap_or_default();
    let last = cells.last().map(|c| c.span()).unwrap_or_default();
    MatrixRowNode {
        cells: mem::take(cells),
        span: first.to(&last),
    }
}

/// Parses a call's argument list and builds the call node. Positional
/// arguments must precede keyword arguments.
pub(crate) fn parse_call<'a>(
    outer: TokenSlice<'a>,
    callee: ExpressionNode,
) -> PResult<'a, ExpressionNode> {
    let (after_open, _) = take_token_if(|t| matches!(t, TokenType::LeftParen), "'('")(outer)?;
    let mut input = after_open.deeper()?;

    let mut pos_args: Vec<ExpressionNode> = Vec::new();
    let mut keyword_args: Vec<KeywordArgNode> = Vec::new();

    loop {
        input = input.skip_newlines();
        let Some(token) = input.peek() else {
            return Err(ParserError::unbalanced(input, "(", ")"));
        };
        if matches!(token.token_type, TokenType::RightParen) {
            let span = callee.span().to(&span_from_token(token));
            return Ok((
                input.advance().at_depth_of(&outer),
                ExpressionNode::Call(Spanned::new(
                    Box::new(CallExpressionNode {
                        callee,
                        pos_args,
                        keyword_args,
                    }),
                    span,
                )),
            ));
        }

        let is_keyword = matches!(token.token_type, TokenType::Identifier(_))
            && matches!(
                input.peek_nth(1).map(|t| &t.token_type),
                Some(TokenType::Equal)
            );
        if is_keyword {
            let (rest, name) = parse_identifier(input)?;
            let (rest, _) = take_token_if(|t| matches!(t, TokenType::Equal), "'='")(rest)?;
            let (rest, value) = parse_expression(rest)?;
            let span = name.span.to(&value.span());
            keyword_args.push(KeywordArgNode { name, value, span });
            input = rest;
        } else {
            if !keyword_args.is_empty() {
                return Err(ParserError::failure(
                    input,
                    "keyword arguments after all positional arguments",
                ));
            }
            let (rest, arg) = parse_expression(input)?;
            pos_args.push(arg);
            input = rest;
        }

        input = input.skip_newlines();
        match input.peek_type() {
            Some(TokenType::Comma) => input = input.advance(),
            Some(TokenType::RightParen) => {}
            Some(_) => return Err(ParserError::failure(input, "',' or ')'")),
            None => return Err(ParserError::unbalanced(input, "(", ")")),
        }
    }
}

/// Parses a string literal from its segment tokens. Formatting snippets
/// re-enter the expression parser between `\{` and `\}`.
pub fn parse_string(outer: TokenSlice<'_>) -> PResult<'_, ExpressionNode> {
    let (mut input, start_token) =
        take_token_if(|t| matches!(t, TokenType::StringStart), "'\"'")(outer)?;
    let start_span = span_from_token(start_token);
    let mut segments: Vec<StringSegmentNode> = Vec::new();

    loop {
        let Some(token) = input.peek() else {
            return Err(ParserError::unbalanced(input, "\"", "\""));
        };
        let seg_span = span_from_token(token);
        match &token.token_type {
            TokenType::StringChars(text) => {
                segments.push(StringSegmentNode::Chars(Spanned::new(
                    text.as_str().to_string(),
                    seg_span,
                )));
                input = input.advance();
            }
            TokenType::EscapeSequence(value) => {
                segments.push(StringSegmentNode::Escape(Spanned::new(
                    EscapeSequenceNode {
                        value: *value,
                        raw: token.lexeme.as_str().to_string(),
                    },
                    seg_span,
                )));
                input = input.advance();
            }
            TokenType::UnicodeEscape { digits, value } => {
                segments.push(StringSegmentNode::Unicode(Spanned::new(
                    UnicodeEscapeNode {
                        hex_digits: digits.as_str().to_string(),
                        value: *value,
                    },
                    seg_span,
                )));
                input = input.advance();
            }
            TokenType::OctalEscape { digits, value } => {
                segments.push(StringSegmentNode::Octal(Spanned::new(
                    OctalEscapeNode {
                        digits: digits.as_str().to_string(),
                        value: *value,
                    },
                    seg_span,
                )));
                input = input.advance();
            }
            TokenType::FormatStart => {
                let inner = input.advance().deeper()?.skip_newlines();
                let (rest, expr) = parse_expression(inner)?;
                let rest = rest.skip_newlines();
                let Some(end_token) = rest.peek() else {
                    return Err(ParserError::unbalanced(rest, "\\{", "\\}"));
                };
                if !matches!(end_token.token_type, TokenType::FormatEnd) {
                    return Err(ParserError::failure(rest, "'\\}'"));
                }
                let span = seg_span.to(&span_from_token(end_token));
                segments.push(StringSegmentNode::Format(Spanned::new(
                    FormattingSnippetNode {
                        formatting_expr: expr,
                    },
                    span,
                )));
                input = rest.advance().at_depth_of(&input);
            }
            TokenType::StringEnd => {
                let span = start_span.to(&seg_span);
                return Ok((
                    input.advance(),
                    ExpressionNode::String(Spanned::new(StringLiteralNode { segments }, span)),
                ));
            }
            _ => return Err(ParserError::failure(input, "a string segment")),
        }
    }
}
