//! Statement parsing: dispatch on the leading token, block handling, and
//! the two program-level drivers (fail-fast and recovering).

use stp_ast::ast::{
    AssignmentNode, BlockNode, CommentNode, ElseifClauseNode, ErrorNode, ForInNode,
    FunctionDefNode, IdentifierNode, IfNode, ImportNode, KeywordParamNode, ProgramNode, RetNode,
    Span, Spanned, StatementNode, SymbolDeclNode, WhileNode,
};
use stp_lexer::TokenType;

use crate::parser::diagnostics::{diagnostic_from_err, Diagnostic};
use crate::parser::expressions::{parse_expression, parse_identifier};
use crate::parser::{
    ends_statement, span_from_token, take_token_if, ParserError, PResult, TokenSlice,
};

/// Parses one statement; the leading token picks the branch.
pub fn parse_statement(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    let Some(token) = input.peek() else {
        return Err(ParserError::expected(input, "a statement"));
    };
    match &token.token_type {
        TokenType::Sym => parse_symbol_decl(input),
        TokenType::If => parse_if_statement(input),
        TokenType::While => parse_while_statement(input),
        TokenType::For => parse_for_in_statement(input),
        TokenType::Fn => parse_function_definition(input),
        TokenType::Import => parse_import_statement(input),
        TokenType::Ret => parse_ret_statement(input),
        TokenType::Break => Ok((
            input.advance(),
            StatementNode::Break(span_from_token(token)),
        )),
        TokenType::Cont => Ok((input.advance(), StatementNode::Cont(span_from_token(token)))),
        TokenType::Exit => Ok((input.advance(), StatementNode::Exit(span_from_token(token)))),
        TokenType::Comment(text) => Ok((
            input.advance(),
            StatementNode::Comment(Spanned::new(
                CommentNode {
                    text: text.as_str().to_string(),
                },
                span_from_token(token),
            )),
        )),
        TokenType::Identifier(_)
            if matches!(
                input.peek_nth(1).map(|t| &t.token_type),
                Some(TokenType::Equal)
            ) =>
        {
            parse_assignment_statement(input)
        }
        _ => {
            let (rest, expr) = parse_expression(input)?;
            Ok((rest, StatementNode::Expr(expr)))
        }
    }
}

/// Parses `name = expr`.
pub fn parse_assignment_statement(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    let (input, name) = parse_identifier(input)?;
    let (input, _) = take_token_if(|t| matches!(t, TokenType::Equal), "'='")(input)?;
    let (input, value) = parse_expression(input)?;
    let span = name.span.to(&value.span());
    Ok((
        input,
        StatementNode::Assignment(Spanned::new(Box::new(AssignmentNode { name, value }), span)),
    ))
}

/// Parses `sym name`.
pub fn parse_symbol_decl(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    let (input, sym_token) = take_token_if(|t| matches!(t, TokenType::Sym), "'sym'")(input)?;
    let (input, name) = parse_identifier(input)?;
    let span = span_from_token(sym_token).to(&name.span);
    Ok((
        input,
        StatementNode::SymbolDecl(Spanned::new(SymbolDeclNode { name }, span)),
    ))
}

/// Parses `import name`.
pub fn parse_import_statement(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    let (input, import_token) =
        take_token_if(|t| matches!(t, TokenType::Import), "'import'")(input)?;
    let (input, module) = parse_identifier(input)?;
    let span = span_from_token(import_token).to(&module.span);
    Ok((
        input,
        StatementNode::Import(Spanned::new(ImportNode { module }, span)),
    ))
}

/// Parses `ret expr`. The expression is mandatory.
pub fn parse_ret_statement(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    let (input, ret_token) = take_token_if(|t| matches!(t, TokenType::Ret), "'ret'")(input)?;
    let (input, value) = parse_expression(input)?;
    let span = span_from_token(ret_token).to(&value.span());
    Ok((
        input,
        StatementNode::Ret(Spanned::new(Box::new(RetNode { value }), span)),
    ))
}

/// Parses an `if` chain: the `if` clause, zero or more `elseif` clauses,
/// then at most one `else`. An `elseif` after `else` is rejected.
pub fn parse_if_statement(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    let (input, if_token) = take_token_if(|t| matches!(t, TokenType::If), "'if'")(input)?;
    let (input, condition) = parse_expression(input)?;
    let (mut input, then_branch) = parse_block(input)?;

    let mut elseif_clauses = Vec::new();
    while let Some(elseif_token) = input.peek() {
        if !matches!(elseif_token.token_type, TokenType::Elseif) {
            break;
        }
        let elseif_span = span_from_token(elseif_token);
        let (rest, condition) = parse_expression(input.advance())?;
        let (rest, body) = parse_block(rest)?;
        let span = elseif_span.to(&body.span);
        elseif_clauses.push(ElseifClauseNode {
            condition,
            body,
            span,
        });
        input = rest;
    }

    let mut else_branch = None;
    if matches!(input.peek_type(), Some(TokenType::Else)) {
        let (rest, body) = parse_block(input.advance())?;
        if matches!(rest.peek_type(), Some(TokenType::Elseif)) {
            return Err(ParserError::failure(
                rest,
                "end of if-chain ('elseif' cannot follow 'else')",
            ));
        }
        else_branch = Some(body);
        input = rest;
    }

    let end_span = else_branch
        .as_ref()
        .map(|b| b.span)
        .or_else(|| elseif_clauses.last().map(|c| c.span))
        .unwrap_or(then_branch.span);
    let span = span_from_token(if_token).to(&end_span);
    Ok((
        input,
        StatementNode::If(Spanned::new(
            Box::new(IfNode {
                condition,
                then_branch,
                elseif_clauses,
                else_branch,
            }),
            span,
        )),
    ))
}

/// Parses `while expr { ... }`.
pub fn parse_while_statement(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    log::trace!("parsing while statement");
    let (input, while_token) = take_token_if(|t| matches!(t, TokenType::While), "'while'")(input)?;
    let (input, condition) = parse_expression(input)?;
    let (input, body) = parse_block(input)?;
    let span = span_from_token(while_token).to(&body.span);
    Ok((
        input,
        StatementNode::While(Spanned::new(Box::new(WhileNode { condition, body }), span)),
    ))
}

/// Parses `for x in expr { ... }`.
pub fn parse_for_in_statement(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    let (input, for_token) = take_token_if(|t| matches!(t, TokenType::For), "'for'")(input)?;
    let (input, loop_var) = parse_identifier(input)?;
    let (input, _) = take_token_if(|t| matches!(t, TokenType::In), "'in'")(input)?;
    let (input, loop_expr) = parse_expression(input)?;
    let (input, body) = parse_block(input)?;
    let span = span_from_token(for_token).to(&body.span);
    Ok((
        input,
        StatementNode::ForIn(Spanned::new(
            Box::new(ForInNode {
                loop_var,
                loop_expr,
                body,
            }),
            span,
        )),
    ))
}

/// Parses `fn name(params) { ... }`.
///
/// The parameter list is positional names, then optionally a comma and
/// `name = default` keyword parameters. A keyword-only list may be written
/// with the grammar's leading comma (`fn f(, k=1)`) or without it.
pub fn parse_function_definition(input: TokenSlice<'_>) -> PResult<'_, StatementNode> {
    let (input, fn_token) = take_token_if(|t| matches!(t, TokenType::Fn), "'fn'")(input)?;
    let (input, name) = parse_identifier(input)?;
    let (after_open, _) = take_token_if(|t| matches!(t, TokenType::LeftParen), "'('")(input)?;
    let mut params_input = after_open.deeper()?;

    let mut pos_params: Vec<Spanned<IdentifierNode>> = Vec::new();
    let mut keyword_params: Vec<KeywordParamNode> = Vec::new();

    // The keyword-only form starts with the separator of an empty
    // positional list.
    params_input = params_input.skip_newlines();
    if matches!(params_input.peek_type(), Some(TokenType::Comma)) {
        params_input = params_input.advance();
    }

    let rest = loop {
        params_input = params_input.skip_newlines();
        let Some(token) = params_input.peek() else {
            return Err(ParserError::unbalanced(params_input, "(", ")"));
        };
        match &token.token_type {
            TokenType::RightParen => break params_input.advance(),
            TokenType::Identifier(_) => {
                let is_keyword = matches!(
                    params_input.peek_nth(1).map(|t| &t.token_type),
                    Some(TokenType::Equal)
                );
                if is_keyword {
                    let (after_name, param_name) = parse_identifier(params_input)?;
                    let (after_eq, _) =
                        take_token_if(|t| matches!(t, TokenType::Equal), "'='")(after_name)?;
                    let (after_default, default) = parse_expression(after_eq)?;
                    let span = param_name.span.to(&default.span());
                    keyword_params.push(KeywordParamNode {
                        name: param_name,
                        default,
                        span,
                    });
                    params_input = after_default;
                } else {
                    if !keyword_params.is_empty() {
                        return Err(ParserError::failure(
                            params_input,
                            "keyword parameters after all positional parameters",
                        ));
                    }
                    let (after_name, param_name) = parse_identifier(params_input)?;
                    pos_params.push(param_name);
                    params_input = after_name;
                }
            }
            _ => return Err(ParserError::failure(params_input, "a parameter name or ')'")),
        }

        params_input = params_input.skip_newlines();
        match params_input.peek_type() {
            Some(TokenType::Comma) => params_input = params_input.advance(),
            Some(TokenType::RightParen) => {}
            Some(_) => return Err(ParserError::failure(params_input, "',' or ')'")),
            None => return Err(ParserError::unbalanced(params_input, "(", ")")),
        }
    };

    let (input, body) = parse_block(rest.at_depth_of(&input))?;
    let span = span_from_token(fn_token).to(&body.span);
    Ok((
        input,
        StatementNode::FunctionDef(Spanned::new(
            Box::new(FunctionDefNode {
                name,
                pos_params,
                keyword_params,
                body,
            }),
            span,
        )),
    ))
}

/// Parses a `{ ... }` statement group. Statements are separated by
/// newlines or `;`, both optional before the closing brace.
pub fn parse_block(outer: TokenSlice<'_>) -> PResult<'_, BlockNode> {
    let (after_open, open) = take_token_if(|t| matches!(t, TokenType::LeftBrace), "'{'")(outer)?;
    let mut input = after_open.deeper()?;
    let mut statements = Vec::new();

    loop {
        input = input.skip_separators();
        let Some(token) = input.peek() else {
            return Err(ParserError::unbalanced(input, "{", "}"));
        };
        if matches!(token.token_type, TokenType::RightBrace) {
            let span = span_from_token(open).to(&span_from_token(token));
            return Ok((
                input.advance().at_depth_of(&outer),
                BlockNode { statements, span },
            ));
        }

        let (rest, stmt) = parse_statement(input)?;
        statements.push(stmt);
        match rest.peek_type() {
            Some(tt) if ends_statement(tt) => input = rest,
            None => input = rest,
            Some(_) => {
                return Err(ParserError::expected(
                    rest,
                    "a newline, ';', or '}' after the statement",
                ))
            }
        }
    }
}

fn program_span(input: &TokenSlice<'_>) -> Span {
    match (input.first(), input.peek_nth(input.len().saturating_sub(1))) {
        (Some(first), Some(last)) => span_from_token(first).to(&span_from_token(last)),
        _ => Span::default(),
    }
}

/// Parses a whole token stream into a program, failing fast.
pub fn parse_program(input: TokenSlice<'_>) -> PResult<'_, ProgramNode> {
    let span = program_span(&input);
    let mut input = input;
    let mut statements = Vec::new();

    loop {
        input = input.skip_separators();
        if input.is_empty() {
            break;
        }
        if matches!(input.peek_type(), Some(TokenType::RightBrace)) {
            return Err(ParserError::unbalanced(input, "}", "{"));
        }
        let (rest, stmt) = parse_statement(input)?;
        statements.push(stmt);
        match rest.peek_type() {
            None => input = rest,
            Some(TokenType::RightBrace) => {
                return Err(ParserError::unbalanced(rest, "}", "{"));
            }
            Some(tt) if ends_statement(tt) => input = rest,
            Some(_) => {
                return Err(ParserError::expected(
                    rest,
                    "a newline or ';' after the statement",
                ))
            }
        }
    }

    Ok((input, ProgramNode { statements, span }))
}

/// Parses a whole token stream with statement-level recovery: each failed
/// statement becomes a diagnostic plus an error-marker node, and parsing
/// resumes at the next separator.
pub fn parse_program_recovering(input: TokenSlice<'_>) -> (ProgramNode, Vec<Diagnostic>) {
    let span = program_span(&input);
    let mut input = input;
    let mut statements = Vec::new();
    let mut diagnostics = Vec::new();

    loop {
        input = input.skip_separators();
        if input.is_empty() {
            break;
        }
        if matches!(input.peek_type(), Some(TokenType::RightBrace)) {
            let diag = Diagnostic::at_span(
                input.first().map(span_from_token).unwrap_or_default(),
                "unbalanced delimiters: '}' without a matching '{'",
            );
            diagnostics.push(diag.clone());
            let (rest, error_stmt) = skip_to_separator(input, diag.message);
            statements.push(error_stmt);
            input = rest;
            continue;
        }
        match parse_statement(input) {
            Ok((rest, stmt)) => {
                statements.push(stmt);
                match rest.peek_type() {
                    None => input = rest,
                    Some(tt) if ends_statement(tt) && !matches!(tt, TokenType::RightBrace) => {
                        input = rest
                    }
                    Some(_) => {
                        let diag = Diagnostic::at_span(
                            rest.first().map(span_from_token).unwrap_or_default(),
                            "expected a newline or ';' after the statement",
                        );
                        diagnostics.push(diag.clone());
                        let (rest, error_stmt) = skip_to_separator(rest, diag.message);
                        statements.push(error_stmt);
                        input = rest;
                    }
                }
            }
            Err(err) => {
                let diag = diagnostic_from_err(&err);
                diagnostics.push(diag.clone());
                let (rest, error_stmt) = skip_to_separator(input, diag.message);
                statements.push(error_stmt);
                input = rest;
            }
        }
    }

    (ProgramNode { statements, span }, diagnostics)
}

/// Consumes at least one token, then everything up to the next statement
/// separator, and wraps the skipped range in an error-marker statement.
fn skip_to_separator(input: TokenSlice<'_>, message: String) -> (TokenSlice<'_>, StatementNode) {
    let start = input.first().map(span_from_token).unwrap_or_default();
    let mut end = start;
    let mut rest = input;
    let mut skipped = 0usize;
    while let Some(token) = rest.peek() {
        if skipped > 0 && matches!(token.token_type, TokenType::Newline | TokenType::Semicolon) {
            break;
        }
        end = span_from_token(token);
        rest = rest.advance();
        skipped += 1;
    }
    (
        rest,
        StatementNode::Error(Spanned::new(ErrorNode { message }, start.to(&end))),
    )
}
