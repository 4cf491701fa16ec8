use pretty_assertions::assert_eq;
use stp_ast::ast::*;

use crate::parser::test_utils::{stmt, tokenize};
use crate::parser::{parse_source, statements, StpError, TokenSlice};

#[test]
fn assignment_with_and_without_semicolon() {
    for source in ["x = 1 + 2", "x = 1 + 2;"] {
        let parsed = stmt(source);
        let StatementNode::Assignment(n) = &parsed else {
            panic!("expected assignment for {source}");
        };
        assert_eq!(n.name.name, "x");
        assert!(matches!(&n.value, ExpressionNode::Binary(_)));
    }
}

#[test]
fn symbol_declaration() {
    let parsed = stmt("sym velocity");
    let StatementNode::SymbolDecl(n) = &parsed else {
        panic!("expected symbol declaration");
    };
    assert_eq!(n.name.name, "velocity");
}

#[test]
fn import_statement() {
    let parsed = stmt("import linalg");
    let StatementNode::Import(n) = &parsed else {
        panic!("expected import");
    };
    assert_eq!(n.module.name, "linalg");
}

#[test]
fn ret_requires_an_expression() {
    let parsed = stmt("ret x + 1");
    assert!(matches!(&parsed, StatementNode::Ret(_)));

    let tokens = tokenize("ret");
    assert!(statements::parse_statement(TokenSlice::new(&tokens)).is_err());
}

#[test]
fn bare_keywords_parse_alone() {
    assert!(matches!(stmt("break"), StatementNode::Break(_)));
    assert!(matches!(stmt("cont"), StatementNode::Cont(_)));
    assert!(matches!(stmt("exit"), StatementNode::Exit(_)));
}

#[test]
fn if_elseif_else_chain() {
    let source = "if a { x = 1 } elseif b { x = 2 } elseif c { x = 3 } else { x = 4 }";
    let parsed = stmt(source);
    let StatementNode::If(n) = &parsed else {
        panic!("expected if statement");
    };
    assert_eq!(n.elseif_clauses.len(), 2);
    assert!(n.else_branch.is_some());
    assert_eq!(n.then_branch.statements.len(), 1);
}

#[test]
fn elseif_after_else_is_rejected() {
    let source = "if a { x = 1 } else { x = 2 } elseif b { x = 3 }";
    let tokens = tokenize(source);
    assert!(statements::parse_statement(TokenSlice::new(&tokens)).is_err());
}

#[test]
fn while_loop_with_flow_control() {
    let source = "while i < 10 {\n    i = i + 1\n    if i == 5 { break }\n    cont\n}";
    let parsed = stmt(source);
    let StatementNode::While(n) = &parsed else {
        panic!("expected while loop");
    };
    assert!(matches!(&n.condition, ExpressionNode::Binary(_)));
    assert_eq!(n.body.statements.len(), 3);
}

#[test]
fn for_in_loop_over_a_range() {
    let parsed = stmt("for i in 1...10 { total = total + i }");
    let StatementNode::ForIn(n) = &parsed else {
        panic!("expected for-in loop");
    };
    assert_eq!(n.loop_var.name, "i");
    assert!(matches!(&n.loop_expr, ExpressionNode::Range(_)));
    assert_eq!(n.body.statements.len(), 1);
}

#[test]
fn function_definition_with_mixed_parameters() {
    // The trailing statement needs no newline before '}'
    let parsed = stmt("fn f(a, b, c=1) { ret a }");
    let StatementNode::FunctionDef(n) = &parsed else {
        panic!("expected function definition");
    };
    assert_eq!(n.name.name, "f");
    assert_eq!(
        n.pos_params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
    assert_eq!(n.keyword_params.len(), 1);
    assert_eq!(n.keyword_params[0].name.name, "c");
    assert!(matches!(
        &n.keyword_params[0].default,
        ExpressionNode::Number(v) if v.value == 1.0
    ));
    assert_eq!(n.body.statements.len(), 1);
}

#[test]
fn keyword_only_parameters_allow_the_leading_comma_form() {
    for source in ["fn f(, k=1) { ret k }", "fn f(k=1) { ret k }"] {
        let parsed = stmt(source);
        let StatementNode::FunctionDef(n) = &parsed else {
            panic!("expected function definition for {source}");
        };
        assert!(n.pos_params.is_empty());
        assert_eq!(n.keyword_params.len(), 1);
    }
}

#[test]
fn positional_parameter_after_keyword_parameter_is_rejected() {
    let tokens = tokenize("fn f(a=1, b) { ret b }");
    assert!(statements::parse_statement(TokenSlice::new(&tokens)).is_err());
}

#[test]
fn comments_become_trivia_statements() {
    let program = parse_source("# leading note\nx = 1 # trailing note\n").unwrap();
    let kinds: Vec<_> = program
        .statements
        .iter()
        .map(|s| std::mem::discriminant(s))
        .collect();
    assert_eq!(program.statements.len(), 3);
    assert!(matches!(&program.statements[0], StatementNode::Comment(c) if c.text == "# leading note"));
    assert!(matches!(&program.statements[1], StatementNode::Assignment(_)));
    assert!(matches!(&program.statements[2], StatementNode::Comment(_)));
    assert_eq!(kinds.len(), 3);
}

#[test]
fn statements_need_a_separator() {
    assert!(parse_source("x = 1 y = 2").is_err());
    assert!(parse_source("x = 1\ny = 2").is_ok());
    assert!(parse_source("x = 1; y = 2").is_ok());
}

#[test]
fn stray_closing_brace_is_unbalanced() {
    match parse_source("x = 1\n}") {
        Err(StpError::UnbalancedDelimiter { .. }) => {}
        other => panic!("expected unbalanced-delimiter error, got {other:?}"),
    }
}

#[test]
fn unclosed_block_is_unbalanced() {
    match parse_source("while a { x = 1") {
        Err(StpError::UnbalancedDelimiter { .. }) => {}
        other => panic!("expected unbalanced-delimiter error, got {other:?}"),
    }
}

#[test]
fn line_continuations_join_statements() {
    let program = parse_source("x = 1 + \\\n    2\n").unwrap();
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn semicolons_are_pure_terminator_sugar() {
    let plain = parse_source("x = 1\ny = 2\n").unwrap();
    let sugared = parse_source("x = 1;\ny = 2;\n").unwrap();
    assert_eq!(plain.statements, sugared.statements);
}
