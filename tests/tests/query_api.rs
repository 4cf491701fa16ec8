// The generic field-table surface consumed by downstream tools.

use pretty_assertions::assert_eq;
use stp_ast::ast::*;
use stp_ast::query::{FieldName, NodeKind, NodeRef, SyntaxNode};
use tests::parse_ok;

#[test]
fn statement_kinds_use_grammar_spellings() {
    let program = parse_ok("sym x\nwhile a { break }\nfor i in 1...3 { cont }\n");
    let kinds: Vec<&str> = program
        .statements
        .iter()
        .map(|s| s.kind().as_str())
        .collect();
    assert_eq!(
        kinds,
        vec!["symbol_decl_statement", "while_stmt", "for_in_stmt"]
    );
}

#[test]
fn sym_name_field_resolves() {
    let program = parse_ok("sym velocity\n");
    let stmt = &program.statements[0];
    let Some(NodeRef::Ident(name)) = stmt.field(FieldName::SymName) else {
        panic!("expected sym_name field");
    };
    assert_eq!(name.name, "velocity");
}

#[test]
fn loop_fields_resolve_for_both_loop_forms() {
    let program = parse_ok("while a < 3 { x = 1 }\nfor i in rows { x = 2 }\n");

    let while_stmt = &program.statements[0];
    assert!(matches!(
        while_stmt.field(FieldName::LoopExpr),
        Some(NodeRef::Expr(ExpressionNode::Binary(_)))
    ));
    assert!(while_stmt.field(FieldName::LoopVar).is_none());

    let for_stmt = &program.statements[1];
    let Some(NodeRef::Ident(var)) = for_stmt.field(FieldName::LoopVar) else {
        panic!("expected loop_var field");
    };
    assert_eq!(var.name, "i");
    assert!(matches!(
        for_stmt.field(FieldName::LoopExpr),
        Some(NodeRef::Expr(ExpressionNode::Identifier(_)))
    ));
}

#[test]
fn function_definition_fields_resolve() {
    let program = parse_ok("fn f(a, b, c=1) { ret a }\n");
    let def = &program.statements[0];
    assert_eq!(def.kind(), NodeKind::FunctionDefinition);

    let Some(NodeRef::Ident(name)) = def.field(FieldName::FnName) else {
        panic!("expected fn_name field");
    };
    assert_eq!(name.name, "f");

    let Some(NodeRef::Idents(pos)) = def.field(FieldName::PosArgs) else {
        panic!("expected pos_args field");
    };
    assert_eq!(pos.len(), 2);

    let Some(NodeRef::KeywordParams(kw)) = def.field(FieldName::KeywordArgs) else {
        panic!("expected keyword_args field");
    };
    assert_eq!(kw.len(), 1);
    let Some(NodeRef::Ident(kw_name)) = kw[0].field(FieldName::ArgumentName) else {
        panic!("expected argument_name field");
    };
    assert_eq!(kw_name.name, "c");

    assert!(matches!(
        def.field(FieldName::FnBody),
        Some(NodeRef::Block(_))
    ));
}

#[test]
fn range_fields_resolve() {
    let program = parse_ok("r = 1...2...10\n");
    let StatementNode::Assignment(assign) = &program.statements[0] else {
        panic!("expected assignment");
    };
    let range = &assign.value;
    assert_eq!(range.kind(), NodeKind::RangeExpression);
    let Some(NodeRef::Number(start)) = range.field(FieldName::Start) else {
        panic!("expected start field");
    };
    assert_eq!(start.value, 1.0);
    let Some(NodeRef::Number(step)) = range.field(FieldName::Step) else {
        panic!("expected step field");
    };
    assert_eq!(step.value, 2.0);
    let Some(NodeRef::Number(end)) = range.field(FieldName::End) else {
        panic!("expected end field");
    };
    assert_eq!(end.value, 10.0);

    let no_step = parse_ok("r = 1...10\n");
    let StatementNode::Assignment(assign) = &no_step.statements[0] else {
        panic!("expected assignment");
    };
    assert!(assign.value.field(FieldName::Step).is_none());
}

#[test]
fn operator_fields_expose_spellings() {
    let program = parse_ok("x = a .* b\ny = -c\nz = d'\n");
    let values: Vec<&ExpressionNode> = program
        .statements
        .iter()
        .map(|s| match s {
            StatementNode::Assignment(a) => &a.value,
            other => panic!("expected assignment, got {other:?}"),
        })
        .collect();

    assert!(matches!(
        values[0].field(FieldName::Operator),
        Some(NodeRef::Token(".*"))
    ));
    assert!(matches!(
        values[1].field(FieldName::UnaryOp),
        Some(NodeRef::Token("-"))
    ));
    assert!(matches!(
        values[2].field(FieldName::Operator),
        Some(NodeRef::Token("'"))
    ));
}

#[test]
fn string_fields_reach_the_snippet_expression() {
    let program = parse_ok("s = \"v=\\{a + 1\\} u\\x0041\"\n");
    let StatementNode::Assignment(assign) = &program.statements[0] else {
        panic!("expected assignment");
    };
    let Some(NodeRef::Segments(segments)) = assign.value.field(FieldName::StringChars) else {
        panic!("expected string_chars field");
    };
    assert_eq!(segments.len(), 4);

    let snippet = &segments[1];
    assert_eq!(snippet.kind(), NodeKind::FormattingSnippet);
    assert!(matches!(
        snippet.field(FieldName::FormattingExpr),
        Some(NodeRef::Expr(ExpressionNode::Binary(_)))
    ));

    let unicode = &segments[3];
    assert_eq!(unicode.kind(), NodeKind::UnicodeEscape);
    assert!(matches!(
        unicode.field(FieldName::HexDigits),
        Some(NodeRef::Token("0041"))
    ));
}

#[test]
fn call_fields_split_argument_kinds() {
    let program = parse_ok("x = plot(data, 1, style = m)\n");
    let StatementNode::Assignment(assign) = &program.statements[0] else {
        panic!("expected assignment");
    };
    let call = &assign.value;
    assert_eq!(call.kind(), NodeKind::FunctionCall);
    let Some(NodeRef::Exprs(pos)) = call.field(FieldName::PosArgs) else {
        panic!("expected pos_args field");
    };
    assert_eq!(pos.len(), 2);
    let Some(NodeRef::KeywordArgs(kw)) = call.field(FieldName::KeywordArgs) else {
        panic!("expected keyword_args field");
    };
    assert_eq!(kw.len(), 1);
    assert_eq!(kw[0].name.name, "style");
}

#[test]
fn children_walk_the_whole_tree() {
    let program = parse_ok("if a { x = 1 } elseif b { x = 2 } else { x = 3 }\n");
    let if_stmt = &program.statements[0];
    let children = if_stmt.children();
    // condition, then-block, one elseif clause, else-block
    assert_eq!(children.len(), 4);
    assert!(matches!(children[2], NodeRef::Elseif(_)));
}

#[test]
fn leaf_text_is_exposed() {
    let program = parse_ok("total = 1.50\n# note\n");
    let StatementNode::Assignment(assign) = &program.statements[0] else {
        panic!("expected assignment");
    };
    assert_eq!(assign.value.text(), Some("1.50"));
    assert_eq!(program.statements[1].text(), Some("# note"));
}
