// End-to-end acceptance tests: source text in, syntax tree out.

use pretty_assertions::assert_eq;
use stp_ast::ast::*;
use stp_lexer::LexError;
use stp_parser::{parse_source, StpError};
use tests::parse_ok;

fn single_expr(program: &ProgramNode) -> &ExpressionNode {
    assert_eq!(program.statements.len(), 1, "expected one statement");
    match &program.statements[0] {
        StatementNode::Expr(expr) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn arithmetic_precedence_end_to_end() {
    let program = parse_ok("a + b * c\n");
    let ExpressionNode::Binary(add) = single_expr(&program) else {
        panic!("expected binary expression");
    };
    assert_eq!(add.operator, BinaryOperator::Add);
    let ExpressionNode::Binary(mul) = &add.right else {
        panic!("expected a + (b * c)");
    };
    assert_eq!(mul.operator, BinaryOperator::Mul);
}

#[test]
fn power_chains_fold_rightwards() {
    let program = parse_ok("a ^ b ^ c\n");
    let ExpressionNode::Binary(outer) = single_expr(&program) else {
        panic!("expected binary expression");
    };
    assert!(matches!(&outer.left, ExpressionNode::Identifier(n) if n.name == "a"));
    assert!(matches!(&outer.right, ExpressionNode::Binary(_)));
}

#[test]
fn suffix_binds_tighter_than_prefix_minus() {
    let program = parse_ok("-a'\n");
    let ExpressionNode::Unary(neg) = single_expr(&program) else {
        panic!("expected unary expression");
    };
    assert_eq!(neg.operator, UnaryOperator::Neg);
    assert!(matches!(&neg.operand, ExpressionNode::Suffix(_)));
}

#[test]
fn matrix_shapes_round_trip() {
    let program = parse_ok("[1 2; 3 4]\n");
    let ExpressionNode::Matrix(matrix) = single_expr(&program) else {
        panic!("expected matrix");
    };
    assert_eq!(matrix.rows.len(), 2);
    assert!(matrix.rows.iter().all(|row| row.cells.len() == 2));

    let program = parse_ok("[1 2 3]\n");
    let ExpressionNode::Matrix(matrix) = single_expr(&program) else {
        panic!("expected matrix");
    };
    assert_eq!(matrix.rows.len(), 1);
    assert_eq!(matrix.rows[0].cells.len(), 3);
}

#[test]
fn ranges_have_two_legal_shapes() {
    let program = parse_ok("1...10\n");
    let ExpressionNode::Range(range) = single_expr(&program) else {
        panic!("expected range");
    };
    assert_eq!(range.start.value, 1.0);
    assert!(range.step.is_none());
    assert_eq!(range.end.value, 10.0);

    let program = parse_ok("1...2...10\n");
    let ExpressionNode::Range(range) = single_expr(&program) else {
        panic!("expected range");
    };
    assert_eq!(range.step.as_ref().map(|s| s.value), Some(2.0));
}

#[test]
fn interpolated_string_has_two_segments() {
    let program = parse_ok("\"x=\\{a+1\\}\"\n");
    let ExpressionNode::String(string) = single_expr(&program) else {
        panic!("expected string");
    };
    assert_eq!(string.segments.len(), 2);
    assert!(matches!(
        &string.segments[0],
        StringSegmentNode::Chars(run) if run.node == "x="
    ));
    let StringSegmentNode::Format(snippet) = &string.segments[1] else {
        panic!("expected formatting snippet");
    };
    let ExpressionNode::Binary(add) = &snippet.formatting_expr else {
        panic!("expected a + 1 inside the snippet");
    };
    assert_eq!(add.operator, BinaryOperator::Add);
}

#[test]
fn function_definition_with_mixed_parameters() {
    let program = parse_ok("fn f(a, b, c=1) { ret a }\n");
    let StatementNode::FunctionDef(def) = &program.statements[0] else {
        panic!("expected function definition");
    };
    let positional: Vec<&str> = def.pos_params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(positional, vec!["a", "b"]);
    assert_eq!(def.keyword_params.len(), 1);
    assert_eq!(def.keyword_params[0].name.name, "c");
}

#[test]
fn unterminated_string_is_a_typed_failure() {
    match parse_source("\"abc") {
        Err(StpError::Lex(LexError::UnterminatedString { location, .. })) => {
            // Points at end of input, not at the opening quote.
            assert_eq!(location.offset, 4);
        }
        other => panic!("expected unterminated-string failure, got {other:?}"),
    }
}

#[test]
fn a_small_program_parses_whole() {
    let source = "\
# gaussian sum\n\
sym n\n\
total = 0\n\
for i in 1...100 {\n\
    total = total + i\n\
}\n\
if total == 5050 {\n\
    msg = \"ok: \\{total\\}\"\n\
} else {\n\
    msg = \"wrong\"\n\
}\n\
fn scaled(m, factor=2) {\n\
    ret m .* factor\n\
}\n\
result = scaled([1 2; 3 4])'\n\
";
    let program = parse_ok(source);
    assert_eq!(program.statements.len(), 7);
}

#[test]
fn percentages_and_factorials_parse_in_context() {
    let program = parse_ok("x = 5! + 50% * rate\n");
    let StatementNode::Assignment(assign) = &program.statements[0] else {
        panic!("expected assignment");
    };
    assert!(matches!(&assign.value, ExpressionNode::Binary(_)));
}

#[test]
fn reparse_falls_back_to_a_full_parse() {
    let old = parse_ok("x = 1\n");
    let edit = stp_parser::SourceEdit {
        start: 4,
        old_end: 5,
        new_end: 6,
    };
    let new_program = stp_parser::reparse(&old, &edit, "x = 42\n").unwrap();
    let StatementNode::Assignment(assign) = &new_program.statements[0] else {
        panic!("expected assignment");
    };
    assert!(matches!(&assign.value, ExpressionNode::Number(n) if n.value == 42.0));
}
