use pretty_assertions::assert_eq;
use stp_ast::ast::StatementNode;

use crate::parser::{parse_source_recovering, Severity};

#[test]
fn clean_input_produces_no_diagnostics() {
    let outcome = parse_source_recovering("x = 1\ny = x + 2\n");
    assert!(outcome.is_clean());
    assert_eq!(outcome.program.statements.len(), 2);
}

#[test]
fn a_bad_statement_becomes_an_error_marker() {
    let outcome = parse_source_recovering("x = \ny = 2\n");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].severity, Severity::Error);
    assert_eq!(outcome.program.statements.len(), 2);
    assert!(matches!(
        &outcome.program.statements[0],
        StatementNode::Error(_)
    ));
    assert!(matches!(
        &outcome.program.statements[1],
        StatementNode::Assignment(n) if n.name.name == "y"
    ));
}

#[test]
fn recovery_continues_past_multiple_errors() {
    let outcome = parse_source_recovering("x = )\ny = 2\nz = ]\nw = 4\n");
    assert_eq!(outcome.diagnostics.len(), 2);
    let good: Vec<_> = outcome
        .program
        .statements
        .iter()
        .filter(|s| matches!(s, StatementNode::Assignment(_)))
        .collect();
    assert_eq!(good.len(), 2);
}

#[test]
fn skipped_input_is_not_dropped_silently() {
    let outcome = parse_source_recovering("x = oops ++ ;\ny = 2\n");
    let error_spans: Vec<_> = outcome
        .program
        .statements
        .iter()
        .filter_map(|s| match s {
            StatementNode::Error(e) => Some(e.span),
            _ => None,
        })
        .collect();
    assert!(!error_spans.is_empty());
    // The marker covers the skipped tokens.
    assert!(error_spans[0].end > error_spans[0].start);
}

#[test]
fn lexical_errors_surface_as_a_single_diagnostic() {
    let outcome = parse_source_recovering("x = $\n");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.program.statements.is_empty());
}

#[test]
fn stray_closing_brace_is_reported_and_skipped() {
    let outcome = parse_source_recovering("}\nx = 1\n");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome
        .program
        .statements
        .iter()
        .any(|s| matches!(s, StatementNode::Assignment(_))));
}
