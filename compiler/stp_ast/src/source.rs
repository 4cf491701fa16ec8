//! Renders a syntax tree back to parseable source text.
//!
//! Output is normalized (one statement per line, single spaces around
//! binary operators) but structure-preserving: re-parsing the rendered text
//! yields a structurally identical tree. Parentheses are re-synthesized
//! from operator precedence rather than stored in the tree.

use crate::ast::*;

/// Renders a whole program.
pub fn program_to_source(program: &ProgramNode) -> String {
    let mut writer = SourceWriter::new();
    for stmt in &program.statements {
        writer.write_statement(stmt, 0);
        writer.out.push('\n');
    }
    writer.out
}

/// Renders a single expression.
pub fn expression_to_source(expr: &ExpressionNode) -> String {
    let mut writer = SourceWriter::new();
    writer.write_expression(expr, 0);
    writer.out
}

// Precedence ladder used for parenthesization. Binary classes sit at 1..=4
// (see BinaryOperator::precedence); `not` renders below them all, the tight
// prefixes above them, suffixes above those, and primaries at the top.
const PREC_NOT: u8 = 0;
const PREC_PREFIX: u8 = 5;
const PREC_SUFFIX: u8 = 6;
const PREC_PRIMARY: u8 = 7;

fn expression_precedence(expr: &ExpressionNode) -> u8 {
    match expr {
        ExpressionNode::Binary(n) => n.operator.precedence(),
        ExpressionNode::Unary(n) => {
            if n.operator == UnaryOperator::Not {
                PREC_NOT
            } else {
                PREC_PREFIX
            }
        }
        ExpressionNode::Suffix(_) => PREC_SUFFIX,
        _ => PREC_PRIMARY,
    }
}

struct SourceWriter {
    out: String,
}

impl SourceWriter {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str("    ");
        }
    }

    fn write_statement(&mut self, stmt: &StatementNode, level: usize) {
        self.indent(level);
        match stmt {
            StatementNode::Assignment(n) => {
                self.out.push_str(&n.name.name);
                self.out.push_str(" = ");
                self.write_expression(&n.value, 0);
            }
            StatementNode::SymbolDecl(n) => {
                self.out.push_str("sym ");
                self.out.push_str(&n.name.name);
            }
            StatementNode::If(n) => {
                self.out.push_str("if ");
                self.write_expression(&n.condition, 0);
                self.out.push(' ');
                self.write_block(&n.then_branch, level);
                for clause in &n.elseif_clauses {
                    self.out.push_str(" elseif ");
                    self.write_expression(&clause.condition, 0);
                    self.out.push(' ');
                    self.write_block(&clause.body, level);
                }
                if let Some(else_branch) = &n.else_branch {
                    self.out.push_str(" else ");
                    self.write_block(else_branch, level);
                }
            }
            StatementNode::While(n) => {
                self.out.push_str("while ");
                self.write_expression(&n.condition, 0);
                self.out.push(' ');
                self.write_block(&n.body, level);
            }
            StatementNode::ForIn(n) => {
                self.out.push_str("for ");
                self.out.push_str(&n.loop_var.name);
                self.out.push_str(" in ");
                self.write_expression(&n.loop_expr, 0);
                self.out.push(' ');
                self.write_block(&n.body, level);
            }
            StatementNode::FunctionDef(n) => {
                self.out.push_str("fn ");
                self.out.push_str(&n.name.name);
                self.out.push('(');
                let mut first = true;
                for param in &n.pos_params {
                    if !first {
                        self.out.push_str(", ");
                    }
                    first = false;
                    self.out.push_str(&param.name);
                }
                for param in &n.keyword_params {
                    if !first {
                        self.out.push_str(", ");
                    }
                    first = false;
                    self.out.push_str(&param.name.name);
                    self.out.push_str(" = ");
                    self.write_expression(&param.default, 0);
                }
                self.out.push_str(") ");
                self.write_block(&n.body, level);
            }
            StatementNode::Import(n) => {
                self.out.push_str("import ");
                self.out.push_str(&n.module.name);
            }
            StatementNode::Ret(n) => {
                self.out.push_str("ret ");
                self.write_expression(&n.value, 0);
            }
            StatementNode::Break(_) => self.out.push_str("break"),
            StatementNode::Cont(_) => self.out.push_str("cont"),
            StatementNode::Exit(_) => self.out.push_str("exit"),
            StatementNode::Comment(n) => self.out.push_str(&n.text),
            StatementNode::Expr(e) => self.write_expression(e, 0),
            StatementNode::Error(n) => {
                // Error nodes have no source form; keep a trace that
                // re-parses as trivia.
                self.out.push_str("# <error: ");
                self.out.push_str(&n.message);
                self.out.push('>');
            }
        }
    }

    fn write_block(&mut self, block: &BlockNode, level: usize) {
        self.out.push_str("{\n");
        for stmt in &block.statements {
            self.write_statement(stmt, level + 1);
            self.out.push('\n');
        }
        self.indent(level);
        self.out.push('}');
    }

    fn write_expression(&mut self, expr: &ExpressionNode, min_prec: u8) {
        let prec = expression_precedence(expr);
        if prec < min_prec {
            self.out.push('(');
            self.write_expression(expr, 0);
            self.out.push(')');
            return;
        }

        match expr {
            ExpressionNode::Identifier(n) => self.out.push_str(&n.name),
            ExpressionNode::Number(n) => self.out.push_str(&n.raw),
            ExpressionNode::String(n) => self.write_string(n),
            ExpressionNode::Matrix(n) => {
                self.out.push('[');
                for (i, row) in n.rows.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    for (j, cell) in row.cells.iter().enumerate() {
                        if j > 0 {
                            self.out.push(' ');
                        }
                        // Cells are delimited by juxtaposition only, so
                        // anything below a primary gets parentheses.
                        self.write_expression(cell, PREC_PRIMARY);
                    }
                    if i + 1 < n.rows.len() {
                        self.out.push(';');
                    }
                }
                self.out.push(']');
            }
            ExpressionNode::Range(n) => {
                self.out.push_str(&n.start.raw);
                self.out.push_str("...");
                if let Some(step) = &n.step {
                    self.out.push_str(&step.raw);
                    self.out.push_str("...");
                }
                self.out.push_str(&n.end.raw);
            }
            ExpressionNode::Binary(n) => {
                let op_prec = n.operator.precedence();
                let (left_min, right_min) = if n.operator.is_right_assoc() {
                    (op_prec + 1, op_prec)
                } else {
                    (op_prec, op_prec + 1)
                };
                self.write_expression(&n.left, left_min);
                self.out.push(' ');
                self.out.push_str(n.operator.as_str());
                self.out.push(' ');
                self.write_expression(&n.right, right_min);
            }
            ExpressionNode::Unary(n) => {
                self.out.push_str(n.operator.as_str());
                if n.operator == UnaryOperator::Not {
                    self.out.push(' ');
                    self.write_expression(&n.operand, PREC_NOT);
                } else {
                    self.write_expression(&n.operand, PREC_PREFIX);
                }
            }
            ExpressionNode::Suffix(n) => {
                self.write_expression(&n.value, PREC_SUFFIX);
                self.out.push_str(n.operator.as_str());
            }
            ExpressionNode::Call(n) => {
                self.write_expression(&n.callee, PREC_PRIMARY);
                self.out.push('(');
                let mut first = true;
                for arg in &n.pos_args {
                    if !first {
                        self.out.push_str(", ");
                    }
                    first = false;
                    self.write_expression(arg, 0);
                }
                for arg in &n.keyword_args {
                    if !first {
                        self.out.push_str(", ");
                    }
                    first = false;
                    self.out.push_str(&arg.name.name);
                    self.out.push_str(" = ");
                    self.write_expression(&arg.value, 0);
                }
                self.out.push(')');
            }
            ExpressionNode::Member(n) => {
                self.write_expression(&n.object, PREC_PRIMARY);
                self.out.push('.');
                self.out.push_str(&n.property.name);
            }
        }
    }

    fn write_string(&mut self, string: &StringLiteralNode) {
        self.out.push('"');
        for segment in &string.segments {
            match segment {
                StringSegmentNode::Chars(run) => self.out.push_str(run),
                StringSegmentNode::Escape(esc) => self.out.push_str(&esc.raw),
                StringSegmentNode::Unicode(esc) => {
                    self.out.push_str("\\x");
                    self.out.push_str(&esc.hex_digits);
                }
                StringSegmentNode::Octal(esc) => {
                    self.out.push('\\');
                    self.out.push_str(&esc.digits);
                }
                StringSegmentNode::Format(snippet) => {
                    self.out.push_str("\\{");
                    self.write_expression(&snippet.formatting_expr, 0);
                    self.out.push_str("\\}");
                }
            }
        }
        self.out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn num(raw: &str) -> ExpressionNode {
        ExpressionNode::Number(Spanned::new(
            NumberLiteralNode {
                value: raw.parse().unwrap(),
                raw: raw.to_string(),
            },
            Span::default(),
        ))
    }

    fn binary(left: ExpressionNode, op: BinaryOperator, right: ExpressionNode) -> ExpressionNode {
        ExpressionNode::Binary(Spanned::new(
            Box::new(BinaryExpressionNode {
                left,
                operator: op,
                right,
            }),
            Span::default(),
        ))
    }

    #[test]
    fn precedence_needs_no_parens() {
        // 1 + 2 * 3
        let expr = binary(
            num("1"),
            BinaryOperator::Add,
            binary(num("2"), BinaryOperator::Mul, num("3")),
        );
        assert_eq!(expression_to_source(&expr), "1 + 2 * 3");
    }

    #[test]
    fn parens_restore_overridden_precedence() {
        // (1 + 2) * 3
        let expr = binary(
            binary(num("1"), BinaryOperator::Add, num("2")),
            BinaryOperator::Mul,
            num("3"),
        );
        assert_eq!(expression_to_source(&expr), "(1 + 2) * 3");
    }

    #[test]
    fn right_assoc_pow_prints_left_parens_only() {
        // (a^b)^c needs parens; a^(b^c) does not
        let left_nested = binary(
            binary(num("2"), BinaryOperator::Pow, num("3")),
            BinaryOperator::Pow,
            num("4"),
        );
        assert_eq!(expression_to_source(&left_nested), "(2 ^ 3) ^ 4");

        let right_nested = binary(
            num("2"),
            BinaryOperator::Pow,
            binary(num("3"), BinaryOperator::Pow, num("4")),
        );
        assert_eq!(expression_to_source(&right_nested), "2 ^ 3 ^ 4");
    }

    #[test]
    fn negative_matrix_cells_are_parenthesized() {
        let matrix = ExpressionNode::Matrix(Spanned::new(
            MatrixNode {
                rows: vec![MatrixRowNode {
                    cells: vec![
                        num("1"),
                        ExpressionNode::Unary(Spanned::new(
                            Box::new(UnaryExpressionNode {
                                operator: UnaryOperator::Neg,
                                operand: num("2"),
                            }),
                            Span::default(),
                        )),
                    ],
                    span: Span::default(),
                }],
            },
            Span::default(),
        ));
        assert_eq!(expression_to_source(&matrix), "[1 (-2)]");
    }

    #[test]
    fn suffix_binds_tighter_than_prefix() {
        // -(a') prints without parens and still re-parses the same way
        let expr = ExpressionNode::Unary(Spanned::new(
            Box::new(UnaryExpressionNode {
                operator: UnaryOperator::Neg,
                operand: ExpressionNode::Suffix(Spanned::new(
                    Box::new(SuffixExpressionNode {
                        value: ExpressionNode::Identifier(Spanned::new(
                            IdentifierNode {
                                name: "a".to_string(),
                            },
                            Span::default(),
                        )),
                        operator: SuffixOperator::Transpose,
                    }),
                    Span::default(),
                )),
            }),
            Span::default(),
        ));
        assert_eq!(expression_to_source(&expr), "-a'");
    }
}
