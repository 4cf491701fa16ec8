//! The generic query surface over the syntax tree.
//!
//! Downstream tools address nodes by a kind tag, ordered children, and a
//! small table of named fields. The field spellings returned by
//! [`FieldName::as_str`] are a stable public vocabulary; renaming one is a
//! breaking interface change.

use crate::ast::*;

/// The kind tag of a syntax node. `as_str` spellings follow the grammar's
/// node names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// The root node.
    SourceFile,
    /// `name = expr`
    Assignment,
    /// `sym name`
    SymbolDeclStatement,
    /// `if`/`elseif`/`else`
    IfElseStmt,
    /// One `elseif` clause.
    ElseifClause,
    /// `while` loop.
    WhileStmt,
    /// `for ... in` loop.
    ForInStmt,
    /// `fn` definition.
    FunctionDefinition,
    /// `import` statement.
    ImportStatement,
    /// `ret` statement.
    ReturnStmt,
    /// `break`
    Break,
    /// `cont`
    Cont,
    /// `exit`
    Exit,
    /// A comment kept as trivia.
    Comment,
    /// A bare expression statement.
    ExpressionStatement,
    /// A recovery marker.
    Error,
    /// A `{ ... }` statement group.
    StmtGroup,
    /// An identifier.
    Identifier,
    /// A numeric literal.
    Number,
    /// A string literal.
    String,
    /// A literal character run inside a string.
    StringChars,
    /// A two-character escape.
    EscapeSequence,
    /// A `\x` escape.
    UnicodeEscape,
    /// A three-digit octal escape.
    OctalEscape,
    /// A `\{ ... \}` snippet.
    FormattingSnippet,
    /// A matrix literal.
    Matrix,
    /// One matrix row.
    MatrixRow,
    /// A range literal.
    RangeExpression,
    /// A binary operator application.
    BinaryExpression,
    /// A prefix operator application.
    UnaryExpression,
    /// A postfix operator application.
    SuffixExpression,
    /// A function call.
    FunctionCall,
    /// A member access.
    MemberAccess,
    /// A `name = value` call argument.
    KeywordArgument,
    /// A `name = default` parameter.
    KeywordParameter,
}

impl NodeKind {
    /// The kind's grammar-facing spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::SourceFile => "source_file",
            NodeKind::Assignment => "assignment",
            NodeKind::SymbolDeclStatement => "symbol_decl_statement",
            NodeKind::IfElseStmt => "if_else_stmt",
            NodeKind::ElseifClause => "elseif_clause",
            NodeKind::WhileStmt => "while_stmt",
            NodeKind::ForInStmt => "for_in_stmt",
            NodeKind::FunctionDefinition => "function_definition",
            NodeKind::ImportStatement => "import_statement",
            NodeKind::ReturnStmt => "return_stmt",
            NodeKind::Break => "break",
            NodeKind::Cont => "cont",
            NodeKind::Exit => "exit",
            NodeKind::Comment => "comment",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::Error => "ERROR",
            NodeKind::StmtGroup => "stmt_group",
            NodeKind::Identifier => "identifier",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::StringChars => "string_chars",
            NodeKind::EscapeSequence => "escape_sequence",
            NodeKind::UnicodeEscape => "unicode_escape",
            NodeKind::OctalEscape => "octal_escape",
            NodeKind::FormattingSnippet => "formatting_snippet",
            NodeKind::Matrix => "matrix",
            NodeKind::MatrixRow => "matrix_row",
            NodeKind::RangeExpression => "range_expression",
            NodeKind::BinaryExpression => "binary_expression",
            NodeKind::UnaryExpression => "unary_expression",
            NodeKind::SuffixExpression => "suffix_expression",
            NodeKind::FunctionCall => "function_call",
            NodeKind::MemberAccess => "identifier_or_member_access",
            NodeKind::KeywordArgument => "keyword_argument",
            NodeKind::KeywordParameter => "keyword_parameter",
        }
    }
}

/// A named field. The spellings are the stable query vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldName {
    /// The declared symbol in `sym name`.
    SymName,
    /// The returned expression of `ret`.
    RetExpr,
    /// The loop variable of `for ... in`.
    LoopVar,
    /// The loop condition (`while`) or iterated expression (`for ... in`).
    LoopExpr,
    /// The callee of a call, or the name of a function definition.
    FnName,
    /// The body of a function definition.
    FnBody,
    /// Positional arguments or parameters.
    PosArgs,
    /// Keyword arguments or parameters.
    KeywordArgs,
    /// The name of a keyword argument or parameter.
    ArgumentName,
    /// The first value of a range.
    Start,
    /// The increment of a range.
    Step,
    /// The last value of a range.
    End,
    /// The spelling of a binary or suffix operator.
    Operator,
    /// The spelling of a prefix operator.
    UnaryOp,
    /// The segments of a string literal.
    StringChars,
    /// The embedded expression of a formatting snippet.
    FormattingExpr,
    /// The digits of a Unicode escape.
    HexDigits,
}

impl FieldName {
    /// The field's stable spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::SymName => "sym_name",
            FieldName::RetExpr => "ret_expr",
            FieldName::LoopVar => "loop_var",
            FieldName::LoopExpr => "loop_expr",
            FieldName::FnName => "fn_name",
            FieldName::FnBody => "fn_body",
            FieldName::PosArgs => "pos_args",
            FieldName::KeywordArgs => "keyword_args",
            FieldName::ArgumentName => "argument_name",
            FieldName::Start => "start",
            FieldName::Step => "step",
            FieldName::End => "end",
            FieldName::Operator => "operator",
            FieldName::UnaryOp => "unary_op",
            FieldName::StringChars => "string_chars",
            FieldName::FormattingExpr => "formatting_expr",
            FieldName::HexDigits => "hex_digits",
        }
    }
}

/// A borrowed reference to a child position in the tree: a node, a node
/// list, or a token-like leaf.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// An expression node.
    Expr(&'a ExpressionNode),
    /// A statement node.
    Stmt(&'a StatementNode),
    /// A statement group.
    Block(&'a BlockNode),
    /// An `elseif` clause.
    Elseif(&'a ElseifClauseNode),
    /// A string segment.
    Segment(&'a StringSegmentNode),
    /// A matrix row.
    Row(&'a MatrixRowNode),
    /// A keyword argument.
    KeywordArg(&'a KeywordArgNode),
    /// A keyword parameter.
    KeywordParam(&'a KeywordParamNode),
    /// An identifier leaf.
    Ident(&'a Spanned<IdentifierNode>),
    /// A numeric literal leaf.
    Number(&'a Spanned<NumberLiteralNode>),
    /// A list of expressions.
    Exprs(&'a [ExpressionNode]),
    /// A list of string segments.
    Segments(&'a [StringSegmentNode]),
    /// A list of identifiers.
    Idents(&'a [Spanned<IdentifierNode>]),
    /// A list of keyword arguments.
    KeywordArgs(&'a [KeywordArgNode]),
    /// A list of keyword parameters.
    KeywordParams(&'a [KeywordParamNode]),
    /// A token-like leaf: an operator spelling or a digit run.
    Token(&'a str),
}

/// The generic tree-query interface.
pub trait SyntaxNode {
    /// The node's kind tag.
    fn kind(&self) -> NodeKind;

    /// The node's ordered children.
    fn children(&self) -> Vec<NodeRef<'_>>;

    /// The node's named fields, in a fixed order per kind.
    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)>;

    /// Looks up a single named field.
    fn field(&self, name: FieldName) -> Option<NodeRef<'_>> {
        self.fields()
            .into_iter()
            .find(|(f, _)| *f == name)
            .map(|(_, r)| r)
    }

    /// The node's own text, for leaf nodes (identifier names, number
    /// literals, comment text, string runs).
    fn text(&self) -> Option<&str> {
        None
    }
}

impl SyntaxNode for ProgramNode {
    fn kind(&self) -> NodeKind {
        NodeKind::SourceFile
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        self.statements.iter().map(NodeRef::Stmt).collect()
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        Vec::new()
    }
}

impl SyntaxNode for BlockNode {
    fn kind(&self) -> NodeKind {
        NodeKind::StmtGroup
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        self.statements.iter().map(NodeRef::Stmt).collect()
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        Vec::new()
    }
}

impl SyntaxNode for StatementNode {
    fn kind(&self) -> NodeKind {
        match self {
            StatementNode::Assignment(_) => NodeKind::Assignment,
            StatementNode::SymbolDecl(_) => NodeKind::SymbolDeclStatement,
            StatementNode::If(_) => NodeKind::IfElseStmt,
            StatementNode::While(_) => NodeKind::WhileStmt,
            StatementNode::ForIn(_) => NodeKind::ForInStmt,
            StatementNode::FunctionDef(_) => NodeKind::FunctionDefinition,
            StatementNode::Import(_) => NodeKind::ImportStatement,
            StatementNode::Ret(_) => NodeKind::ReturnStmt,
            StatementNode::Break(_) => NodeKind::Break,
            StatementNode::Cont(_) => NodeKind::Cont,
            StatementNode::Exit(_) => NodeKind::Exit,
            StatementNode::Comment(_) => NodeKind::Comment,
            StatementNode::Expr(_) => NodeKind::ExpressionStatement,
            StatementNode::Error(_) => NodeKind::Error,
        }
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            StatementNode::Assignment(n) => {
                vec![NodeRef::Ident(&n.name), NodeRef::Expr(&n.value)]
            }
            StatementNode::SymbolDecl(n) => vec![NodeRef::Ident(&n.name)],
            StatementNode::If(n) => {
                let mut children = vec![
                    NodeRef::Expr(&n.condition),
                    NodeRef::Block(&n.then_branch),
                ];
                children.extend(n.elseif_clauses.iter().map(NodeRef::Elseif));
                if let Some(else_branch) = &n.else_branch {
                    children.push(NodeRef::Block(else_branch));
                }
                children
            }
            StatementNode::While(n) => {
                vec![NodeRef::Expr(&n.condition), NodeRef::Block(&n.body)]
            }
            StatementNode::ForIn(n) => vec![
                NodeRef::Ident(&n.loop_var),
                NodeRef::Expr(&n.loop_expr),
                NodeRef::Block(&n.body),
            ],
            StatementNode::FunctionDef(n) => {
                let mut children = vec![NodeRef::Ident(&n.name)];
                children.extend(n.pos_params.iter().map(NodeRef::Ident));
                children.extend(n.keyword_params.iter().map(NodeRef::KeywordParam));
                children.push(NodeRef::Block(&n.body));
                children
            }
            StatementNode::Import(n) => vec![NodeRef::Ident(&n.module)],
            StatementNode::Ret(n) => vec![NodeRef::Expr(&n.value)],
            StatementNode::Break(_) | StatementNode::Cont(_) | StatementNode::Exit(_) => Vec::new(),
            StatementNode::Comment(_) | StatementNode::Error(_) => Vec::new(),
            StatementNode::Expr(e) => vec![NodeRef::Expr(e)],
        }
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        match self {
            StatementNode::SymbolDecl(n) => {
                vec![(FieldName::SymName, NodeRef::Ident(&n.name))]
            }
            StatementNode::Ret(n) => vec![(FieldName::RetExpr, NodeRef::Expr(&n.value))],
            StatementNode::While(n) => {
                vec![(FieldName::LoopExpr, NodeRef::Expr(&n.condition))]
            }
            StatementNode::ForIn(n) => vec![
                (FieldName::LoopVar, NodeRef::Ident(&n.loop_var)),
                (FieldName::LoopExpr, NodeRef::Expr(&n.loop_expr)),
            ],
            StatementNode::FunctionDef(n) => vec![
                (FieldName::FnName, NodeRef::Ident(&n.name)),
                (FieldName::PosArgs, NodeRef::Idents(&n.pos_params)),
                (FieldName::KeywordArgs, NodeRef::KeywordParams(&n.keyword_params)),
                (FieldName::FnBody, NodeRef::Block(&n.body)),
            ],
            _ => Vec::new(),
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            StatementNode::Comment(n) => Some(&n.text),
            StatementNode::Error(n) => Some(&n.message),
            _ => None,
        }
    }
}

impl SyntaxNode for ExpressionNode {
    fn kind(&self) -> NodeKind {
        match self {
            ExpressionNode::Identifier(_) => NodeKind::Identifier,
            ExpressionNode::Number(_) => NodeKind::Number,
            ExpressionNode::String(_) => NodeKind::String,
            ExpressionNode::Matrix(_) => NodeKind::Matrix,
            ExpressionNode::Range(_) => NodeKind::RangeExpression,
            ExpressionNode::Binary(_) => NodeKind::BinaryExpression,
            ExpressionNode::Unary(_) => NodeKind::UnaryExpression,
            ExpressionNode::Suffix(_) => NodeKind::SuffixExpression,
            ExpressionNode::Call(_) => NodeKind::FunctionCall,
            ExpressionNode::Member(_) => NodeKind::MemberAccess,
        }
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            ExpressionNode::Identifier(_) | ExpressionNode::Number(_) => Vec::new(),
            ExpressionNode::String(n) => n.segments.iter().map(NodeRef::Segment).collect(),
            ExpressionNode::Matrix(n) => n.rows.iter().map(NodeRef::Row).collect(),
            ExpressionNode::Range(n) => {
                let mut children = vec![NodeRef::Number(&n.start)];
                if let Some(step) = &n.step {
                    children.push(NodeRef::Number(step));
                }
                children.push(NodeRef::Number(&n.end));
                children
            }
            ExpressionNode::Binary(n) => {
                vec![NodeRef::Expr(&n.left), NodeRef::Expr(&n.right)]
            }
            ExpressionNode::Unary(n) => vec![NodeRef::Expr(&n.operand)],
            ExpressionNode::Suffix(n) => vec![NodeRef::Expr(&n.value)],
            ExpressionNode::Call(n) => {
                let mut children = vec![NodeRef::Expr(&n.callee)];
                children.extend(n.pos_args.iter().map(NodeRef::Expr));
                children.extend(n.keyword_args.iter().map(NodeRef::KeywordArg));
                children
            }
            ExpressionNode::Member(n) => {
                vec![NodeRef::Expr(&n.object), NodeRef::Ident(&n.property)]
            }
        }
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        match self {
            ExpressionNode::String(n) => {
                vec![(FieldName::StringChars, NodeRef::Segments(&n.segments))]
            }
            ExpressionNode::Range(n) => {
                let mut fields = vec![(FieldName::Start, NodeRef::Number(&n.start))];
                if let Some(step) = &n.step {
                    fields.push((FieldName::Step, NodeRef::Number(step)));
                }
                fields.push((FieldName::End, NodeRef::Number(&n.end)));
                fields
            }
            ExpressionNode::Binary(n) => {
                vec![(FieldName::Operator, NodeRef::Token(n.operator.as_str()))]
            }
            ExpressionNode::Unary(n) => {
                vec![(FieldName::UnaryOp, NodeRef::Token(n.operator.as_str()))]
            }
            ExpressionNode::Suffix(n) => {
                vec![(FieldName::Operator, NodeRef::Token(n.operator.as_str()))]
            }
            ExpressionNode::Call(n) => vec![
                (FieldName::FnName, NodeRef::Expr(&n.callee)),
                (FieldName::PosArgs, NodeRef::Exprs(&n.pos_args)),
                (FieldName::KeywordArgs, NodeRef::KeywordArgs(&n.keyword_args)),
            ],
            _ => Vec::new(),
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            ExpressionNode::Identifier(n) => Some(&n.name),
            ExpressionNode::Number(n) => Some(&n.raw),
            _ => None,
        }
    }
}

impl SyntaxNode for StringSegmentNode {
    fn kind(&self) -> NodeKind {
        match self {
            StringSegmentNode::Chars(_) => NodeKind::StringChars,
            StringSegmentNode::Escape(_) => NodeKind::EscapeSequence,
            StringSegmentNode::Unicode(_) => NodeKind::UnicodeEscape,
            StringSegmentNode::Octal(_) => NodeKind::OctalEscape,
            StringSegmentNode::Format(_) => NodeKind::FormattingSnippet,
        }
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            StringSegmentNode::Format(n) => vec![NodeRef::Expr(&n.formatting_expr)],
            _ => Vec::new(),
        }
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        match self {
            StringSegmentNode::Unicode(n) => {
                vec![(FieldName::HexDigits, NodeRef::Token(&n.hex_digits))]
            }
            StringSegmentNode::Format(n) => {
                vec![(FieldName::FormattingExpr, NodeRef::Expr(&n.formatting_expr))]
            }
            _ => Vec::new(),
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            StringSegmentNode::Chars(run) => Some(&run.node),
            StringSegmentNode::Escape(esc) => Some(&esc.raw),
            StringSegmentNode::Unicode(esc) => Some(&esc.hex_digits),
            StringSegmentNode::Octal(esc) => Some(&esc.digits),
            StringSegmentNode::Format(_) => None,
        }
    }
}

impl SyntaxNode for MatrixRowNode {
    fn kind(&self) -> NodeKind {
        NodeKind::MatrixRow
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        self.cells.iter().map(NodeRef::Expr).collect()
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        Vec::new()
    }
}

impl SyntaxNode for ElseifClauseNode {
    fn kind(&self) -> NodeKind {
        NodeKind::ElseifClause
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Expr(&self.condition), NodeRef::Block(&self.body)]
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        Vec::new()
    }
}

impl SyntaxNode for KeywordArgNode {
    fn kind(&self) -> NodeKind {
        NodeKind::KeywordArgument
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Ident(&self.name), NodeRef::Expr(&self.value)]
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        vec![(FieldName::ArgumentName, NodeRef::Ident(&self.name))]
    }
}

impl SyntaxNode for KeywordParamNode {
    fn kind(&self) -> NodeKind {
        NodeKind::KeywordParameter
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Ident(&self.name), NodeRef::Expr(&self.default)]
    }

    fn fields(&self) -> Vec<(FieldName, NodeRef<'_>)> {
        vec![(FieldName::ArgumentName, NodeRef::Ident(&self.name))]
    }
}
