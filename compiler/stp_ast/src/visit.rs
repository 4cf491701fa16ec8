//! Visitor pattern implementation for traversing the syntax tree.
//!
//! Implement [`Visitor`] to perform an operation on the tree; the default
//! method implementations recurse into children, so an implementation only
//! overrides the node kinds it cares about.

use crate::ast::*;

/// The result type for visitor operations.
pub type VisitResult<T = ()> = Result<T, VisitError>;

/// An error that can occur during tree traversal.
#[derive(Debug, thiserror::Error)]
pub enum VisitError {
    /// An error with a custom message.
    #[error("{0}")]
    Custom(String),

    /// An error at a specific location in the source.
    #[error("{message} at {location:?}")]
    Located {
        /// The error message.
        message: String,
        /// The source location where the error occurred.
        location: Option<Span>,
    },
}

impl VisitError {
    /// Creates a new custom error with the given message.
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        VisitError::Custom(msg.into())
    }

    /// Creates a new located error.
    pub fn located<T: Into<String>>(msg: T, location: Option<Span>) -> Self {
        VisitError::Located {
            message: msg.into(),
            location,
        }
    }
}

/// A trait for nodes that can be visited by a [`Visitor`].
pub trait Visitable {
    /// Accepts a visitor, calling the appropriate visit method.
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output>;

    /// Visits the children of this node with the given visitor.
    fn visit_children<V: Visitor + ?Sized>(&self, _visitor: &mut V) -> VisitResult<V::Output> {
        Ok(Default::default())
    }
}

/// A visitor over the syntax tree. Every method defaults to visiting the
/// node's children.
pub trait Visitor {
    /// The output type of the visitor.
    type Output: Default;

    // Expression nodes
    /// Visits an identifier.
    fn visit_identifier(&mut self, _node: &IdentifierNode) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits a numeric literal.
    fn visit_number(&mut self, _node: &NumberLiteralNode) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits a string literal.
    fn visit_string(&mut self, node: &StringLiteralNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a matrix literal.
    fn visit_matrix(&mut self, node: &MatrixNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a range literal.
    fn visit_range(&mut self, _node: &RangeNode) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits a binary expression.
    fn visit_binary_expr(&mut self, node: &BinaryExpressionNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a prefix expression.
    fn visit_unary_expr(&mut self, node: &UnaryExpressionNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a suffix expression.
    fn visit_suffix_expr(&mut self, node: &SuffixExpressionNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a function call.
    fn visit_call_expr(&mut self, node: &CallExpressionNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a member access.
    fn visit_member_expr(&mut self, node: &MemberExpressionNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    // Statement nodes
    /// Visits an assignment.
    fn visit_assignment(&mut self, node: &AssignmentNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a symbol declaration.
    fn visit_symbol_decl(&mut self, _node: &SymbolDeclNode) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits an `if` chain.
    fn visit_if_stmt(&mut self, node: &IfNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a `while` loop.
    fn visit_while_loop(&mut self, node: &WhileNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a `for ... in` loop.
    fn visit_for_in_loop(&mut self, node: &ForInNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a function definition.
    fn visit_function_def(&mut self, node: &FunctionDefNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits an import statement.
    fn visit_import(&mut self, _node: &ImportNode) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits a `ret` statement.
    fn visit_ret(&mut self, node: &RetNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits a `break` statement.
    fn visit_break(&mut self) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits a `cont` statement.
    fn visit_cont(&mut self) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits an `exit` statement.
    fn visit_exit(&mut self) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits a standalone comment.
    fn visit_comment(&mut self, _node: &CommentNode) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits a recovery marker.
    fn visit_error(&mut self, _node: &ErrorNode) -> VisitResult<Self::Output> {
        Ok(Default::default())
    }

    /// Visits a statement group.
    fn visit_block(&mut self, node: &BlockNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }

    /// Visits the root node.
    fn visit_program(&mut self, node: &ProgramNode) -> VisitResult<Self::Output> {
        node.visit_children(self)
    }
}

impl Visitable for ProgramNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_program(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        for stmt in &self.statements {
            stmt.accept(visitor)?;
        }
        Ok(Default::default())
    }
}

impl Visitable for BlockNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_block(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        for stmt in &self.statements {
            stmt.accept(visitor)?;
        }
        Ok(Default::default())
    }
}

impl Visitable for StatementNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        match self {
            StatementNode::Assignment(n) => visitor.visit_assignment(n),
            StatementNode::SymbolDecl(n) => visitor.visit_symbol_decl(n),
            StatementNode::If(n) => visitor.visit_if_stmt(n),
            StatementNode::While(n) => visitor.visit_while_loop(n),
            StatementNode::ForIn(n) => visitor.visit_for_in_loop(n),
            StatementNode::FunctionDef(n) => visitor.visit_function_def(n),
            StatementNode::Import(n) => visitor.visit_import(n),
            StatementNode::Ret(n) => visitor.visit_ret(n),
            StatementNode::Break(_) => visitor.visit_break(),
            StatementNode::Cont(_) => visitor.visit_cont(),
            StatementNode::Exit(_) => visitor.visit_exit(),
            StatementNode::Comment(n) => visitor.visit_comment(n),
            StatementNode::Expr(e) => e.accept(visitor),
            StatementNode::Error(n) => visitor.visit_error(n),
        }
    }
}

impl Visitable for ExpressionNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        match self {
            ExpressionNode::Identifier(n) => visitor.visit_identifier(n),
            ExpressionNode::Number(n) => visitor.visit_number(n),
            ExpressionNode::String(n) => visitor.visit_string(n),
            ExpressionNode::Matrix(n) => visitor.visit_matrix(n),
            ExpressionNode::Range(n) => visitor.visit_range(n),
            ExpressionNode::Binary(n) => visitor.visit_binary_expr(n),
            ExpressionNode::Unary(n) => visitor.visit_unary_expr(n),
            ExpressionNode::Suffix(n) => visitor.visit_suffix_expr(n),
            ExpressionNode::Call(n) => visitor.visit_call_expr(n),
            ExpressionNode::Member(n) => visitor.visit_member_expr(n),
        }
    }
}

impl Visitable for StringLiteralNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_string(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        for segment in &self.segments {
            if let StringSegmentNode::Format(snippet) = segment {
                snippet.formatting_expr.accept(visitor)?;
            }
        }
        Ok(Default::default())
    }
}

impl Visitable for MatrixNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_matrix(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        for row in &self.rows {
            for cell in &row.cells {
                cell.accept(visitor)?;
            }
        }
        Ok(Default::default())
    }
}

impl Visitable for BinaryExpressionNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_binary_expr(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.left.accept(visitor)?;
        self.right.accept(visitor)
    }
}

impl Visitable for UnaryExpressionNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_unary_expr(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.operand.accept(visitor)
    }
}

impl Visitable for SuffixExpressionNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_suffix_expr(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.value.accept(visitor)
    }
}

impl Visitable for CallExpressionNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_call_expr(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.callee.accept(visitor)?;
        for arg in &self.pos_args {
            arg.accept(visitor)?;
        }
        for arg in &self.keyword_args {
            arg.value.accept(visitor)?;
        }
        Ok(Default::default())
    }
}

impl Visitable for MemberExpressionNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_member_expr(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.object.accept(visitor)
    }
}

impl Visitable for AssignmentNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_assignment(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.value.accept(visitor)
    }
}

impl Visitable for IfNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_if_stmt(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.condition.accept(visitor)?;
        self.then_branch.accept(visitor)?;
        for clause in &self.elseif_clauses {
            clause.condition.accept(visitor)?;
            clause.body.accept(visitor)?;
        }
        if let Some(else_branch) = &self.else_branch {
            else_branch.accept(visitor)?;
        }
        Ok(Default::default())
    }
}

impl Visitable for WhileNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_while_loop(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.condition.accept(visitor)?;
        self.body.accept(visitor)
    }
}

impl Visitable for ForInNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_for_in_loop(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.loop_expr.accept(visitor)?;
        self.body.accept(visitor)
    }
}

impl Visitable for FunctionDefNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_function_def(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        for param in &self.keyword_params {
            param.default.accept(visitor)?;
        }
        self.body.accept(visitor)
    }
}

impl Visitable for RetNode {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        visitor.visit_ret(self)
    }

    fn visit_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult<V::Output> {
        self.value.accept(visitor)
    }
}
