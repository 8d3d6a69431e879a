//! Typed statement and expression trees.
//!
//! Every expression carries the type inferred for it and the span of the raw
//! node it came from, so diagnostics emitted over the resolved tree point
//! back into the source.

use crate::program::{FunctionId, MethodId, TypeId, VariableId};
use colang_ast::BinaryOp;
use colang_diag::SourceSpan;

#[derive(Debug)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: SourceSpan,
}

#[derive(Debug)]
pub enum Stmt {
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    VarDef(LocalDef),
    Expr(Expr),
}

impl Stmt {
    pub fn span(&self) -> SourceSpan {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::VarDef(s) => s.span,
            Stmt::Expr(e) => e.span,
        }
    }
}

#[derive(Debug)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: SourceSpan,
}

#[derive(Debug)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub span: SourceSpan,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: SourceSpan,
}

/// A local variable definition inside a body.
#[derive(Debug)]
pub struct LocalDef {
    pub variable: VariableId,
    pub init: Option<Expr>,
    pub span: SourceSpan,
}

/// A typed expression. `ty` is never "missing": failed resolutions get the
/// program's absorbing error type.
#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeId,
    pub span: SourceSpan,
}

impl Expr {
    /// True if the expression designates a storage location.
    pub fn is_place(&self) -> bool {
        matches!(self.kind, ExprKind::VarRef(_))
    }
}

#[derive(Debug)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    VarRef(VariableId),
    Call {
        function: FunctionId,
        args: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: MethodId,
        args: Vec<Expr>,
    },
    /// An implicit one-step conversion inserted by the analyzer.
    Convert {
        value: Box<Expr>,
    },
    /// A built-in operator over native operand types.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Increment {
        target: Box<Expr>,
    },
    /// Placeholder for an expression that could not be resolved; its type is
    /// the error type and downstream checks stay silent about it.
    Error,
}
