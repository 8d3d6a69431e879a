//! Statement nodes.

use crate::{Expr, VariableDef};
use colang_diag::SourceSpan;

/// A brace-delimited statement sequence.
#[derive(Clone, Debug)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: SourceSpan,
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    VarDef(VariableDef),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> SourceSpan {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::VarDef(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

/// `if (cond) then else otherwise`
#[derive(Clone, Debug)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: SourceSpan,
}

/// `while (cond) body`
#[derive(Clone, Debug)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub span: SourceSpan,
}

/// `return;` or `return value;`
#[derive(Clone, Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: SourceSpan,
}

/// An expression in statement position.
#[derive(Clone, Debug)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: SourceSpan,
}
