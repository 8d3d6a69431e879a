//! The raw syntax tree for CO.
//!
//! Nodes in this crate are the untyped record of what the parser saw: every
//! node carries its source span, and nodes the parser had to invent during
//! error recovery are marked `synthesized` so semantic analysis can skip them
//! without cascading diagnostics.

mod decl;
mod expr;
mod stmt;

pub use decl::{
    FunctionDef, GlobalDef, Param, ParamList, Specifiers, TranslationUnit, TypeBody, TypeDef,
    TypeExpr, VariableDef,
};
pub use expr::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, Expr, IncrementExpr, LiteralExpr, LiteralValue,
    MemberExpr, SubscriptExpr, VarExpr,
};
pub use stmt::{Block, ExprStmt, IfStmt, ReturnStmt, Stmt, WhileStmt};

use colang_diag::SourceSpan;

/// A name as written in the source, or a placeholder the parser synthesized
/// while recovering.
#[derive(Clone, Debug)]
pub struct Ident {
    pub name: String,
    pub span: SourceSpan,
    pub synthesized: bool,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            name: name.into(),
            span,
            synthesized: false,
        }
    }

    /// A placeholder for a name that was missing from the source.
    pub fn synthesized(span: SourceSpan) -> Self {
        Self {
            name: String::new(),
            span,
            synthesized: true,
        }
    }
}
