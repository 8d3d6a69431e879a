//! Expression nodes.
//!
//! Expressions come in three grammatical tiers: primary atoms (literals,
//! names, parenthesized expressions), secondary postfix chains (calls,
//! subscripts, member access, increment) and tertiary binary operators.
//! Parenthesized expressions do not get a node of their own.

use crate::Ident;
use colang_diag::SourceSpan;

#[derive(Clone, Debug)]
pub enum Expr {
    Literal(LiteralExpr),
    Var(VarExpr),
    Call(CallExpr),
    Subscript(SubscriptExpr),
    Member(MemberExpr),
    Increment(IncrementExpr),
    Binary(BinaryExpr),
    Assign(AssignExpr),
}

impl Expr {
    pub fn span(&self) -> SourceSpan {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Var(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Subscript(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Increment(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Assign(e) => e.span,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub span: SourceSpan,
}

#[derive(Clone, Debug)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// A bare identifier in expression position.
#[derive(Clone, Debug)]
pub struct VarExpr {
    pub name: Ident,
    pub span: SourceSpan,
}

/// `callee(args)`
#[derive(Clone, Debug)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: SourceSpan,
}

/// `receiver[index]`
#[derive(Clone, Debug)]
pub struct SubscriptExpr {
    pub receiver: Box<Expr>,
    pub index: Box<Expr>,
    pub span: SourceSpan,
}

/// `receiver.name`
#[derive(Clone, Debug)]
pub struct MemberExpr {
    pub receiver: Box<Expr>,
    pub name: Ident,
    pub span: SourceSpan,
}

/// `receiver++`
#[derive(Clone, Debug)]
pub struct IncrementExpr {
    pub receiver: Box<Expr>,
    pub span: SourceSpan,
}

/// `lhs op rhs`
#[derive(Clone, Debug)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: SourceSpan,
}

/// `target = value`
#[derive(Clone, Debug)]
pub struct AssignExpr {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub span: SourceSpan,
}

/// Binary infix operators, assignment excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// The operator as written in the source.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// The name used when the operator resolves as a method call on the left
    /// operand's type.
    pub fn method_name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "plus",
            BinaryOp::Sub => "minus",
            BinaryOp::Mul => "times",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "rem",
            BinaryOp::Eq => "equals",
            BinaryOp::NotEq => "notEquals",
            BinaryOp::Lt => "lessThan",
            BinaryOp::LtEq => "atMost",
            BinaryOp::Gt => "greaterThan",
            BinaryOp::GtEq => "atLeast",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}
