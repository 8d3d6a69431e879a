//! Semantic analysis for CO.
//!
//! The analyzer turns raw translation units into a [`Program`]: an arena of
//! types, functions, methods, variables and scopes, plus typed statement and
//! expression trees for every body. Analysis runs in two phases so forward
//! references work: first every global symbol is registered, then bodies are
//! resolved and type-checked. The return-flow checker is a separate pass over
//! the finished program.

mod analyze;
mod overload;
mod program;
mod returns;
mod tree;

pub use analyze::analyze;
pub use overload::{resolve_overload, Callee, OverloadError};
pub use program::{
    Function, FunctionId, Method, MethodId, Program, Scope, ScopeId, Symbol, Type, TypeId,
    Variable, VariableId,
};
pub use returns::check_returns;
pub use tree::{
    Block, Expr, ExprKind, IfStmt, LocalDef, ReturnStmt, Stmt, WhileStmt,
};
