//! The return-flow checker.
//!
//! For every function and method with a non-void return type, proves that
//! every path through the body returns, and flags statements that follow a
//! statically guaranteed return as unreachable. The analysis is conservative:
//! an `if` without an `else` never counts as returning, and a `while` body is
//! assumed to possibly not run at all.

use crate::program::{Program, TypeId};
use crate::tree::{Block, Stmt};
use colang_diag::{Issue, IssueCode, SourceSpan};

/// What a statement guarantees about control flow.
enum Flow {
    /// Every path through the statement returns; the payload is the value
    /// type when one could be inferred.
    WillReturn(Option<TypeId>),
    WontReturn,
}

/// Checks every function and method body in the program.
pub fn check_returns(program: &Program) -> Vec<Issue> {
    let mut issues = Vec::new();
    let void = program.lookup_type("void");

    let checker = Checker {
        program,
        void,
    };

    for function in &program.functions {
        if let Some(body) = &function.body {
            checker.check_body(body, function.return_type, &mut issues);
        }
    }
    for method in &program.methods {
        if let Some(body) = &method.body {
            checker.check_body(body, method.return_type, &mut issues);
        }
    }

    issues
}

struct Checker<'p> {
    program: &'p Program,
    void: Option<TypeId>,
}

impl Checker<'_> {
    fn is_void(&self, ty: TypeId) -> bool {
        Some(ty) == self.void || ty == self.program.error_type
    }

    fn check_body(&self, body: &Block, return_type: TypeId, issues: &mut Vec<Issue>) {
        let flow = self.analyze_block(body, return_type, issues);
        if matches!(flow, Flow::WontReturn) && !self.is_void(return_type) {
            issues.push(Issue::error(
                IssueCode::MissingReturnStatement,
                before_closing_brace(body.span),
                format!(
                    "function must return a value of type '{}' on every path",
                    self.program.ty(return_type).name
                ),
            ));
        }
    }

    fn analyze_stmt(&self, stmt: &Stmt, return_type: TypeId, issues: &mut Vec<Issue>) -> Flow {
        match stmt {
            Stmt::Return(ret) => {
                match &ret.value {
                    Some(value) => {
                        if self.is_void(return_type) && return_type != self.program.error_type {
                            issues.push(Issue::error(
                                IssueCode::ReturnWithValueInVoid,
                                ret.span,
                                "cannot return a value from a void function",
                            ));
                        }
                        Flow::WillReturn(Some(value.ty))
                    }
                    None => {
                        if !self.is_void(return_type) {
                            issues.push(Issue::error(
                                IssueCode::ReturnWithoutValue,
                                ret.span,
                                format!(
                                    "return statement must carry a value of type '{}'",
                                    self.program.ty(return_type).name
                                ),
                            ));
                        }
                        Flow::WillReturn(None)
                    }
                }
            }

            Stmt::If(stmt) => {
                let then_flow = self.analyze_stmt(&stmt.then_branch, return_type, issues);
                match &stmt.else_branch {
                    Some(else_branch) => {
                        let else_flow = self.analyze_stmt(else_branch, return_type, issues);
                        match (then_flow, else_flow) {
                            (Flow::WillReturn(a), Flow::WillReturn(b)) => {
                                let ty = match (a, b) {
                                    (Some(a), Some(b)) => self.program.least_upper_bound(a, b),
                                    _ => None,
                                };
                                Flow::WillReturn(ty)
                            }
                            _ => Flow::WontReturn,
                        }
                    }
                    // The then-branch may not run; its issues stand but its
                    // return guarantee does not.
                    None => Flow::WontReturn,
                }
            }

            Stmt::While(stmt) => {
                self.analyze_stmt(&stmt.body, return_type, issues);
                Flow::WontReturn
            }

            Stmt::Block(block) => self.analyze_block(block, return_type, issues),

            Stmt::VarDef(_) | Stmt::Expr(_) => Flow::WontReturn,
        }
    }

    fn analyze_block(&self, block: &Block, return_type: TypeId, issues: &mut Vec<Issue>) -> Flow {
        let mut result = Flow::WontReturn;
        let mut returned = false;
        for stmt in &block.stmts {
            if returned {
                issues.push(Issue::error(
                    IssueCode::UnreachableCode,
                    stmt.span(),
                    "unreachable code",
                ));
                continue;
            }
            let flow = self.analyze_stmt(stmt, return_type, issues);
            if let Flow::WillReturn(_) = flow {
                returned = true;
                result = flow;
            }
        }
        result
    }
}

/// The zero-width span immediately before a block's closing brace.
fn before_closing_brace(span: SourceSpan) -> SourceSpan {
    SourceSpan::point(span.file, span.end_line, span.end_char.saturating_sub(1))
}
