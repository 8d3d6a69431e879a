//! Statement parsing.

use crate::decl::variable_def;
use crate::expr::expression;
use crate::strategy::{enclosed, token, Group, Outcome, StrategyUnion};
use crate::Cursor;
use colang_ast::{Block, ExprStmt, IfStmt, ReturnStmt, Stmt, WhileStmt};
use colang_lexer::TokenKind;

/// Dispatches one statement.
pub(crate) static STATEMENT: StrategyUnion<Stmt> = StrategyUnion::new(&[
    block_stmt,
    if_stmt,
    while_stmt,
    return_stmt,
    var_def_stmt,
    expr_stmt,
]);

pub(crate) fn statement<'t>(cursor: Cursor<'t>) -> Outcome<'t, Stmt> {
    STATEMENT.apply(cursor)
}

/// `{ statements }`, recovering inside the braces.
pub(crate) fn block<'t>(cursor: Cursor<'t>) -> Outcome<'t, Block> {
    enclosed(
        cursor,
        TokenKind::LBrace,
        TokenKind::RBrace,
        None,
        &statement,
    )
    .map(|seq| Block {
        stmts: seq.items,
        span: seq.span,
    })
}

fn block_stmt<'t>(cursor: Cursor<'t>) -> Outcome<'t, Stmt> {
    block(cursor).map(Stmt::Block)
}

fn if_stmt<'t>(cursor: Cursor<'t>) -> Outcome<'t, Stmt> {
    let start = cursor.span();
    let mut group = Group::new(cursor);
    group.defining(&token(TokenKind::If));
    group.required_stop(&token(TokenKind::LParen), "'('");
    let cond = group.required(&expression, "condition");
    group.required(&token(TokenKind::RParen), "')'");
    let then_branch = group.required(&statement, "statement");
    let else_branch = if group.optional(&token(TokenKind::Else)).is_some() {
        group.required(&statement, "statement").map(Box::new)
    } else {
        None
    };
    let span = start.cover(group.cursor().gap_span());
    let node = cond.zip(then_branch).map(|(cond, then_branch)| {
        Stmt::If(IfStmt {
            cond,
            then_branch: Box::new(then_branch),
            else_branch,
            span,
        })
    });
    group.finish(node)
}

fn while_stmt<'t>(cursor: Cursor<'t>) -> Outcome<'t, Stmt> {
    let start = cursor.span();
    let mut group = Group::new(cursor);
    group.defining(&token(TokenKind::While));
    group.required_stop(&token(TokenKind::LParen), "'('");
    let cond = group.required(&expression, "condition");
    group.required(&token(TokenKind::RParen), "')'");
    let body = group.required(&statement, "statement");
    let span = start.cover(group.cursor().gap_span());
    let node = cond.zip(body).map(|(cond, body)| {
        Stmt::While(WhileStmt {
            cond,
            body: Box::new(body),
            span,
        })
    });
    group.finish(node)
}

fn return_stmt<'t>(cursor: Cursor<'t>) -> Outcome<'t, Stmt> {
    let start = cursor.span();
    let mut group = Group::new(cursor);
    group.defining(&token(TokenKind::Return));
    let value = group.optional(&expression);
    group.required_stop(&token(TokenKind::Semi), "';'");
    let span = start.cover(group.cursor().gap_span());
    group.finish(Some(Stmt::Return(ReturnStmt { value, span })))
}

fn var_def_stmt<'t>(cursor: Cursor<'t>) -> Outcome<'t, Stmt> {
    variable_def(cursor).map(Stmt::VarDef)
}

fn expr_stmt<'t>(cursor: Cursor<'t>) -> Outcome<'t, Stmt> {
    let start = cursor.span();
    let mut group = Group::new(cursor);
    let expr = group.defining(&expression);
    group.required_stop(&token(TokenKind::Semi), "';'");
    let span = start.cover(group.cursor().gap_span());
    let node = expr.map(|expr| Stmt::Expr(ExprStmt { expr, span }));
    group.finish(node)
}
