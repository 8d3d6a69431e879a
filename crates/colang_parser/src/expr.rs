//! Expression parsing: the primary / secondary / tertiary tiers.
//!
//! Primary expressions are atoms. Secondary expressions wrap a primary in a
//! left-to-right fold of postfix operators, each represented as an
//! `Expr -> Expr` function. Tertiary expressions are binary operators parsed
//! by precedence climbing over the table in [`binary_op`]; assignment binds
//! weakest and is the one right-associative operator.

use crate::strategy::{enclosed, ident, token, Group, Outcome, Strategy};
use crate::Cursor;
use colang_ast::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, Expr, Ident, IncrementExpr, LiteralExpr,
    LiteralValue, MemberExpr, SubscriptExpr, VarExpr,
};
use colang_diag::{Issue, IssueCode};
use colang_lexer::TokenKind;

/// Parses a full expression, assignment included.
pub(crate) fn expression<'t>(cursor: Cursor<'t>) -> Outcome<'t, Expr> {
    let (lhs, mut issues, cursor) = match binary(cursor, 1) {
        Outcome::Success { node, issues, rest } => (node, issues, rest),
        other => return other,
    };

    if !cursor.is(&TokenKind::Eq) {
        return Outcome::Success {
            node: lhs,
            issues,
            rest: cursor,
        };
    }

    // Assignment is right-associative: recurse at the same level.
    let cursor = cursor.skip_one();
    match expression(cursor) {
        Outcome::Success {
            node,
            issues: inner,
            rest,
        } => {
            issues.extend(inner);
            let span = lhs.span().cover(node.span());
            Outcome::Success {
                node: Expr::Assign(AssignExpr {
                    target: Box::new(lhs),
                    value: Box::new(node),
                    span,
                }),
                issues,
                rest,
            }
        }
        Outcome::Malformed {
            issues: inner,
            rest,
        } => {
            issues.extend(inner);
            Outcome::Malformed { issues, rest }
        }
        Outcome::NoMatch => {
            issues.push(missing_expression(cursor));
            Outcome::Malformed {
                issues,
                rest: cursor,
            }
        }
    }
}

/// The binary operator table, strongest binding first:
///
/// | precedence | operators |
/// |---|---|
/// | 6 | `*` `/` `%` |
/// | 5 | `+` `-` |
/// | 4 | `<` `<=` `>` `>=` |
/// | 3 | `==` `!=` |
/// | 2 | `&&` |
/// | 1 | `\|\|` |
///
/// All of these associate to the left; on equal precedence the earlier
/// operand wins. `=` sits below the table and associates to the right.
fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    Some(match kind {
        TokenKind::Star => (BinaryOp::Mul, 6),
        TokenKind::Slash => (BinaryOp::Div, 6),
        TokenKind::Percent => (BinaryOp::Rem, 6),
        TokenKind::Plus => (BinaryOp::Add, 5),
        TokenKind::Minus => (BinaryOp::Sub, 5),
        TokenKind::Lt => (BinaryOp::Lt, 4),
        TokenKind::LtEq => (BinaryOp::LtEq, 4),
        TokenKind::Gt => (BinaryOp::Gt, 4),
        TokenKind::GtEq => (BinaryOp::GtEq, 4),
        TokenKind::EqEq => (BinaryOp::Eq, 3),
        TokenKind::NotEq => (BinaryOp::NotEq, 3),
        TokenKind::AndAnd => (BinaryOp::And, 2),
        TokenKind::OrOr => (BinaryOp::Or, 1),
        _ => return None,
    })
}

fn binary<'t>(cursor: Cursor<'t>, min_prec: u8) -> Outcome<'t, Expr> {
    let (mut lhs, mut issues, mut cursor) = match secondary(cursor) {
        Outcome::Success { node, issues, rest } => (node, issues, rest),
        other => return other,
    };

    while let Some((op, prec)) = binary_op(cursor.kind()) {
        if prec < min_prec {
            break;
        }
        let after_op = cursor.skip_one();
        match binary(after_op, prec + 1) {
            Outcome::Success {
                node,
                issues: inner,
                rest,
            } => {
                issues.extend(inner);
                let span = lhs.span().cover(node.span());
                lhs = Expr::Binary(BinaryExpr {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(node),
                    span,
                });
                cursor = rest;
            }
            Outcome::Malformed {
                issues: inner,
                rest,
            } => {
                issues.extend(inner);
                return Outcome::Malformed { issues, rest };
            }
            Outcome::NoMatch => {
                issues.push(missing_expression(after_op));
                return Outcome::Malformed {
                    issues,
                    rest: after_op,
                };
            }
        }
    }

    Outcome::Success {
        node: lhs,
        issues,
        rest: cursor,
    }
}

/// A primary expression followed by a chain of postfix operators.
fn secondary<'t>(cursor: Cursor<'t>) -> Outcome<'t, Expr> {
    let (prim, mut issues, mut cursor) = match primary(cursor) {
        Outcome::Success { node, issues, rest } => (node, issues, rest),
        other => return other,
    };

    // Each postfix operator becomes a wrapper applied to whatever expression
    // has accumulated so far; the fold at the end applies them left-to-right.
    let mut wrappers: Vec<Box<dyn FnOnce(Expr) -> Expr>> = Vec::new();

    loop {
        match cursor.kind() {
            TokenKind::LParen => {
                if let Outcome::Success {
                    node: seq,
                    issues: inner,
                    rest,
                } = enclosed(
                    cursor,
                    TokenKind::LParen,
                    TokenKind::RParen,
                    Some(TokenKind::Comma),
                    &expression,
                ) {
                    issues.extend(inner);
                    cursor = rest;
                    let end = seq.span;
                    let args = seq.items;
                    wrappers.push(Box::new(move |e| {
                        let span = e.span().cover(end);
                        Expr::Call(CallExpr {
                            callee: Box::new(e),
                            args,
                            span,
                        })
                    }));
                } else {
                    break;
                }
            }
            TokenKind::LBracket => {
                let mut group = Group::new(cursor);
                group.defining(&token(TokenKind::LBracket));
                let index = group.required(&expression, "index expression");
                group.required(&token(TokenKind::RBracket), "']'");
                match group.finish(index) {
                    Outcome::Success {
                        node: index,
                        issues: inner,
                        rest,
                    } => {
                        issues.extend(inner);
                        cursor = rest;
                        let end = rest.gap_span();
                        wrappers.push(Box::new(move |e| {
                            let span = e.span().cover(end);
                            Expr::Subscript(SubscriptExpr {
                                receiver: Box::new(e),
                                index: Box::new(index),
                                span,
                            })
                        }));
                    }
                    Outcome::Malformed {
                        issues: inner,
                        rest,
                    } => {
                        issues.extend(inner);
                        cursor = rest;
                    }
                    Outcome::NoMatch => break,
                }
            }
            TokenKind::Dot => {
                let after_dot = cursor.skip_one();
                match ident().apply(after_dot) {
                    Outcome::Success {
                        node: name,
                        issues: inner,
                        rest,
                    } => {
                        issues.extend(inner);
                        cursor = rest;
                        wrappers.push(Box::new(move |e| {
                            let span = e.span().cover(name.span);
                            Expr::Member(MemberExpr {
                                receiver: Box::new(e),
                                name,
                                span,
                            })
                        }));
                    }
                    _ => {
                        issues.push(Issue::error(
                            IssueCode::MissingToken,
                            after_dot.gap_span(),
                            "missing member name".to_string(),
                        ));
                        return Outcome::Malformed {
                            issues,
                            rest: after_dot,
                        };
                    }
                }
            }
            TokenKind::PlusPlus => {
                let end = cursor.span();
                cursor = cursor.skip_one();
                wrappers.push(Box::new(move |e| {
                    let span = e.span().cover(end);
                    Expr::Increment(IncrementExpr {
                        receiver: Box::new(e),
                        span,
                    })
                }));
            }
            _ => break,
        }
    }

    let node = wrappers.into_iter().fold(prim, |acc, wrap| wrap(acc));
    Outcome::Success {
        node,
        issues,
        rest: cursor,
    }
}

/// Literals, identifier references and parenthesized expressions.
fn primary<'t>(cursor: Cursor<'t>) -> Outcome<'t, Expr> {
    match cursor.kind() {
        TokenKind::IntLiteral(value) => {
            let (token, rest) = cursor.bump();
            Outcome::Success {
                node: Expr::Literal(LiteralExpr {
                    value: LiteralValue::Int(*value),
                    span: token.span,
                }),
                issues: Vec::new(),
                rest,
            }
        }
        TokenKind::FloatLiteral(value) => {
            let (token, rest) = cursor.bump();
            Outcome::Success {
                node: Expr::Literal(LiteralExpr {
                    value: LiteralValue::Float(*value),
                    span: token.span,
                }),
                issues: Vec::new(),
                rest,
            }
        }
        TokenKind::StringLiteral(value) => {
            let value = value.clone();
            let (token, rest) = cursor.bump();
            Outcome::Success {
                node: Expr::Literal(LiteralExpr {
                    value: LiteralValue::Str(value),
                    span: token.span,
                }),
                issues: Vec::new(),
                rest,
            }
        }
        TokenKind::Ident(name) => {
            let name = name.clone();
            let (token, rest) = cursor.bump();
            Outcome::Success {
                node: Expr::Var(VarExpr {
                    name: Ident::new(name, token.span),
                    span: token.span,
                }),
                issues: Vec::new(),
                rest,
            }
        }
        TokenKind::LParen => {
            let mut group = Group::new(cursor);
            group.defining(&token(TokenKind::LParen));
            let inner = group.required(&expression, "expression");
            group.required(&token(TokenKind::RParen), "')'");
            group.finish(inner)
        }
        _ => Outcome::NoMatch,
    }
}

fn missing_expression(cursor: Cursor<'_>) -> Issue {
    Issue::error(
        IssueCode::MissingToken,
        cursor.gap_span(),
        "missing expression".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use colang_diag::FileId;
    use colang_lexer::tokenize;

    fn parse_expr(source: &str) -> Expr {
        let (tokens, lex_issues) = tokenize(FileId(0), source);
        assert!(lex_issues.is_empty());
        match expression(Cursor::new(&tokens)) {
            Outcome::Success { node, issues, rest } => {
                assert!(issues.is_empty(), "unexpected issues: {issues:?}");
                assert!(rest.at_end());
                node
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn precedence_mul_over_add() {
        let expr = parse_expr("1 + 2 * 3");
        match expr {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinaryOp::Add);
                assert!(matches!(*b.rhs, Expr::Binary(ref m) if m.op == BinaryOp::Mul));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn left_associativity() {
        let expr = parse_expr("1 - 2 - 3");
        match expr {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinaryOp::Sub);
                assert!(matches!(*b.lhs, Expr::Binary(ref m) if m.op == BinaryOp::Sub));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = parse_expr("a = b = 1");
        match expr {
            Expr::Assign(a) => {
                assert!(matches!(*a.target, Expr::Var(_)));
                assert!(matches!(*a.value, Expr::Assign(_)));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn postfix_operators_fold_left_to_right() {
        let expr = parse_expr("f(1)[2].g()");
        // ((f(1))[2]).g()
        match expr {
            Expr::Call(call) => match *call.callee {
                Expr::Member(member) => {
                    assert_eq!(member.name.name, "g");
                    assert!(matches!(*member.receiver, Expr::Subscript(_)));
                }
                other => panic!("expected member access, got {other:?}"),
            },
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn parenthesized_expression_overrides_precedence() {
        let expr = parse_expr("(1 + 2) * 3");
        match expr {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinaryOp::Mul);
                assert!(matches!(*b.lhs, Expr::Binary(ref a) if a.op == BinaryOp::Add));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn missing_operand_is_malformed() {
        let (tokens, _) = tokenize(FileId(0), "1 +");
        match expression(Cursor::new(&tokens)) {
            Outcome::Malformed { issues, .. } => {
                assert!(issues
                    .iter()
                    .any(|i| i.code == IssueCode::MissingToken));
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn non_expression_declines() {
        let (tokens, _) = tokenize(FileId(0), "}");
        assert!(matches!(expression(Cursor::new(&tokens)), Outcome::NoMatch));
    }
}
