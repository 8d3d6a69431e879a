//! Top-level definition parsing.
//!
//! A translation unit is a sequence of global symbol definitions dispatched
//! through a strategy union. The anchors that tell the three productions
//! apart: `struct` for type definitions, the parenthesized parameter list
//! for functions, and `=`-or-`;` after `Type name` for variables.

use crate::stmt::block;
use crate::strategy::{enclosed, ident, token, Group, Outcome, Strategy, StrategyUnion};
use crate::Cursor;
use colang_ast::{
    FunctionDef, GlobalDef, Ident, Param, ParamList, Specifiers, TypeBody, TypeDef, TypeExpr,
    VariableDef,
};
use colang_diag::{Issue, IssueCode};
use colang_lexer::TokenKind;

/// Dispatches one global symbol definition.
pub(crate) static GLOBAL_DEF: StrategyUnion<GlobalDef> =
    StrategyUnion::new(&[global_type, global_function, global_variable]);

fn global_type<'t>(cursor: Cursor<'t>) -> Outcome<'t, GlobalDef> {
    type_def(cursor).map(GlobalDef::Type)
}

fn global_function<'t>(cursor: Cursor<'t>) -> Outcome<'t, GlobalDef> {
    function_def(cursor).map(GlobalDef::Function)
}

fn global_variable<'t>(cursor: Cursor<'t>) -> Outcome<'t, GlobalDef> {
    variable_def(cursor).map(GlobalDef::Variable)
}

/// A type expression: a plain type name.
pub(crate) fn type_expr<'t>(cursor: Cursor<'t>) -> Outcome<'t, TypeExpr> {
    ident().apply(cursor).map(|name| TypeExpr {
        span: name.span,
        name,
    })
}

/// Consumes the leading specifier list, warning about duplicates and
/// discarding specifiers that are illegal on the enclosing production.
fn specifiers(group: &mut Group<'_>, allow_native: bool) -> Specifiers {
    let mut specs = Specifiers::default();
    while let Some(spec) = group.optional(&token(TokenKind::Native)) {
        if !allow_native {
            group.issue(Issue::error(
                IssueCode::MisplacedSpecifier,
                spec.span,
                "specifier 'native' is not allowed here",
            ));
        } else if specs.native {
            group.issue(Issue::warning(
                IssueCode::DuplicateSpecifier,
                spec.span,
                "duplicate specifier 'native'",
            ));
        } else {
            specs.native = true;
        }
    }
    specs
}

/// `[native] struct Name { methods }` or `[native] struct Name;`
fn type_def<'t>(cursor: Cursor<'t>) -> Outcome<'t, TypeDef> {
    let start = cursor.span();
    let mut group = Group::new(cursor);
    let specifiers = specifiers(&mut group, true);
    group.defining(&token(TokenKind::Struct));
    let name = group.required_or(&ident(), "type name", Ident::synthesized);

    let body = if group.optional(&token(TokenKind::Semi)).is_some() {
        None
    } else {
        let body_strategy = |c: Cursor<'t>| {
            enclosed(c, TokenKind::LBrace, TokenKind::RBrace, None, &function_def)
        };
        match group.optional(&body_strategy) {
            Some(seq) => Some(TypeBody {
                methods: seq.items,
                span: seq.span,
            }),
            None => {
                group.required(&token(TokenKind::Semi), "';' or type body");
                None
            }
        }
    };

    let span = start.cover(group.cursor().gap_span());
    let node = name.map(|name| TypeDef {
        specifiers,
        name,
        body,
        span,
    });
    group.finish(node)
}

/// `[native] ReturnType name(params) { body }` or `... ;`
///
/// Also parses method definitions inside type bodies, which share the exact
/// same shape.
pub(crate) fn function_def<'t>(cursor: Cursor<'t>) -> Outcome<'t, FunctionDef> {
    let start = cursor.span();
    let mut group = Group::new(cursor);
    let specifiers = specifiers(&mut group, true);
    let return_type = group.defining(&type_expr);
    let name = group.defining(&ident());
    let params = group.defining(&param_list);

    let body = match group.optional(&block) {
        Some(body) => Some(body),
        None => {
            group.required_stop(&token(TokenKind::Semi), "';' or function body");
            None
        }
    };

    let span = start.cover(group.cursor().gap_span());
    let node = match (return_type, name, params) {
        (Some(return_type), Some(name), Some(params)) => Some(FunctionDef {
            specifiers,
            return_type,
            name,
            params,
            body,
            span,
        }),
        _ => None,
    };
    group.finish(node)
}

/// `(Type name, Type name, ...)`
fn param_list<'t>(cursor: Cursor<'t>) -> Outcome<'t, ParamList> {
    enclosed(
        cursor,
        TokenKind::LParen,
        TokenKind::RParen,
        Some(TokenKind::Comma),
        &param,
    )
    .map(|seq| ParamList {
        params: seq.items,
        span: seq.span,
    })
}

fn param<'t>(cursor: Cursor<'t>) -> Outcome<'t, Param> {
    let start = cursor.span();
    let mut group = Group::new(cursor);
    let ty = group.defining(&type_expr);
    let name = group.required_or(&ident(), "parameter name", Ident::synthesized);
    let span = start.cover(group.cursor().gap_span());
    let node = ty.zip(name).map(|(ty, name)| Param { ty, name, span });
    group.finish(node)
}

/// `Type name = init;` or `Type name;`
///
/// The production commits only once the `=` or the terminator is seen, so a
/// `Type name (` sequence stays available for the function strategy.
pub(crate) fn variable_def<'t>(cursor: Cursor<'t>) -> Outcome<'t, VariableDef> {
    let start = cursor.span();
    let mut group = Group::new(cursor);
    specifiers(&mut group, false);
    let ty = group.defining(&type_expr);
    let name = group.defining(&ident());

    let init = if group.optional(&token(TokenKind::Eq)).is_some() {
        let init = group.required(&crate::expr::expression, "initializer");
        group.required_stop(&token(TokenKind::Semi), "';'");
        init
    } else if group.optional(&token(TokenKind::Semi)).is_some() {
        None
    } else {
        group.reject();
        None
    };

    let span = start.cover(group.cursor().gap_span());
    let node = ty.zip(name).map(|(ty, name)| VariableDef {
        ty,
        name,
        init,
        span,
    });
    group.finish(node)
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use colang_ast::{GlobalDef, Stmt};
    use colang_diag::{FileId, Issue, IssueCode};
    use colang_lexer::tokenize;

    fn parse_source(source: &str) -> (colang_ast::TranslationUnit, Vec<Issue>) {
        let (tokens, lex_issues) = tokenize(FileId(0), source);
        assert!(lex_issues.is_empty(), "lexical issues: {lex_issues:?}");
        parse(&tokens)
    }

    #[test]
    fn parses_function_definition() {
        let (unit, issues) = parse_source("int main() { return 0; }");
        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(unit.defs.len(), 1);
        match &unit.defs[0] {
            GlobalDef::Function(f) => {
                assert_eq!(f.name.name, "main");
                assert_eq!(f.return_type.name.name, "int");
                assert!(f.params.params.is_empty());
                let body = f.body.as_ref().unwrap();
                assert_eq!(body.stmts.len(), 1);
                assert!(matches!(body.stmts[0], Stmt::Return(_)));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn parses_native_function_header() {
        let (unit, issues) = parse_source("native void print(int value);");
        assert!(issues.is_empty(), "{issues:?}");
        match &unit.defs[0] {
            GlobalDef::Function(f) => {
                assert!(f.specifiers.native);
                assert!(f.body.is_none());
                assert_eq!(f.params.params.len(), 1);
                assert_eq!(f.params.params[0].ty.name.name, "int");
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn distinguishes_variable_from_function() {
        let (unit, issues) = parse_source("int x = 5;\nint f() {}");
        assert!(issues.is_empty(), "{issues:?}");
        assert!(matches!(unit.defs[0], GlobalDef::Variable(_)));
        assert!(matches!(unit.defs[1], GlobalDef::Function(_)));
    }

    #[test]
    fn parses_type_with_methods() {
        let (unit, issues) = parse_source("struct Point { int getX() { return 0; } }");
        assert!(issues.is_empty(), "{issues:?}");
        match &unit.defs[0] {
            GlobalDef::Type(t) => {
                assert_eq!(t.name.name, "Point");
                let body = t.body.as_ref().unwrap();
                assert_eq!(body.methods.len(), 1);
                assert_eq!(body.methods[0].name.name, "getX");
            }
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_specifier_warns() {
        let (unit, issues) = parse_source("native native struct int;");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::DuplicateSpecifier);
        match &unit.defs[0] {
            GlobalDef::Type(t) => assert!(t.specifiers.native),
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn misplaced_specifier_errors() {
        let (unit, issues) = parse_source("native int x = 1;");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::MisplacedSpecifier);
        assert!(matches!(unit.defs[0], GlobalDef::Variable(_)));
    }

    #[test]
    fn truncated_type_body_still_yields_the_type() {
        // Both the method body and the type body are missing their closer.
        let (unit, issues) = parse_source("struct S { void m() { ");
        let missing: Vec<_> = issues
            .iter()
            .filter(|i| i.code == IssueCode::MissingToken)
            .collect();
        assert!(missing.len() >= 2, "issues: {issues:?}");
        assert_eq!(unit.defs.len(), 1);
        match &unit.defs[0] {
            GlobalDef::Type(t) => {
                assert_eq!(t.name.name, "S");
                assert_eq!(t.body.as_ref().unwrap().methods.len(), 1);
            }
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn junk_at_top_level_is_skipped() {
        let (unit, issues) = parse_source("; int f() {} ;");
        assert_eq!(unit.defs.len(), 1);
        assert_eq!(
            issues
                .iter()
                .filter(|i| i.code == IssueCode::UnexpectedToken)
                .count(),
            2
        );
    }

    #[test]
    fn all_spans_lie_within_the_source() {
        let source = "struct S { int m(int a) { return a; } }\nint g = 1;\nint f() { g = 2; }";
        let (unit, issues) = parse_source(source);
        assert!(issues.is_empty(), "{issues:?}");
        let lines: Vec<&str> = source.lines().collect();
        for def in &unit.defs {
            let span = def.span();
            assert!((span.end_line as usize) < lines.len());
            assert!(span.end_char as usize <= lines[span.end_line as usize].chars().count());
        }
    }
}
