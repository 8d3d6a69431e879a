//! End-to-end analyzer tests: parse a source against the test prelude,
//! analyze, run the return-flow checker, and assert on structured issues.

use colang_diag::{FileId, Issue, IssueCode, Severity};
use colang_lexer::tokenize;
use colang_parser::parse;
use colang_sema::{analyze, check_returns, ExprKind, Program, Stmt};

const PRELUDE: &str = r#"
native struct void;
native struct int;
native struct float;
native struct bool;
native struct string;

native void print(int value);
native void print(float value);
native void print(string value);
native void println();
native int readInt();
"#;

fn parse_unit(file: FileId, source: &str) -> colang_ast::TranslationUnit {
    let (tokens, lex_issues) = tokenize(file, source);
    assert!(lex_issues.is_empty(), "lexical issues: {lex_issues:?}");
    let (unit, parse_issues) = parse(&tokens);
    assert!(parse_issues.is_empty(), "parse issues: {parse_issues:?}");
    unit
}

/// Analyzes `source` with the prelude and returns the program plus all
/// analysis and return-flow issues.
fn check(source: &str) -> (Program, Vec<Issue>) {
    let prelude = parse_unit(FileId(0), PRELUDE);
    let unit = parse_unit(FileId(1), source);
    let (program, mut issues) = analyze(&[&prelude, &unit]);
    issues.extend(check_returns(&program));
    (program, issues)
}

fn codes(issues: &[Issue]) -> Vec<IssueCode> {
    issues.iter().map(|i| i.code).collect()
}

#[test]
fn hello_world_native_call() {
    let (_, issues) = check("void main() { print(42); }");
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn missing_return() {
    let (_, issues) = check("int f() { }");
    assert_eq!(codes(&issues), vec![IssueCode::MissingReturnStatement]);
    // The diagnostic points just before the closing brace of the body.
    let source = "int f() { }";
    assert!(issues[0].span.is_empty());
    assert_eq!(issues[0].span.start_char as usize, source.len() - 1);
}

#[test]
fn unreachable_code() {
    let (_, issues) = check("int f() { return 1; return 2; }");
    assert_eq!(codes(&issues), vec![IssueCode::UnreachableCode]);
}

#[test]
fn if_else_returns_via_least_upper_bound() {
    let (_, issues) = check("float f(bool c) { if (c) return 1; else return 2.5; }");
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn if_without_else_does_not_count_as_returning() {
    let (_, issues) = check("int f(bool c) { if (c) return 1; }");
    assert_eq!(codes(&issues), vec![IssueCode::MissingReturnStatement]);
}

#[test]
fn while_body_does_not_count_as_returning() {
    let (_, issues) = check("int f(bool c) { while (c) return 1; }");
    assert_eq!(codes(&issues), vec![IssueCode::MissingReturnStatement]);
}

#[test]
fn return_without_value_in_non_void_function() {
    let (_, issues) = check("int f() { return; }");
    assert_eq!(codes(&issues), vec![IssueCode::ReturnWithoutValue]);
}

#[test]
fn return_with_value_in_void_function() {
    let (_, issues) = check("void f() { return 1; }");
    assert_eq!(codes(&issues), vec![IssueCode::ReturnWithValueInVoid]);
}

#[test]
fn exact_overload_beats_converted_one() {
    let (program, issues) = check(
        "void g(int x) { print(x); }\n\
         void g(float x) { print(x); }\n\
         void main() { g(1); }",
    );
    assert!(issues.is_empty(), "{issues:?}");

    let main = program
        .functions
        .iter()
        .find(|f| f.name == "main")
        .expect("main exists");
    let body = main.body.as_ref().unwrap();
    match &body.stmts[0] {
        Stmt::Expr(expr) => match &expr.kind {
            ExprKind::Call { function, .. } => {
                let callee = program.function(*function);
                let param_ty = program.variable(callee.params[0]).ty;
                assert_eq!(program.ty(param_ty).name, "int");
            }
            other => panic!("expected call, got {other:?}"),
        },
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn converted_argument_gets_a_coercion_node() {
    let (program, issues) = check("void main() { float f = 1; print(f); }");
    assert!(issues.is_empty(), "{issues:?}");
    let main = program.functions.iter().find(|f| f.name == "main").unwrap();
    let body = main.body.as_ref().unwrap();
    match &body.stmts[0] {
        Stmt::VarDef(def) => {
            let init = def.init.as_ref().unwrap();
            assert!(matches!(init.kind, ExprKind::Convert { .. }));
            assert_eq!(program.ty(init.ty).name, "float");
        }
        other => panic!("expected variable definition, got {other:?}"),
    }
}

#[test]
fn no_matching_overload() {
    let (_, issues) = check("void main() { print(true); }");
    assert_eq!(codes(&issues), vec![IssueCode::NoMatchingOverload]);
}

#[test]
fn unknown_identifier() {
    let (_, issues) = check("void main() { y = 1; }");
    assert_eq!(codes(&issues), vec![IssueCode::UnknownIdentifier]);
}

#[test]
fn unknown_type() {
    let (_, issues) = check("Widget w;");
    assert_eq!(codes(&issues), vec![IssueCode::UnknownType]);
}

#[test]
fn duplicate_symbol_references_both_definitions() {
    let (_, issues) = check("int x = 1;\nint x = 2;");
    assert_eq!(codes(&issues), vec![IssueCode::DuplicateSymbol]);
    assert_eq!(issues[0].span.start_line, 1);
    let note = &issues[0].notes[0];
    assert_eq!(note.span.unwrap().start_line, 0);
}

#[test]
fn condition_must_be_boolean_but_branches_still_checked() {
    let (_, issues) = check("void main() { if (1) { undefined(); } }");
    assert_eq!(
        codes(&issues),
        vec![IssueCode::TypeMismatch, IssueCode::UnknownIdentifier]
    );
}

#[test]
fn assignment_needs_a_place_expression() {
    let (_, issues) = check("void main() { 1 = 2; }");
    assert_eq!(codes(&issues), vec![IssueCode::NotAssignable]);
}

#[test]
fn method_dispatch_through_a_receiver() {
    let (_, issues) = check(
        "struct Counter { int bump(int amount) { return amount + 1; } }\n\
         Counter c;\n\
         void main() { print(c.bump(41)); }",
    );
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn methods_can_reach_the_receiver_as_this() {
    let (_, issues) = check(
        "struct Counter {\n\
            int one() { return 1; }\n\
            int two() { return this.one() + this.one(); }\n\
         }",
    );
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn unknown_method() {
    let (_, issues) = check(
        "struct Counter { }\n\
         Counter c;\n\
         void main() { c.missing(); }",
    );
    assert_eq!(codes(&issues), vec![IssueCode::UnknownIdentifier]);
}

#[test]
fn unused_local_variable_warns() {
    let (_, issues) = check("void main() { int x = 1; }");
    assert_eq!(codes(&issues), vec![IssueCode::UnusedSymbol]);
    assert_eq!(issues[0].severity, Severity::Warning);
}

#[test]
fn error_type_does_not_cascade() {
    // The unknown identifier produces exactly one issue even though the
    // broken expression is used in arithmetic, a call, and a return.
    let (_, issues) = check("int f() { return nope + 1; }");
    assert_eq!(codes(&issues), vec![IssueCode::UnknownIdentifier]);
}

#[test]
fn global_initializer_is_type_checked() {
    let (_, issues) = check("int x = \"text\";");
    assert_eq!(codes(&issues), vec![IssueCode::TypeMismatch]);
}

#[test]
fn mixed_arithmetic_promotes_to_float() {
    let (_, issues) = check("void main() { print(1 + 2.5); }");
    // 1 + 2.5 is float, so print(float) applies.
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn logical_operators_require_booleans() {
    let (_, issues) = check("void main() { bool b = true; b = 1 && true; }");
    assert_eq!(codes(&issues), vec![IssueCode::TypeMismatch]);
}
