//! Whole-pipeline tests against the shipped prelude.

use colang_diag::{IssueCode, Severity};
use colang_driver::{CompileOutput, Driver};

const PRELUDE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../lib/prelude.co"));

fn compile(source: &str) -> CompileOutput {
    Driver::new()
        .compile_sources(PRELUDE, "prelude.co", source, "main.co")
        .expect("pipeline runs")
}

#[test]
fn hello_world_reaches_the_backend() {
    let output = compile("void main() { print(42); }");
    assert!(output.issues.is_empty(), "{:?}", output.issues);
    let c = output.c_source.expect("backend ran");
    assert!(!c.is_empty());
    assert!(c.contains("int main(void)"));
}

#[test]
fn missing_return_blocks_the_backend() {
    let output = compile("int f() { }");
    assert!(output.c_source.is_none());
    assert_eq!(output.issues.len(), 1);
    assert_eq!(output.issues[0].code, IssueCode::MissingReturnStatement);
    // The span sits immediately before the closing brace of f's body.
    let source = "int f() { }";
    assert_eq!(
        output.issues[0].span.start_char as usize,
        source.len() - 1
    );
}

#[test]
fn unreachable_code_is_flagged_without_missing_return() {
    let output = compile("int f() { return 1; return 2; }");
    assert_eq!(output.issues.len(), 1);
    assert_eq!(output.issues[0].code, IssueCode::UnreachableCode);
    assert!(output
        .issues
        .iter()
        .all(|i| i.code != IssueCode::MissingReturnStatement));
}

#[test]
fn truncated_type_still_appears_with_two_errors() {
    let output = compile("struct S { void m() { ");
    assert!(output.c_source.is_none());
    let missing = output
        .issues
        .iter()
        .filter(|i| i.code == IssueCode::MissingToken)
        .count();
    assert!(missing >= 2, "{:?}", output.issues);
}

#[test]
fn if_else_least_upper_bound_compiles_cleanly() {
    let output = compile(
        "float pick(bool c) { if (c) return 1; else return 2.5; }\n\
         void main() { print(pick(true)); }",
    );
    assert!(output.issues.is_empty(), "{:?}", output.issues);
    assert!(output.c_source.is_some());
}

#[test]
fn warnings_do_not_block_the_backend() {
    let output = compile("void main() { int unused = 1; print(2); }");
    assert_eq!(output.issues.len(), 1);
    assert_eq!(output.issues[0].severity, Severity::Warning);
    assert!(output.c_source.is_some());
}

#[test]
fn arbitrary_garbage_terminates_with_diagnostics() {
    let output = compile("@@ struct { ) ( } if else 12 \"open");
    assert!(output.c_source.is_none());
    assert!(!output.issues.is_empty());
}

#[test]
fn issues_arrive_sorted_for_reporting() {
    let output = compile(
        "void main() { unknownOne(); }\n\
         void other() { unknownTwo(); }",
    );
    let spans: Vec<_> = output.issues.iter().map(|i| i.span).collect();
    for pair in spans.windows(2) {
        assert!(
            (pair[0].file, pair[0].start_line, pair[0].start_char)
                <= (pair[1].file, pair[1].start_line, pair[1].start_char)
        );
    }
}

#[test]
fn all_issue_spans_lie_within_their_files() {
    let source = "int f( { return \n}\nstruct T missing";
    let output = compile(source);
    let line_count = source.lines().count() as u32 + 1;
    for issue in &output.issues {
        assert!(issue.span.start_line <= issue.span.end_line);
        assert!(issue.span.end_line < line_count + 1);
    }
}

#[test]
fn overloads_resolve_through_the_whole_pipeline() {
    let output = compile(
        "int twice(int x) { return x + x; }\n\
         float twice(float x) { return x + x; }\n\
         void main() { print(twice(21)); print(twice(1.5)); }",
    );
    assert!(output.issues.is_empty(), "{:?}", output.issues);
    assert!(output.c_source.is_some());
}

#[test]
fn global_state_survives_to_generated_c() {
    let output = compile(
        "int counter = 0;\n\
         void tick() { counter = counter + 1; }\n\
         void main() { tick(); tick(); print(counter); }",
    );
    assert!(output.issues.is_empty(), "{:?}", output.issues);
    let c = output.c_source.unwrap();
    assert!(c.contains("co_g_counter"));
}
