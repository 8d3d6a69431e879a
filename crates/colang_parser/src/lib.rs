//! Recursive-descent parsing for CO.
//!
//! The parser is built from composable *strategies*: operations over an
//! immutable token cursor that either succeed with a node, commit but fail
//! (`Malformed`), or decline without consuming anything (`NoMatch`). The
//! three-way split is what makes local error recovery work: a caller can try
//! alternatives on `NoMatch` and keep going past a `Malformed` region while
//! preserving its diagnostics.

mod cursor;
mod decl;
mod expr;
mod stmt;
mod strategy;

pub use cursor::Cursor;
pub use strategy::{
    enclosed, ident, sequence, token, EnclosedSeq, Group, Outcome, Strategy, StrategyUnion,
};

use colang_ast::TranslationUnit;
use colang_diag::{Issue, IssueCode};
use colang_lexer::Token;

/// Parses a token stream into a translation unit.
///
/// Never fails: junk at top level is reported and skipped, malformed
/// definitions contribute their diagnostics, and the returned tree is always
/// structurally complete.
pub fn parse(tokens: &[Token]) -> (TranslationUnit, Vec<Issue>) {
    let mut cursor = Cursor::new(tokens);
    let mut defs = Vec::new();
    let mut issues = Vec::new();

    loop {
        let (chunk, chunk_issues, rest) =
            sequence(&|c| decl::GLOBAL_DEF.apply(c), cursor);
        defs.extend(chunk);
        issues.extend(chunk_issues);
        cursor = rest;

        if cursor.at_end() {
            break;
        }
        issues.push(Issue::error(
            IssueCode::UnexpectedToken,
            cursor.span(),
            format!("expected a definition, found {}", cursor.kind()),
        ));
        cursor = cursor.skip_one();
    }

    let span = match (defs.first(), defs.last()) {
        (Some(first), Some(last)) => first.span().cover(last.span()),
        _ => cursor.span(),
    };

    (TranslationUnit { defs, span }, issues)
}
