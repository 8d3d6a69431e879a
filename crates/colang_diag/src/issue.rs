//! The structured diagnostic model.

use crate::SourceSpan;
use std::cmp::Reverse;

/// How serious an issue is. Errors block code generation; warnings never do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A machine-readable tag identifying what went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueCode {
    // Lexical
    BadCharacter,
    UnterminatedString,

    // Syntactic
    MissingToken,
    UnexpectedToken,
    MalformedConstruct,

    // Declarations
    DuplicateSymbol,
    UnknownType,
    DuplicateSpecifier,
    MisplacedSpecifier,

    // Expressions
    UnknownIdentifier,
    NoMatchingOverload,
    AmbiguousCall,
    TypeMismatch,
    NotAssignable,

    // Control flow
    MissingReturnStatement,
    UnreachableCode,
    ReturnWithoutValue,
    ReturnWithValueInVoid,

    // Hygiene
    UnusedSymbol,
}

/// Extra context attached to an issue, optionally pointing somewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub span: Option<SourceSpan>,
    pub message: String,
}

/// A single diagnostic. Immutable once emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    pub code: IssueCode,
    pub span: SourceSpan,
    pub message: String,
    pub notes: Vec<Note>,
}

impl Issue {
    pub fn error(code: IssueCode, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            span,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn warning(code: IssueCode, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            span,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, span: Option<SourceSpan>, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Sorts issues into reporting order: by file, then `(start_line asc,
/// start_char asc, end_line desc, end_char desc)` so that on ties an
/// enclosing span precedes the spans it encloses. The sort is stable, so
/// issues at identical spans keep emission order, and re-sorting is
/// idempotent.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by_key(|i| {
        (
            i.span.file,
            i.span.start_line,
            i.span.start_char,
            Reverse(i.span.end_line),
            Reverse(i.span.end_char),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileId;

    fn issue(sl: u32, sc: u32, el: u32, ec: u32) -> Issue {
        Issue::error(
            IssueCode::TypeMismatch,
            SourceSpan::new(FileId(0), sl, sc, el, ec),
            "x",
        )
    }

    #[test]
    fn enclosing_spans_sort_first() {
        let outer = issue(1, 0, 3, 5);
        let inner = issue(1, 0, 2, 2);
        let mut issues = vec![inner.clone(), outer.clone()];
        sort_issues(&mut issues);
        assert_eq!(issues, vec![outer, inner]);
    }

    #[test]
    fn sort_is_idempotent() {
        let mut issues = vec![issue(2, 0, 2, 4), issue(0, 1, 0, 3), issue(0, 1, 1, 0)];
        sort_issues(&mut issues);
        let once = issues.clone();
        sort_issues(&mut issues);
        assert_eq!(issues, once);
    }
}
