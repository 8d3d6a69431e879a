//! Terminal rendering of diagnostics.
//!
//! The renderer owns everything presentational: the `file:line:col` header,
//! underlined source excerpts, kind-label localization and ANSI color. The
//! structured [`Issue`] never changes to accommodate any of it.

use crate::{Issue, Note, Severity, SourceMap, SourceSpan};
use std::fmt::Write;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const WHITE: &str = "\x1b[37m";
const RESET: &str = "\x1b[0m";

/// The message language, chosen from the process locale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Locale {
    English,
    Russian,
    Belarusian,
}

impl Locale {
    /// Reads `LC_ALL` / `LC_MESSAGES` / `LANG`, in that order. Anything that
    /// is not Russian or Belarusian falls back to English.
    fn from_env() -> Self {
        let value = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
            .unwrap_or_default();
        if value.starts_with("ru") {
            Locale::Russian
        } else if value.starts_with("be") {
            Locale::Belarusian
        } else {
            Locale::English
        }
    }

    fn error_label(self) -> &'static str {
        match self {
            Locale::English => "error",
            Locale::Russian => "ошибка",
            Locale::Belarusian => "памылка",
        }
    }

    fn warning_label(self) -> &'static str {
        match self {
            Locale::English => "warning",
            Locale::Russian => "предупреждение",
            Locale::Belarusian => "папярэджанне",
        }
    }

    fn note_label(self) -> &'static str {
        match self {
            Locale::English => "note",
            Locale::Russian => "примечание",
            Locale::Belarusian => "заўвага",
        }
    }
}

/// Renders issues against the source map they refer to.
pub struct Renderer<'a> {
    map: &'a SourceMap,
    locale: Locale,
    color: bool,
}

impl<'a> Renderer<'a> {
    /// A renderer with locale from the environment and color enabled.
    pub fn new(map: &'a SourceMap) -> Self {
        Self {
            map,
            locale: Locale::from_env(),
            color: true,
        }
    }

    /// A colorless English renderer, for tests and piped output.
    pub fn plain(map: &'a SourceMap) -> Self {
        Self {
            map,
            locale: Locale::English,
            color: false,
        }
    }

    /// Writes every issue to standard error.
    pub fn emit(&self, issues: &[Issue]) {
        for issue in issues {
            eprint!("{}", self.render(issue));
        }
    }

    /// Renders one issue, including its notes, as a multi-line string.
    pub fn render(&self, issue: &Issue) -> String {
        let mut out = String::new();
        let (label, color) = match issue.severity {
            Severity::Error => (self.locale.error_label(), RED),
            Severity::Warning => (self.locale.warning_label(), YELLOW),
        };
        self.render_headline(&mut out, issue.span, label, color, &issue.message);
        self.render_excerpt(&mut out, issue.span);
        for note in &issue.notes {
            self.render_note(&mut out, note);
        }
        out
    }

    fn render_headline(
        &self,
        out: &mut String,
        span: SourceSpan,
        label: &str,
        color: &str,
        message: &str,
    ) {
        let file = self.map.get(span.file);
        let painted = if self.color {
            format!("{color}{label}{RESET}")
        } else {
            label.to_string()
        };
        let _ = writeln!(
            out,
            "{}:{}:{}: {}: {}",
            file.name(),
            span.start_line + 1,
            span.start_char + 1,
            painted,
            message
        );
    }

    fn render_note(&self, out: &mut String, note: &Note) {
        let label = self.locale.note_label();
        let painted = if self.color {
            format!("{WHITE}{label}{RESET}")
        } else {
            label.to_string()
        };
        match note.span {
            Some(span) => {
                let file = self.map.get(span.file);
                let _ = writeln!(
                    out,
                    "{}:{}:{}: {}: {}",
                    file.name(),
                    span.start_line + 1,
                    span.start_char + 1,
                    painted,
                    note.message
                );
                self.render_excerpt(out, span);
            }
            None => {
                let _ = writeln!(out, "{}: {}", painted, note.message);
            }
        }
    }

    /// Prints the source lines the span covers, each followed by an underline
    /// clipped to the part of the span on that line. Zero-width spans get a
    /// single caret.
    fn render_excerpt(&self, out: &mut String, span: SourceSpan) {
        let file = self.map.get(span.file);
        for line_no in span.start_line..=span.end_line.min(file.line_count().saturating_sub(1)) {
            let line = file.line(line_no);
            let width = line.chars().count() as u32;
            let from = if line_no == span.start_line {
                span.start_char.min(width)
            } else {
                0
            };
            let to = if line_no == span.end_line {
                span.end_char.min(width)
            } else {
                width
            };
            let _ = writeln!(out, "{line}");
            let pad = " ".repeat(from as usize);
            let underline = if to > from {
                "~".repeat((to - from) as usize)
            } else {
                "^".to_string()
            };
            let _ = writeln!(out, "{pad}{underline}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileId, IssueCode};

    fn map() -> SourceMap {
        let mut map = SourceMap::new();
        map.add("main.co", "void main() {\n    bad token\n}\n");
        map
    }

    #[test]
    fn headline_is_one_based() {
        let map = map();
        let issue = Issue::error(
            IssueCode::UnexpectedToken,
            SourceSpan::new(FileId(0), 1, 4, 1, 7),
            "unexpected token",
        );
        let rendered = Renderer::plain(&map).render(&issue);
        assert!(rendered.starts_with("main.co:2:5: error: unexpected token\n"));
        assert!(rendered.contains("    bad token\n    ~~~\n"));
    }

    #[test]
    fn zero_width_span_renders_caret() {
        let map = map();
        let issue = Issue::error(
            IssueCode::MissingToken,
            SourceSpan::point(FileId(0), 2, 0),
            "expected closing brace",
        );
        let rendered = Renderer::plain(&map).render(&issue);
        assert!(rendered.contains("}\n^\n"));
    }

    #[test]
    fn notes_follow_the_issue() {
        let map = map();
        let issue = Issue::error(
            IssueCode::DuplicateSymbol,
            SourceSpan::new(FileId(0), 1, 4, 1, 7),
            "duplicate symbol",
        )
        .with_note(Some(SourceSpan::new(FileId(0), 0, 5, 0, 9)), "first defined here");
        let rendered = Renderer::plain(&map).render(&issue);
        assert!(rendered.contains("main.co:1:6: note: first defined here"));
    }
}
