//! Source locations and diagnostics for the CO compiler.
//!
//! Every later stage of the pipeline speaks in terms of this crate: spans
//! locate tokens and syntax nodes, and `Issue` is the one structured
//! diagnostic currency. Rendering (color, localization, underlines) lives in
//! [`render`] and is strictly separate from the structured data so tests can
//! assert on issues without parsing terminal output.

mod issue;
mod render;
mod source;
mod span;

pub use issue::{sort_issues, Issue, IssueCode, Note, Severity};
pub use render::Renderer;
pub use source::{SourceFile, SourceMap};
pub use span::{FileId, SourceSpan};
