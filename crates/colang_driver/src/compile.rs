//! The main compilation pipeline.

use crate::error::{CompileError, CompileResult};
use crate::prelude::locate_prelude;
use colang_diag::{sort_issues, Issue, Renderer, SourceMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a single compile.
#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    /// The target C file. Defaults to the source path with its extension
    /// replaced by `.c` (or `.c` appended when it has none).
    pub output: Option<PathBuf>,
}

/// The result of running the front-end over a pair of sources.
pub struct CompileOutput {
    /// The files that took part in the compile, for rendering diagnostics.
    pub map: SourceMap,
    /// All issues from every phase, in reporting order.
    pub issues: Vec<Issue>,
    /// The generated C unit; `Some` iff no error-severity issue was emitted.
    pub c_source: Option<String>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }
}

/// The compilation driver.
pub struct Driver {
    verbose: bool,
}

impl Driver {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }

    /// Compiles a source file to C on disk.
    ///
    /// Diagnostics go to standard error. Returns `Ok(true)` when the backend
    /// ran and the output file was written, `Ok(false)` when compile errors
    /// blocked it.
    pub fn compile_file(&self, source_path: &Path, options: &CompileOptions) -> CompileResult<bool> {
        let prelude_path = locate_prelude().ok_or(CompileError::PreludeNotFound)?;
        let prelude_text = fs::read_to_string(&prelude_path)?;
        let source_text = fs::read_to_string(source_path)?;

        let output = self.compile_sources(
            &prelude_text,
            &prelude_path.display().to_string(),
            &source_text,
            &source_path.display().to_string(),
        )?;

        Renderer::new(&output.map).emit(&output.issues);

        match output.c_source {
            Some(c_source) => {
                let target = options
                    .output
                    .clone()
                    .unwrap_or_else(|| source_path.with_extension("c"));
                if self.verbose {
                    eprintln!("[driver] writing {}", target.display());
                }
                fs::write(target, c_source)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Runs the whole front-end over in-memory sources: lex, parse and
    /// analyze the prelude and the user file into one root namespace, run the
    /// return-flow checker, then emit C iff nothing went wrong.
    pub fn compile_sources(
        &self,
        prelude_text: &str,
        prelude_name: &str,
        source_text: &str,
        source_name: &str,
    ) -> CompileResult<CompileOutput> {
        let mut map = SourceMap::new();
        let prelude_file = map.add(prelude_name, prelude_text);
        let source_file = map.add(source_name, source_text);

        let mut issues = Vec::new();

        if self.verbose {
            eprintln!("[driver] lexing...");
        }
        let (prelude_tokens, lex_issues) = colang_lexer::tokenize(prelude_file, prelude_text);
        issues.extend(lex_issues);
        let (source_tokens, lex_issues) = colang_lexer::tokenize(source_file, source_text);
        issues.extend(lex_issues);

        if self.verbose {
            eprintln!("[driver] parsing...");
        }
        let (prelude_unit, parse_issues) = colang_parser::parse(&prelude_tokens);
        issues.extend(parse_issues);
        let (source_unit, parse_issues) = colang_parser::parse(&source_tokens);
        issues.extend(parse_issues);

        if self.verbose {
            eprintln!("[driver] analyzing...");
        }
        let (program, sema_issues) = colang_sema::analyze(&[&prelude_unit, &source_unit]);
        issues.extend(sema_issues);

        if self.verbose {
            eprintln!("[driver] checking returns...");
        }
        issues.extend(colang_sema::check_returns(&program));

        sort_issues(&mut issues);

        let has_errors = issues.iter().any(Issue::is_error);
        let c_source = if has_errors {
            None
        } else {
            if self.verbose {
                eprintln!("[driver] generating C...");
            }
            Some(colang_codegen::emit(&program)?)
        };

        Ok(CompileOutput {
            map,
            issues,
            c_source,
        })
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}
