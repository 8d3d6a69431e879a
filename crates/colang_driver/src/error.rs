//! Error types for the compilation driver.

use thiserror::Error;

/// Fatal conditions that stop a compile outright. Ordinary source problems
/// are not errors in this sense; they travel as diagnostics.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "prelude not found; searched $HOME/.colang-libs and the system library directories"
    )]
    PreludeNotFound,

    #[error("code generation error: {0}")]
    Codegen(#[from] colang_codegen::CodegenError),
}

/// Result type for driver operations.
pub type CompileResult<T> = Result<T, CompileError>;
