//! The C backend.
//!
//! Consumes a resolved [`colang_sema::Program`] and produces one
//! self-contained C translation unit. Runs only when no error-severity issue
//! was emitted by the front-end; the driver enforces that.

mod emit;
mod names;

pub use emit::emit;
pub use names::NameGen;

use thiserror::Error;

/// Errors during C emission.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("native type '{name}' has no registered C mapping")]
    UnknownNativeType { name: String },

    #[error("native function '{name}' has no registered C mapping")]
    UnknownNativeFunction { name: String },
}

/// Result type for backend operations.
pub type CodegenResult<T> = Result<T, CodegenError>;
