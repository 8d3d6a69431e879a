//! The compilation driver: wires the pipeline stages together, reports
//! diagnostics, and gates the backend on an error-free front-end.

mod compile;
mod error;
mod prelude;

pub use compile::{CompileOptions, CompileOutput, Driver};
pub use error::{CompileError, CompileResult};
pub use prelude::locate_prelude;
