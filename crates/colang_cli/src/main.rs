//! Command-line interface for the CO compiler.

use anyhow::Context;
use clap::Parser;
use colang_driver::{CompileOptions, Driver};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "colang")]
#[command(author, version, about = "The CO-to-C compiler", long_about = None)]
struct Cli {
    /// The CO source file to compile
    input: PathBuf,

    /// The C file to write; defaults to the input with a .c extension
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    // Argument errors exit with code 2 via clap.
    let cli = Cli::parse();

    let driver = if cli.verbose {
        Driver::verbose()
    } else {
        Driver::new()
    };
    let options = CompileOptions { output: cli.out };

    let result = driver
        .compile_file(&cli.input, &options)
        .with_context(|| format!("failed to compile {}", cli.input.display()));

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
