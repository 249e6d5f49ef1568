//! Command-line argument parsing and dispatch for `jackc`.
//!
//! One positional argument: the directory to compile. Per §6 of the
//! governing design, every `*.jack` file found recursively under it is
//! compiled as a single combined program, and a `.vm` file is written next
//! to each source file. There are no subcommands — project scaffolding,
//! registries, and verification flags belong to other tools, not this one.

use std::io;
use std::path::PathBuf;

use clap::Parser;

use crate::compile::compile_directory;

/// Command-line interface for the Jack-to-VM compiler.
#[derive(Parser)]
#[command(name = "jackc")]
#[command(about = "Compiles Jack source files to VM assembly", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory to compile. Every `.jack` file found recursively underneath
    /// it is compiled as part of the same program.
    pub path: PathBuf,
}

/// Parses arguments, runs the compile, prints diagnostics, and reports
/// whether the compile was clean.
///
/// `Ok(true)` means the compile produced no fatal diagnostics; `Ok(false)`
/// means it ran to completion but reported fatal diagnostics (already
/// printed to stderr). `Err` is reserved for ambient failures — a root that
/// doesn't exist or isn't a directory, or an I/O error partway through —
/// which are not part of the compiler's own diagnostic taxonomy (§7).
pub fn run_cli() -> io::Result<bool> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();
    let report = compile_directory(&cli.path)?;

    let mut stderr = io::stderr();
    report.diagnostics.print_all(&report.interner, &mut stderr)?;
    report.diagnostics.print_summary(&mut stderr)?;

    Ok(!report.fatal)
}
