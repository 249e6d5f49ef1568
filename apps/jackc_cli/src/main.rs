//! jackc - standalone binary
//!
//! Thin wrapper around [`jackc_cli::run_cli`], handling error display and
//! exit codes. All command logic lives in the library crate for testability.
//!
//! # Exit Codes
//!
//! - `0` - clean compile
//! - `1` - compile failed (fatal diagnostics were printed) or the run could
//!   not start at all (bad root directory, I/O failure)

fn main() {
    match jackc_cli::run_cli() {
        Ok(clean) => {
            if !clean {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
