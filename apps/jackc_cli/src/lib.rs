//! # jackc
//!
//! Command-line compiler for the Jack language (nand2tetris).
//!
//! Takes a directory, recursively compiles every `.jack` file it finds into
//! the matching `.vm` stack-machine assembly, and reports diagnostics to
//! stderr. All command logic lives in [`cli`] for testability; the binary in
//! `main.rs` is a thin wrapper that translates the result into a process
//! exit code.
//!
//! # Usage
//!
//! ```text
//! jackc <path>
//! ```
//!
//! `path` may be a single project directory or any directory tree containing
//! `.jack` files; every match is compiled as one combined program so that
//! cross-class calls resolve.

pub mod cli;
pub mod compile;

pub use cli::run_cli;
