//! Re-exports the pipeline entry point from [`jackc_driver`].
//!
//! Kept as its own module, mirroring [`cli`][crate::cli], so the CLI never
//! needs a direct dependency on `jackc-sema`/`jackc-codegen` to drive a
//! compile — only on the driver crate that already sequences them.

pub use jackc_driver::{compile_directory, CompileReport};
