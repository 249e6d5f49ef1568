#![cfg_attr(docsrs, feature(doc_cfg))]

//! # jackc-base
//!
//! Pure structural atoms shared by every crate in the pipeline.
//!
//! This crate provides the foundational types used throughout jackc:
//!
//! - [`Arena`] — bump allocation for stable AST references
//! - [`Interner`]/[`Symbol`] — string interning for O(1) equality
//! - [`Span`]/[`SourceLoc`] — source location tracking
//! - [`SpannedError`]/[`Result`] — errors with source positions
//! - [`diagnostic`] — the diagnostic taxonomy phases report through
//!
//! # Design Principles
//!
//! This crate has **no knowledge of Jack's grammar or semantics**. It
//! provides only generic, reusable infrastructure that the lexer, parser,
//! symbol table, and code generator all build upon.
//!
//! # Example
//!
//! ```
//! use jackc_base::{Arena, Interner, Span};
//!
//! let arena = Arena::new();
//! let mut interner = Interner::new();
//!
//! let hello = interner.intern("hello");
//! let span = Span::new(0, 5);
//!
//! let allocated = arena.alloc("hello");
//! assert_eq!(*allocated, "hello");
//! ```

pub mod arena;
pub mod diagnostic;
pub mod error;
pub mod intern;
pub mod span;

pub use arena::Arena;
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticSink, Phase, Severity};
pub use error::{Result, SpannedError};
pub use intern::{Interner, Symbol, SymbolEq};
pub use span::{SourceLoc, Span};
