#![cfg_attr(docsrs, feature(doc_cfg))]

//! # jackc-codegen
//!
//! VM instruction emission for jackc: the GENERATE phase.
//!
//! Runs only once ANALYZE has finished without a fatal diagnostic. Every
//! `Expression`/`Term`/`VarTerm`/`SubroutineCall` node it visits already
//! carries a resolved `Type`; GENERATE's own job is purely mechanical:
//! translate the grammar's five statement forms and handful of term kinds
//! into push/pop/arithmetic/control/subroutine VM instructions, one
//! `function` block per subroutine, one output string per class.
//!
//! See [`codegen::program::generate_program`] for the entry point.

pub mod codegen;

pub use codegen::{generate_program, segment_for_kind, GenCtx, LabelAllocator, Segment};
