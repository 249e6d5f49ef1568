//! VM instruction emission, one module per concern: shared context
//! ([`context`]), statements ([`stmt`]), expressions ([`expr`]), and the
//! top-level per-class/per-subroutine walk ([`program`]).

pub mod context;
pub mod expr;
pub mod program;
pub mod stmt;

pub use context::{segment_for_kind, GenCtx, LabelAllocator, Segment};
pub use expr::{generate_call, generate_expression};
pub use program::generate_program;
pub use stmt::generate_statements;
