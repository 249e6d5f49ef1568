//! Shared state for the GENERATE walk: segment mapping, label allocation,
//! and the per-subroutine cursor threaded through `program.rs`/`stmt.rs`/
//! `expr.rs`.
//!
//! The label allocator is the one piece of state that must outlive a single
//! class: prefixes are unique *per program*, not per class or per
//! subroutine, so `generate_program` owns one [`LabelAllocator`] and passes
//! it by `&mut` all the way down.

use std::collections::HashMap;

use jackc_sema::Kind;

/// A VM memory segment, named exactly as `push`/`pop` expect it to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

/// `Static -> static, Field -> this, Arg -> argument, Var -> local`. Any
/// other kind (`Class`, or a subroutine kind) names something that is never
/// the target of a `push`/`pop`.
pub fn segment_for_kind(kind: Kind) -> Option<Segment> {
    match kind {
        Kind::Static => Some(Segment::Static),
        Kind::Field => Some(Segment::This),
        Kind::Arg => Some(Segment::Argument),
        Kind::Var => Some(Segment::Local),
        Kind::Class | Kind::Constructor | Kind::Function | Kind::Method => None,
    }
}

pub fn emit_push(out: &mut String, segment: Segment, index: u32) {
    out.push_str(&format!("push {} {}\n", segment.name(), index));
}

pub fn emit_pop(out: &mut String, segment: Segment, index: u32) {
    out.push_str(&format!("pop {} {}\n", segment.name(), index));
}

/// `true` once the last non-blank line written is exactly `return`, used to
/// decide whether a non-void subroutine needs a synthesized `push constant
/// 0; return` appended (open question resolved in favor of auto-termination
/// at codegen time rather than raising an error earlier in the pipeline).
pub fn ends_with_return(out: &str) -> bool {
    out.trim_end().ends_with("return")
}

/// Per-prefix label counters. First request for a prefix returns
/// `<prefix>_0`, the next `<prefix>_1`, and so on, for the lifetime of one
/// `generate_program` call.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    counters: HashMap<String, u32>,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let label = format!("{prefix}_{counter}");
        *counter += 1;
        label
    }
}

/// Which class and which scope the walk is currently inside. Analogous to
/// `AnalyzeCtx` in the ANALYZE phase, but GENERATE never mutates it
/// mid-subroutine — every statement and expression in one subroutine body
/// shares the same class and table.
pub struct GenCtx {
    pub current_class: jackc_base::Symbol,
    pub current_table: jackc_sema::TableId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_allocator_numbers_each_prefix_independently() {
        let mut labels = LabelAllocator::new();
        assert_eq!(labels.next("IF_TRUE"), "IF_TRUE_0");
        assert_eq!(labels.next("IF_FALSE"), "IF_FALSE_0");
        assert_eq!(labels.next("IF_TRUE"), "IF_TRUE_1");
    }

    #[test]
    fn ends_with_return_ignores_trailing_newline() {
        assert!(ends_with_return("push constant 0\nreturn\n"));
        assert!(!ends_with_return("push constant 0\n"));
    }

    #[test]
    fn segment_for_kind_matches_the_four_storable_kinds() {
        assert_eq!(segment_for_kind(Kind::Static), Some(Segment::Static));
        assert_eq!(segment_for_kind(Kind::Field), Some(Segment::This));
        assert_eq!(segment_for_kind(Kind::Arg), Some(Segment::Argument));
        assert_eq!(segment_for_kind(Kind::Var), Some(Segment::Local));
        assert_eq!(segment_for_kind(Kind::Class), None);
    }
}
