//! Diagnostics: the error taxonomy shared by every compiler phase.
//!
//! Every phase — lexer, parser, symbol-table builder, analyzer, code
//! generator — reports problems the same way: it appends a [`Diagnostic`] to
//! a shared [`DiagnosticSink`] and, where the failure mode allows it,
//! continues so that later problems in the same run can also surface. The
//! pipeline driver consults [`DiagnosticSink::has_fatal`] between phases and
//! skips the next phase once a fatal diagnostic has been recorded.
//!
//! # Example
//!
//! ```
//! use jackc_base::{DiagnosticSink, DiagnosticCode, SourceLoc, Interner};
//!
//! let mut interner = Interner::new();
//! let file = interner.intern("Main.jack");
//! let mut sink = DiagnosticSink::new();
//! sink.error(DiagnosticCode::RedeclaredSymbol, SourceLoc::new(file, 4, 10), "'x' is already declared");
//!
//! assert!(sink.has_fatal());
//! assert_eq!(sink.error_count(), 1);
//! ```

use crate::intern::Interner;
use crate::span::SourceLoc;
use std::fmt;

/// Which pipeline stage raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Internal,
    Lexer,
    Parser,
    Semantic,
    Codegen,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Internal => "internal",
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Semantic => "semantic",
            Phase::Codegen => "codegen",
        };
        write!(f, "{s}")
    }
}

/// How serious a diagnostic is. Every code currently defined is `Fatal` for
/// its phase (see §7 of the governing spec); `Warning` exists so future
/// non-fatal checks (unused variable, shadowed field, ...) have somewhere to
/// go without widening this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Fatal,
}

/// The closed set of diagnostic codes, grouped by the phase that raises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    // INTERNAL — programmer errors in the compiler itself, not the user's program.
    MemoryAllocation,
    NullPointer,
    UnknownNodeType,
    OutOfBounds,
    BufferFull,
    BufferEmpty,

    // LEXER
    NewlineInString,
    EofInString,
    UnexpectedEof,
    IllegalSymbol,
    IntegerLiteralOverflow,

    // PARSER
    UnexpectedToken,

    // SEMANTIC
    UndeclaredSymbol,
    RedeclaredSymbol,
    InvalidSubroutine,
    InvalidType,
    InvalidKind,
    InvalidScope,
    InvalidStatement,
    InvalidExpression,
    InvalidTerm,
    InvalidOperation,
    InvalidVar,
    InvalidArgument,

    // CODEGEN
    InvalidInput,
}

impl DiagnosticCode {
    /// The phase this code always belongs to.
    pub fn phase(self) -> Phase {
        use DiagnosticCode::*;
        match self {
            MemoryAllocation | NullPointer | UnknownNodeType | OutOfBounds | BufferFull
            | BufferEmpty => Phase::Internal,
            NewlineInString | EofInString | UnexpectedEof | IllegalSymbol
            | IntegerLiteralOverflow => Phase::Lexer,
            UnexpectedToken => Phase::Parser,
            UndeclaredSymbol | RedeclaredSymbol | InvalidSubroutine | InvalidType
            | InvalidKind | InvalidScope | InvalidStatement | InvalidExpression | InvalidTerm
            | InvalidOperation | InvalidVar | InvalidArgument => Phase::Semantic,
            InvalidInput => Phase::Codegen,
        }
    }

    /// Severity derived from the code. Every code defined today is fatal for
    /// its phase; see the module docs for why `Severity::Warning` still exists.
    pub fn severity(self) -> Severity {
        Severity::Fatal
    }

    /// A short machine-stable name, used in diagnostic output.
    pub fn name(self) -> &'static str {
        use DiagnosticCode::*;
        match self {
            MemoryAllocation => "MEMORY_ALLOCATION",
            NullPointer => "NULL_POINTER",
            UnknownNodeType => "UNKNOWN_NODE_TYPE",
            OutOfBounds => "OUT_OF_BOUNDS",
            BufferFull => "BUFFER_FULL",
            BufferEmpty => "BUFFER_EMPTY",
            NewlineInString => "NEWLINE_IN_STRING",
            EofInString => "EOF_IN_STRING",
            UnexpectedEof => "UNEXPECTED_EOF",
            IllegalSymbol => "ILLEGAL_SYMBOL",
            IntegerLiteralOverflow => "INTEGER_LITERAL_OVERFLOW",
            UnexpectedToken => "UNEXPECTED_TOKEN",
            UndeclaredSymbol => "UNDECLARED_SYMBOL",
            RedeclaredSymbol => "REDECLARED",
            InvalidSubroutine => "INVALID_SUBROUTINE",
            InvalidType => "INVALID_TYPE",
            InvalidKind => "INVALID_KIND",
            InvalidScope => "INVALID_SCOPE",
            InvalidStatement => "INVALID_STATEMENT",
            InvalidExpression => "INVALID_EXPRESSION",
            InvalidTerm => "INVALID_TERM",
            InvalidOperation => "INVALID_OPERATION",
            InvalidVar => "INVALID_VAR",
            InvalidArgument => "INVALID_ARGUMENT",
            InvalidInput => "INVALID_INPUT",
        }
    }
}

/// One reported problem, with enough context to print a useful message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub loc: SourceLoc,
    pub source_excerpt: Option<String>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, loc: SourceLoc, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            phase: code.phase(),
            severity: code.severity(),
            message: message.into(),
            loc,
            source_excerpt: None,
            suggestion: None,
        }
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.source_excerpt = Some(excerpt.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Renders one formatted block, as printed to stderr by `print_all`.
    pub fn format(&self, interner: &Interner) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}: {} [{}] {}:{}:{}: {}\n",
            match self.severity {
                Severity::Fatal => "error",
                Severity::Warning => "warning",
            },
            self.phase,
            self.code.name(),
            interner.resolve(self.loc.file),
            self.loc.line,
            self.loc.offset,
            self.message,
        ));
        if let Some(excerpt) = &self.source_excerpt {
            out.push_str(&format!("    | {excerpt}\n"));
        }
        if let Some(suggestion) = &self.suggestion {
            out.push_str(&format!("    = help: {suggestion}\n"));
        }
        out
    }
}

/// Accumulates diagnostics across an entire pipeline run.
///
/// Shared by every phase of a single compile; nothing is ever removed except
/// by [`DiagnosticSink::clear`] (used between independent runs, e.g. in a
/// `--watch` loop or test harness).
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic built from its constituent parts.
    pub fn error(&mut self, code: DiagnosticCode, loc: SourceLoc, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(code, loc, message));
    }

    /// Records an already-constructed diagnostic (e.g. one carrying an
    /// excerpt or suggestion).
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Fatal)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// `true` once any fatal diagnostic has been recorded. The pipeline
    /// driver checks this between phases: BUILD must finish clean before
    /// ANALYZE starts, and ANALYZE must finish clean before GENERATE starts.
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Fatal)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Writes one formatted block per diagnostic.
    pub fn print_all(&self, interner: &Interner, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        for d in &self.diagnostics {
            write!(out, "{}", d.format(interner))?;
        }
        Ok(())
    }

    /// Writes the trailing totals-and-verdict block.
    pub fn print_summary(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        writeln!(
            out,
            "{} error(s), {} warning(s) — {}",
            self.error_count(),
            self.warning_count(),
            if self.has_fatal() { "FAILED" } else { "OK" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(interner: &mut Interner, line: u32) -> SourceLoc {
        let file = interner.intern("Main.jack");
        SourceLoc::new(file, line, 0)
    }

    #[test]
    fn fresh_sink_has_no_fatal_diagnostics() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_fatal());
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn recorded_error_is_fatal_and_counted() {
        let mut interner = Interner::new();
        let mut sink = DiagnosticSink::new();
        sink.error(DiagnosticCode::UndeclaredSymbol, loc(&mut interner, 1), "'x' is undeclared");
        assert!(sink.has_fatal());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn code_phase_mapping_matches_taxonomy() {
        assert_eq!(DiagnosticCode::IllegalSymbol.phase(), Phase::Lexer);
        assert_eq!(DiagnosticCode::UnexpectedToken.phase(), Phase::Parser);
        assert_eq!(DiagnosticCode::InvalidType.phase(), Phase::Semantic);
        assert_eq!(DiagnosticCode::InvalidInput.phase(), Phase::Codegen);
        assert_eq!(DiagnosticCode::MemoryAllocation.phase(), Phase::Internal);
    }

    #[test]
    fn format_includes_file_line_and_message() {
        let mut interner = Interner::new();
        let l = loc(&mut interner, 7);
        let diagnostic = Diagnostic::new(DiagnosticCode::RedeclaredSymbol, l, "'count' redeclared")
            .with_suggestion("rename one of the declarations");
        let rendered = diagnostic.format(&interner);
        assert!(rendered.contains("Main.jack:7"));
        assert!(rendered.contains("'count' redeclared"));
        assert!(rendered.contains("rename one of the declarations"));
    }

    #[test]
    fn clear_removes_all_diagnostics() {
        let mut interner = Interner::new();
        let mut sink = DiagnosticSink::new();
        sink.error(DiagnosticCode::InvalidType, loc(&mut interner, 2), "boom");
        sink.clear();
        assert!(sink.is_empty());
        assert!(!sink.has_fatal());
    }
}
