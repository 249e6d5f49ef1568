#![cfg_attr(docsrs, feature(doc_cfg))]

//! # jackc-driver
//!
//! Pipeline orchestration: directory discovery, standard-library seeding, and
//! the four-phase walk (lex/parse, BUILD, ANALYZE, GENERATE) tied together
//! into one call per compile run.
//!
//! [`compile_directory`] owns the single [`CompileUnit`] for an invocation —
//! one `Arena`, one `Interner`, one `SymbolTables`, one `DiagnosticSink` —
//! and is the only place in the workspace that sequences phases against
//! `DiagnosticSink::has_fatal`.

pub mod discover;
pub mod stdlib_data;

use std::fs;
use std::path::Path;

use jackc_base::{Arena, DiagnosticSink, Interner};
use jackc_codegen::generate_program;
use jackc_sema::{add_stdlib_table, analyze_program, build_program, Scope, SymbolTables, TableId};
use jackc_syntax::ast::{Class, Program};
use jackc_syntax::{Lexer, Parser};
use tracing::{info, info_span};

pub use discover::{discover_jack_files, DiscoveredFile};

/// The resources a single compile run owns for its entire lifetime: the
/// arena every token/AST node/symbol-table record is allocated from, the
/// string interner, and the one global symbol table BUILD/ANALYZE populate.
/// Not `Send`: matches the single-owner, single-threaded resource model the
/// rest of the pipeline assumes.
pub struct CompileUnit {
    pub arena: Arena,
    pub interner: Interner,
    pub tables: SymbolTables,
    pub global: TableId,
}

impl CompileUnit {
    pub fn new() -> Self {
        let arena = Arena::new();
        let interner = Interner::new();
        let mut tables = SymbolTables::new();
        let global = tables.create_table(Scope::Global, None);
        CompileUnit { arena, interner, tables, global }
    }
}

impl Default for CompileUnit {
    fn default() -> Self {
        Self::new()
    }
}

/// The outcome of one [`compile_directory`] call.
pub struct CompileReport {
    pub diagnostics: DiagnosticSink,
    /// Needed to resolve the [`jackc_base::Symbol`] file names carried on
    /// each diagnostic's [`jackc_base::SourceLoc`] back into text.
    pub interner: Interner,
    pub files_compiled: usize,
    pub fatal: bool,
}

/// Discovers every `.jack` file under `root`, compiles them as one combined
/// program, and writes one `.vm` file per source file.
///
/// Returns immediately (with `files_compiled: 0`) if `root` is not a
/// directory — there is nothing to seed a [`DiagnosticSink`] about, since
/// that is an ambient filesystem failure, not a diagnostic about a Jack
/// program (see §7 of the governing design).
pub fn compile_directory(root: &Path) -> std::io::Result<CompileReport> {
    let span = info_span!("compile_directory", root = %root.display());
    let _enter = span.enter();

    let files = discover_jack_files(root)?;
    info!(count = files.len(), "discovered jack files");

    let mut unit = CompileUnit::new();
    let mut diagnostics = DiagnosticSink::new();

    let catalog = stdlib_data::embedded_catalog()
        .expect("assets/stdlib/stdlib.json is a build-time asset, not user input");
    add_stdlib_table(&mut unit.tables, unit.global, &catalog, &mut unit.interner);
    info!("standard library seeded");

    let mut classes: Vec<&Class<'_>> = Vec::with_capacity(files.len());
    for file in &files {
        let source = fs::read_to_string(&file.source_path)?;
        let file_span = info_span!("compile_file", path = %file.source_path.display());
        let _file_enter = file_span.enter();

        let file_symbol = unit.interner.intern(&file.source_path.to_string_lossy());
        let mut lexer = Lexer::new(&source, file_symbol);
        let queue = lexer.lex(&unit.arena, &mut unit.interner, &mut diagnostics);
        let mut parser = Parser::new(queue, &unit.arena, &mut unit.interner, &mut diagnostics);
        let class = parser.parse_class();
        classes.push(unit.arena.alloc(class));
    }

    if diagnostics.has_fatal() {
        return Ok(CompileReport { diagnostics, interner: unit.interner, files_compiled: 0, fatal: true });
    }

    let class_refs = unit.arena.alloc_slice(classes);
    let program = Program { classes: class_refs };

    build_program(&mut unit.tables, &mut unit.interner, &mut diagnostics, unit.global, &program);
    if diagnostics.has_fatal() {
        return Ok(CompileReport { diagnostics, interner: unit.interner, files_compiled: 0, fatal: true });
    }

    analyze_program(&unit.tables, &mut unit.interner, &mut diagnostics, unit.global, &program);
    if diagnostics.has_fatal() {
        return Ok(CompileReport { diagnostics, interner: unit.interner, files_compiled: 0, fatal: true });
    }

    let outputs = generate_program(&unit.tables, &unit.interner, &mut diagnostics, unit.global, &program);
    if diagnostics.has_fatal() {
        return Ok(CompileReport { diagnostics, interner: unit.interner, files_compiled: 0, fatal: true });
    }

    // GENERATE is keyed by class name; one `.jack` file holds exactly one
    // class (§4.4's grammar), so source order pairs each output back to the
    // `DiscoveredFile` it came from.
    for ((_, vm), discovered) in outputs.iter().zip(files.iter()) {
        fs::write(&discovered.output_path, vm)?;
    }
    info!(files = outputs.len(), "wrote .vm output");

    Ok(CompileReport { diagnostics, interner: unit.interner, files_compiled: outputs.len(), fatal: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write as _;

    fn write_file(path: &Path, contents: &str) {
        let mut f = File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn clean_program_produces_one_vm_file_per_source() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Main.jack"), "class Main { function void main() { return; } }");

        let report = compile_directory(dir.path()).unwrap();
        assert!(!report.fatal);
        assert_eq!(report.files_compiled, 1);
        assert!(dir.path().join("Main.vm").exists());
    }

    #[test]
    fn semantic_error_writes_no_vm_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Main.jack"), "class Main { function int f() { return true; } }");

        let report = compile_directory(dir.path()).unwrap();
        assert!(report.fatal);
        assert!(!dir.path().join("Main.vm").exists());
        assert!(report.diagnostics.has_fatal());
    }

    #[test]
    fn multi_class_program_resolves_cross_class_calls() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Util.jack"), "class Util { function int square(int n) { return n * n; } }");
        write_file(
            &dir.path().join("Main.jack"),
            "class Main { function void main() { var int v; let v = Util.square(3); return; } }",
        );

        let report = compile_directory(dir.path()).unwrap();
        assert!(!report.fatal);
        assert_eq!(report.files_compiled, 2);
        assert!(dir.path().join("Util.vm").exists());
        assert!(dir.path().join("Main.vm").exists());
    }

    #[test]
    fn bad_root_directory_is_an_io_error_not_a_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does_not_exist");
        assert!(compile_directory(&missing).is_err());
    }
}
