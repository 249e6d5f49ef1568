//! Integration tests for discovery and driver orchestration against a real
//! filesystem tree, as opposed to the single-file unit tests inside
//! `jackc-driver` itself.

use std::fs;

use jackc_driver::{compile_directory, discover_jack_files};

fn write(path: &std::path::Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

#[test]
fn discovers_jack_files_across_nested_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("Main.jack"), "class Main {}");
    let lib = dir.path().join("lib");
    fs::create_dir(&lib).unwrap();
    write(&lib.join("Util.jack"), "class Util {}");
    write(&lib.join("notes.md"), "not jack");

    let files = discover_jack_files(dir.path()).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f.source_path.ends_with("Main.jack")));
    assert!(files.iter().any(|f| f.source_path.ends_with("lib/Util.jack")));
}

#[test]
fn compiling_a_project_tree_writes_vm_files_next_to_each_source() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("lib");
    fs::create_dir(&lib).unwrap();
    write(&lib.join("Util.jack"), "class Util { function int id(int n) { return n; } }");
    write(
        &dir.path().join("Main.jack"),
        "class Main { function void main() { var int v; let v = Util.id(1); return; } }",
    );

    let report = compile_directory(dir.path()).unwrap();
    assert!(!report.fatal, "{:?}", report.diagnostics.diagnostics());
    assert_eq!(report.files_compiled, 2);
    assert!(lib.join("Util.vm").exists());
    assert!(dir.path().join("Main.vm").exists());
}

#[test]
fn an_undeclared_symbol_anywhere_in_the_tree_prevents_any_vm_output() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("Main.jack"),
        "class Main { function void main() { let missing = 1; return; } }",
    );

    let report = compile_directory(dir.path()).unwrap();
    assert!(report.fatal);
    assert_eq!(report.files_compiled, 0);
    assert!(!dir.path().join("Main.vm").exists());
}
