//! End-to-end pipeline tests: a whole program through lex/parse, BUILD,
//! ANALYZE, and GENERATE in one call, rather than one phase at a time.

use jackc_base::{Arena, DiagnosticSink, Interner};
use jackc_codegen::generate_program;
use jackc_sema::{add_stdlib_table, analyze_program, build_program, parse_catalog, Scope, SymbolTables};
use jackc_syntax::ast::Program;
use jackc_syntax::{Lexer, Parser};

const STDLIB: &str = r#"
{
    "Array": {
        "functions": [
            { "name": "new", "return_type": "Array", "kind": "KIND_FUNCTION",
              "parameters": [{"name": "size", "type": "int"}] }
        ],
        "methods": []
    },
    "Math": {
        "functions": [
            { "name": "multiply", "return_type": "int", "kind": "KIND_FUNCTION",
              "parameters": [{"name": "x", "type": "int"}, {"name": "y", "type": "int"}] }
        ],
        "methods": []
    }
}
"#;

fn compile(sources: &[(&str, &str)]) -> (Vec<(String, String)>, DiagnosticSink) {
    let arena = Arena::new();
    let mut interner = Interner::new();
    let mut diagnostics = DiagnosticSink::new();

    let mut tables = SymbolTables::new();
    let global = tables.create_table(Scope::Global, None);
    let catalog = parse_catalog(STDLIB).unwrap();
    add_stdlib_table(&mut tables, global, &catalog, &mut interner);

    let mut classes = Vec::new();
    for (file_name, source) in sources {
        let file = interner.intern(file_name);
        let mut lexer = Lexer::new(source, file);
        let queue = lexer.lex(&arena, &mut interner, &mut diagnostics);
        let mut parser = Parser::new(queue, &arena, &mut interner, &mut diagnostics);
        classes.push(arena.alloc(parser.parse_class()));
    }
    let class_refs = arena.alloc_slice(classes);
    let program = Program { classes: class_refs };

    build_program(&mut tables, &mut interner, &mut diagnostics, global, &program);
    if diagnostics.has_fatal() {
        return (vec![], diagnostics);
    }
    analyze_program(&tables, &mut interner, &mut diagnostics, global, &program);
    if diagnostics.has_fatal() {
        return (vec![], diagnostics);
    }
    let outputs = generate_program(&tables, &interner, &mut diagnostics, global, &program);
    let named = outputs.into_iter().map(|(sym, vm)| (interner.resolve(sym).to_string(), vm)).collect();
    (named, diagnostics)
}

#[test]
fn int_accumulation_across_a_while_loop_compiles_cleanly() {
    let source = "\
        class Main { \
            function int sum(int len) { \
                var int i, total; \
                let total = 0; \
                let i = 0; \
                while (i < len) { \
                    let total = total + i; \
                    let i = i + 1; \
                } \
                return total; \
            } \
        }";
    let (outputs, diagnostics) = compile(&[("Main.jack", source)]);
    assert!(!diagnostics.has_fatal(), "{:?}", diagnostics.diagnostics());
    assert_eq!(outputs.len(), 1);
    let vm = &outputs[0].1;
    assert!(vm.starts_with("function Main.sum 2\n"));
    assert!(vm.contains("label WHILE_START_0\n"));
    assert!(vm.contains("label WHILE_END_0\n"));
}

/// Per the array-typing rule (array access types as the array variable's own
/// declared type, not an element type), mixing an array access into `int`
/// arithmetic is a type error, not an opaque-element pass-through.
#[test]
fn array_element_used_in_arithmetic_is_a_type_mismatch() {
    let source = "\
        class Main { \
            function int sum(Array a, int len) { \
                var int i, total; \
                let total = 0; \
                let i = 0; \
                while (i < len) { \
                    let total = total + a[i]; \
                    let i = i + 1; \
                } \
                return total; \
            } \
        }";
    let (outputs, diagnostics) = compile(&[("Main.jack", source)]);
    assert!(diagnostics.has_fatal());
    assert!(outputs.is_empty());
}

#[test]
fn cross_class_constructor_and_method_calls_resolve() {
    let point = "\
        class Point { \
            field int x, y; \
            constructor Point new(int ax, int ay) { \
                let x = ax; \
                let y = ay; \
                return this; \
            } \
            method int getX() { \
                return x; \
            } \
        }";
    let main = "\
        class Main { \
            function int run() { \
                var Point p; \
                let p = Point.new(3, 4); \
                return p.getX(); \
            } \
        }";
    let (outputs, diagnostics) = compile(&[("Point.jack", point), ("Main.jack", main)]);
    assert!(!diagnostics.has_fatal(), "{:?}", diagnostics.diagnostics());
    assert_eq!(outputs.len(), 2);

    let main_vm = outputs.iter().find(|(name, _)| name == "Main").unwrap();
    assert!(main_vm.1.contains("call Point.new 2\n"));
    assert!(main_vm.1.contains("call Point.getX 1\n"));
}

#[test]
fn recursive_method_call_reserves_implicit_this_before_declared_parameters() {
    let source = "\
        class Counter { \
            field int value; \
            method void tick(int n) { \
                if (n > 0) { \
                    do tick(n - 1); \
                } \
                return; \
            } \
        }";
    let (outputs, diagnostics) = compile(&[("Counter.jack", source)]);
    assert!(!diagnostics.has_fatal(), "{:?}", diagnostics.diagnostics());
    let vm = &outputs[0].1;
    // `this` occupies argument 0; the declared parameter `n` must be argument 1.
    assert!(vm.contains("push argument 1\n"));
    assert!(vm.contains("call Counter.tick 2\n"));
}

#[test]
fn type_mismatch_anywhere_in_the_program_blocks_code_generation() {
    let source = "class Main { function int f() { return true; } }";
    let (outputs, diagnostics) = compile(&[("Main.jack", source)]);
    assert!(diagnostics.has_fatal());
    assert!(outputs.is_empty());
}
