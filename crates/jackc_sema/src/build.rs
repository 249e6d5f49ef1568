//! BUILD phase: the declaration pass.
//!
//! Walks the parsed tree once, creating every scope and inserting every
//! declared name before ANALYZE ever runs. Statement bodies are not
//! descended into — BUILD only cares about things that introduce a name or a
//! scope, which in this grammar is exactly `Class`, `ClassVarDec`,
//! `SubroutineDec`, `ParameterList`, `SubroutineBody`, and `VarDec`.
//!
//! A `Class` inserts itself into the enclosing table as a `Class`-kind
//! symbol before recursing, so that `ClassName.staticMethod(...)` resolves
//! from anywhere, including from within the class's own body.

use jackc_base::{DiagnosticSink, Interner};
use jackc_syntax::ast::{Class, ClassVarDec, ClassVarModifier, Program, SubroutineBody, SubroutineDec, SubroutineKind, VarDec};

use crate::table::{Kind, Scope, SymbolTables, TableId};

/// Runs BUILD over every class in `program`, seeding `global` (already
/// populated with the standard library) with one `Class` symbol per class
/// and a fully-populated scope tree beneath each.
pub fn build_program(
    tables: &mut SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    global: TableId,
    program: &Program,
) {
    for class in program.classes {
        build_class(tables, interner, diagnostics, global, class);
    }
}

fn build_class(
    tables: &mut SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    global: TableId,
    class: &Class,
) -> TableId {
    let class_table = tables.create_table(Scope::Class, Some(global));
    let class_name = interner.resolve(class.name).to_string();
    let idx = tables.add(global, class.name, &class_name, Kind::Class, class.loc, interner, diagnostics);
    tables.link_child_table(global, idx, class_table);

    for var_dec in class.var_decs {
        build_class_var_dec(tables, interner, diagnostics, class_table, var_dec);
    }
    for sub in class.subroutine_decs {
        build_subroutine_dec(tables, interner, diagnostics, class.name, class_table, sub);
    }
    class_table
}

fn build_class_var_dec(
    tables: &mut SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    class_table: TableId,
    var_dec: &ClassVarDec,
) {
    let kind = match var_dec.modifier {
        ClassVarModifier::Static => Kind::Static,
        ClassVarModifier::Field => Kind::Field,
    };
    let type_name = interner.resolve(var_dec.type_name).to_string();
    for name in var_dec.names {
        tables.add(class_table, *name, &type_name, kind, var_dec.loc, interner, diagnostics);
    }
}

fn build_subroutine_dec(
    tables: &mut SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    class_name: jackc_base::Symbol,
    class_table: TableId,
    sub: &SubroutineDec,
) {
    let (kind, scope) = match sub.kind {
        SubroutineKind::Constructor => (Kind::Constructor, Scope::Constructor),
        SubroutineKind::Function => (Kind::Function, Scope::Function),
        SubroutineKind::Method => (Kind::Method, Scope::Method),
    };
    let sub_table = tables.create_table(scope, Some(class_table));
    let return_type = interner.resolve(sub.return_type).to_string();
    let idx = tables.add(class_table, sub.name, &return_type, kind, sub.loc, interner, diagnostics);
    tables.link_child_table(class_table, idx, sub_table);

    if sub.kind == SubroutineKind::Method {
        // The caller's object occupies argument 0 at runtime (see GENERATE's
        // `push argument 0; pop pointer 0` preamble); reserving it here as a
        // symbol keeps every declared parameter's ARG index in sync with its
        // actual VM argument slot without any offset arithmetic in codegen.
        let this_name = interner.intern("this");
        let class_name_str = interner.resolve(class_name).to_string();
        tables.add(sub_table, this_name, &class_name_str, Kind::Arg, sub.loc, interner, diagnostics);
    }

    for param in sub.params.params {
        let type_name = interner.resolve(param.type_name).to_string();
        tables.add(sub_table, param.name, &type_name, Kind::Arg, param.loc, interner, diagnostics);
    }
    build_subroutine_body(tables, interner, diagnostics, sub_table, sub.body);
}

fn build_subroutine_body(
    tables: &mut SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    sub_table: TableId,
    body: &SubroutineBody,
) {
    for var_dec in body.var_decs {
        build_var_dec(tables, interner, diagnostics, sub_table, var_dec);
    }
}

fn build_var_dec(
    tables: &mut SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    table: TableId,
    var_dec: &VarDec,
) {
    let type_name = interner.resolve(var_dec.type_name).to_string();
    for name in var_dec.names {
        tables.add(table, *name, &type_name, Kind::Var, var_dec.loc, interner, diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Depth;
    use jackc_base::{Arena, DiagnosticSink};
    use jackc_syntax::Parser;

    macro_rules! with_built_class {
        ($source:expr, |$tables:ident, $interner:ident, $global:ident, $class_table:ident| $body:block) => {{
            let arena = Arena::new();
            let mut interner = Interner::new();
            let mut diagnostics = DiagnosticSink::new();
            let file = interner.intern("Main.jack");
            let mut lexer = jackc_syntax::Lexer::new($source, file);
            let queue = lexer.lex(&arena, &mut interner, &mut diagnostics);
            let mut parser = Parser::new(queue, &arena, &mut interner, &mut diagnostics);
            let class = parser.parse_class();
            let class_name = class.name;
            let classes = arena.alloc_slice([&class]);
            let program = Program { classes };

            let mut tables = SymbolTables::new();
            let global = tables.create_table(Scope::Global, None);
            build_program(&mut tables, &mut interner, &mut diagnostics, global, &program);
            let class_table = tables.lookup(global, class_name, Depth::Local).unwrap().child_table.unwrap();

            let $tables = tables;
            let mut $interner = interner;
            let $global = global;
            let $class_table = class_table;
            $body
        }};
    }

    #[test]
    fn class_registers_itself_in_global_table() {
        with_built_class!("class Main { }", |tables, interner, global, _class_table| {
            let name = interner.intern("Main");
            let sym = tables.lookup(global, name, Depth::Local).unwrap();
            assert_eq!(sym.kind, Kind::Class);
            assert!(sym.child_table.is_some());
        });
    }

    #[test]
    fn fields_and_statics_land_in_class_table() {
        with_built_class!(
            "class Point { field int x, y; static int count; }",
            |tables, interner, _global, class_table| {
                assert_eq!(tables.get(class_table).count_of(Kind::Field), 2);
                assert_eq!(tables.get(class_table).count_of(Kind::Static), 1);
                let x = interner.intern("x");
                assert_eq!(tables.lookup(class_table, x, Depth::Local).unwrap().index, 0);
            }
        );
    }

    #[test]
    fn subroutine_creates_scope_with_args_and_locals() {
        with_built_class!(
            "class A { method void g(int i, int j) { var int k; var boolean flag; return; } }",
            |tables, interner, _global, class_table| {
                let g = interner.intern("g");
                let sub_sym = tables.lookup(class_table, g, Depth::Local).unwrap();
                assert_eq!(sub_sym.kind, Kind::Method);
                let sub_table = sub_sym.child_table.unwrap();
                // +1 for the implicit `this` receiver at ARG index 0.
                assert_eq!(tables.get(sub_table).count_of(Kind::Arg), 3);
                assert_eq!(tables.get(sub_table).count_of(Kind::Var), 2);
                let i = interner.intern("i");
                let j = interner.intern("j");
                assert_eq!(tables.lookup(sub_table, i, Depth::Local).unwrap().index, 1);
                assert_eq!(tables.lookup(sub_table, j, Depth::Local).unwrap().index, 2);
            }
        );
    }

    #[test]
    fn method_implicit_this_does_not_shift_function_args() {
        with_built_class!(
            "class A { function void g(int i, int j) { return; } }",
            |tables, interner, _global, class_table| {
                let g = interner.intern("g");
                let sub_table = tables.lookup(class_table, g, Depth::Local).unwrap().child_table.unwrap();
                assert_eq!(tables.get(sub_table).count_of(Kind::Arg), 2);
                let i = interner.intern("i");
                assert_eq!(tables.lookup(sub_table, i, Depth::Local).unwrap().index, 0);
            }
        );
    }

    #[test]
    fn empty_class_has_no_subroutines_or_vars() {
        with_built_class!("class X { }", |tables, _interner, _global, class_table| {
            assert_eq!(tables.get(class_table).count_of(Kind::Field), 0);
            assert_eq!(tables.get(class_table).count_of(Kind::Function), 0);
        });
    }
}
