//! GENERATE phase: the third and final tree walk, emitting VM assembly text.
//!
//! One function runs over the whole `Program`, but the output is kept
//! per-class — the external contract is one `.vm` file per `.jack` input,
//! and a `Program` may bundle classes parsed from several files together.
//! The label allocator is the only state shared across classes; everything
//! else (current class, current table, output buffer) is scoped to the
//! class or subroutine being walked.

use jackc_base::{DiagnosticCode, DiagnosticSink, Interner, Symbol};
use jackc_syntax::ast::{BasicType, Class, Program, SubroutineDec, SubroutineKind};

use jackc_sema::{Depth, Kind, SymbolTables, TableId};

use super::context::{ends_with_return, GenCtx, LabelAllocator};
use super::stmt::generate_statements;

/// Runs GENERATE over every class in `program`, returning one `(class name,
/// VM text)` pair per class in source order. `global` must already carry
/// every class/member BUILD and ANALYZE saw; a class or subroutine missing
/// its expected scope reports `CODEGEN::InvalidInput` and is skipped rather
/// than panicking, since that would only happen after a bug earlier in the
/// pipeline slipped past the fatal-diagnostic gate.
pub fn generate_program(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    global: TableId,
    program: &Program,
) -> Vec<(Symbol, String)> {
    let mut labels = LabelAllocator::new();
    let mut outputs = Vec::with_capacity(program.classes.len());

    for class in program.classes {
        let vm = generate_class(tables, interner, diagnostics, &mut labels, global, class);
        outputs.push((class.name, vm));
    }
    outputs
}

fn generate_class(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    global: TableId,
    class: &Class,
) -> String {
    let mut out = String::new();

    let Some(class_symbol) = tables.lookup(global, class.name, Depth::Local) else {
        diagnostics.error(DiagnosticCode::InvalidInput, class.loc, "class was not registered by BUILD");
        return out;
    };
    let Some(class_table) = class_symbol.child_table else {
        diagnostics.error(DiagnosticCode::InvalidInput, class.loc, "class has no scope");
        return out;
    };
    let field_count = tables.get(class_table).count_of(Kind::Field);

    for sub in class.subroutine_decs {
        generate_subroutine(tables, interner, diagnostics, labels, class.name, class_table, field_count, &mut out, sub);
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn generate_subroutine(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    class_name: Symbol,
    class_table: TableId,
    field_count: u32,
    out: &mut String,
    sub: &SubroutineDec,
) {
    let Some(sub_symbol) = tables.lookup(class_table, sub.name, Depth::Local) else {
        diagnostics.error(DiagnosticCode::InvalidInput, sub.loc, "subroutine was not registered by BUILD");
        return;
    };
    let Some(sub_table) = sub_symbol.child_table else {
        diagnostics.error(DiagnosticCode::InvalidInput, sub.loc, "subroutine has no scope");
        return;
    };
    let return_ty = sub_symbol.ty;
    let n_locals = tables.get_symbols_of_kind(sub_table, Kind::Var).len();

    out.push_str(&format!("function {}.{} {}\n", interner.resolve(class_name), interner.resolve(sub.name), n_locals));

    match sub.kind {
        SubroutineKind::Constructor => {
            out.push_str(&format!("push constant {field_count}\n"));
            out.push_str("call Memory.alloc 1\n");
            out.push_str("pop pointer 0\n");
        }
        SubroutineKind::Method => {
            out.push_str("push argument 0\n");
            out.push_str("pop pointer 0\n");
        }
        SubroutineKind::Function => {}
    }

    let ctx = GenCtx { current_class: class_name, current_table: sub_table };
    generate_statements(tables, interner, diagnostics, labels, &ctx, out, sub.body.statements);

    if !ends_with_return(out) {
        if return_ty.basic != BasicType::Void {
            diagnostics.error(
                DiagnosticCode::InvalidInput,
                sub.loc,
                format!("'{}.{}' falls off its end without returning a value", interner.resolve(class_name), interner.resolve(sub.name)),
            );
        }
        out.push_str("push constant 0\n");
        out.push_str("return\n");
    }
}
