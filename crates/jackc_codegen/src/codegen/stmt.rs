//! Statement emission: `let`, `if`, `while`, `do`, `return`.

use jackc_base::{DiagnosticCode, DiagnosticSink, Interner};
use jackc_syntax::ast::{Statement, Statements};

use jackc_sema::{Depth, SymbolTables};

use super::context::{emit_pop, emit_push, segment_for_kind, GenCtx, LabelAllocator, Segment};
use super::expr::{generate_call, generate_expression};

pub fn generate_statements(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    ctx: &GenCtx,
    out: &mut String,
    statements: &Statements,
) {
    for stmt in statements.statements {
        generate_statement(tables, interner, diagnostics, labels, ctx, out, stmt);
    }
}

fn generate_statement(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    ctx: &GenCtx,
    out: &mut String,
    stmt: &Statement,
) {
    match stmt {
        Statement::Let { target, index, value, loc } => {
            generate_let(tables, interner, diagnostics, labels, ctx, out, *target, *index, value, *loc);
        }
        Statement::If { cond, then_branch, else_branch, .. } => {
            generate_if(tables, interner, diagnostics, labels, ctx, out, cond, then_branch, *else_branch);
        }
        Statement::While { cond, body, .. } => {
            generate_while(tables, interner, diagnostics, labels, ctx, out, cond, body);
        }
        Statement::Do { call, .. } => {
            generate_call(tables, interner, diagnostics, labels, ctx, out, call);
            emit_pop(out, Segment::Temp, 0);
        }
        Statement::Return { value, .. } => {
            match value {
                Some(expr) => generate_expression(tables, interner, diagnostics, labels, ctx, out, expr),
                None => emit_push(out, Segment::Constant, 0),
            }
            out.push_str("return\n");
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn generate_let(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    ctx: &GenCtx,
    out: &mut String,
    target: jackc_base::Symbol,
    index: Option<&jackc_syntax::ast::Expression>,
    value: &jackc_syntax::ast::Expression,
    loc: jackc_base::SourceLoc,
) {
    let Some(var) = tables.lookup(ctx.current_table, target, Depth::Class) else {
        diagnostics.error(
            DiagnosticCode::InvalidInput,
            loc,
            format!("'{}' has no symbol-table entry at codegen time", interner.resolve(target)),
        );
        return;
    };
    let Some(segment) = segment_for_kind(var.kind) else {
        diagnostics.error(
            DiagnosticCode::InvalidInput,
            loc,
            format!("'{}' cannot be assigned to (kind {:?})", interner.resolve(target), var.kind),
        );
        return;
    };
    let var_index = var.index;

    match index {
        None => {
            generate_expression(tables, interner, diagnostics, labels, ctx, out, value);
            emit_pop(out, segment, var_index);
        }
        Some(index_expr) => {
            generate_expression(tables, interner, diagnostics, labels, ctx, out, value);
            generate_expression(tables, interner, diagnostics, labels, ctx, out, index_expr);
            emit_push(out, segment, var_index);
            out.push_str("add\n");
            emit_pop(out, Segment::Temp, 0);
            emit_pop(out, Segment::Pointer, 1);
            emit_push(out, Segment::Temp, 0);
            emit_pop(out, Segment::That, 0);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn generate_if(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    ctx: &GenCtx,
    out: &mut String,
    cond: &jackc_syntax::ast::Expression,
    then_branch: &Statements,
    else_branch: Option<&Statements>,
) {
    let true_label = labels.next("IF_TRUE");
    let false_label = labels.next("IF_FALSE");
    let end_label = labels.next("IF_END");

    generate_expression(tables, interner, diagnostics, labels, ctx, out, cond);
    out.push_str("not\n");
    out.push_str(&format!("if-goto {false_label}\n"));
    out.push_str(&format!("label {true_label}\n"));
    generate_statements(tables, interner, diagnostics, labels, ctx, out, then_branch);
    out.push_str(&format!("goto {end_label}\n"));
    out.push_str(&format!("label {false_label}\n"));
    if let Some(else_branch) = else_branch {
        generate_statements(tables, interner, diagnostics, labels, ctx, out, else_branch);
    }
    out.push_str(&format!("label {end_label}\n"));
}

fn generate_while(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    ctx: &GenCtx,
    out: &mut String,
    cond: &jackc_syntax::ast::Expression,
    body: &Statements,
) {
    let start_label = labels.next("WHILE_START");
    let end_label = labels.next("WHILE_END");

    out.push_str(&format!("label {start_label}\n"));
    generate_expression(tables, interner, diagnostics, labels, ctx, out, cond);
    out.push_str("not\n");
    out.push_str(&format!("if-goto {end_label}\n"));
    generate_statements(tables, interner, diagnostics, labels, ctx, out, body);
    out.push_str(&format!("goto {start_label}\n"));
    out.push_str(&format!("label {end_label}\n"));
}
