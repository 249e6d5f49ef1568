//! Expression and term emission.
//!
//! Every node here already carries a fully-resolved `Type` cell from
//! ANALYZE; GENERATE doesn't re-check compatibility, it only walks the tree
//! in source order and emits the matching stack instructions. The single
//! precedence level means an `Expression`'s `ops` list is simply emitted
//! left to right: head term, then each `(op, term)` pair, folding the stack
//! effect exactly as written.

use jackc_base::{DiagnosticCode, DiagnosticSink, Interner};
use jackc_syntax::ast::{BasicType, BinaryOp, Expression, KeywordConst, SubroutineCall, Term, TermKind, UnaryOp, VarTerm};

use jackc_sema::{Depth, Kind, SymbolTables};

use super::context::{emit_pop, emit_push, segment_for_kind, GenCtx, LabelAllocator, Segment};

pub fn generate_expression(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    ctx: &GenCtx,
    out: &mut String,
    expr: &Expression,
) {
    generate_term(tables, interner, diagnostics, labels, ctx, out, expr.head);
    for op in expr.ops {
        generate_term(tables, interner, diagnostics, labels, ctx, out, op.term);
        out.push_str(match op.op {
            BinaryOp::Add => "add\n",
            BinaryOp::Sub => "sub\n",
            BinaryOp::Mul => "call Math.multiply 2\n",
            BinaryOp::Div => "call Math.divide 2\n",
            BinaryOp::And => "and\n",
            BinaryOp::Or => "or\n",
            BinaryOp::Lt => "lt\n",
            BinaryOp::Gt => "gt\n",
            BinaryOp::Eq => "eq\n",
        });
    }
}

fn generate_term(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    ctx: &GenCtx,
    out: &mut String,
    term: &Term,
) {
    match &term.kind {
        TermKind::IntConst(n) => emit_push(out, Segment::Constant, *n as u32),
        TermKind::StringConst(s) => generate_string_const(interner, out, *s),
        TermKind::KeywordConst(KeywordConst::True) => {
            emit_push(out, Segment::Constant, 0);
            out.push_str("not\n");
        }
        TermKind::KeywordConst(KeywordConst::False) | TermKind::KeywordConst(KeywordConst::Null) => {
            emit_push(out, Segment::Constant, 0);
        }
        TermKind::KeywordConst(KeywordConst::This) => emit_push(out, Segment::Pointer, 0),
        TermKind::Var(var_term) => generate_var_term(tables, interner, diagnostics, ctx, out, var_term),
        TermKind::ArrayAccess { name, index } => {
            generate_expression(tables, interner, diagnostics, labels, ctx, out, index);
            let Some(var) = tables.lookup(ctx.current_table, *name, Depth::Class) else {
                diagnostics.error(
                    DiagnosticCode::InvalidInput,
                    term.loc,
                    format!("array '{}' has no symbol-table entry at codegen time", interner.resolve(*name)),
                );
                return;
            };
            let Some(segment) = segment_for_kind(var.kind) else {
                diagnostics.error(
                    DiagnosticCode::InvalidInput,
                    term.loc,
                    format!("'{}' cannot be indexed (kind {:?})", interner.resolve(*name), var.kind),
                );
                return;
            };
            emit_push(out, segment, var.index);
            out.push_str("add\n");
            emit_pop(out, Segment::Pointer, 1);
            emit_push(out, Segment::That, 0);
        }
        TermKind::Call(call) => generate_call(tables, interner, diagnostics, labels, ctx, out, call),
        TermKind::Paren(inner) => generate_expression(tables, interner, diagnostics, labels, ctx, out, inner),
        TermKind::Unary { op, operand } => {
            generate_term(tables, interner, diagnostics, labels, ctx, out, operand);
            out.push_str(match op {
                UnaryOp::Neg => "neg\n",
                UnaryOp::Not => "not\n",
            });
        }
    }
}

fn generate_string_const(interner: &Interner, out: &mut String, symbol: jackc_base::Symbol) {
    let text = interner.resolve(symbol);
    emit_push(out, Segment::Constant, text.chars().count() as u32);
    out.push_str("call String.new 1\n");
    for c in text.chars() {
        emit_push(out, Segment::Constant, c as u32);
        out.push_str("call String.appendChar 2\n");
    }
}

fn generate_var_term(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &GenCtx,
    out: &mut String,
    var_term: &VarTerm,
) {
    let symbol = match var_term.qualifier {
        None => tables.lookup(ctx.current_table, var_term.name, Depth::Class),
        Some(qualifier) => match tables.lookup(ctx.current_table, qualifier, Depth::Global) {
            Some(class_symbol) => match class_symbol.child_table {
                Some(class_table) => tables.lookup(class_table, var_term.name, Depth::Local),
                None => None,
            },
            None => None,
        },
    };

    let Some(symbol) = symbol else {
        diagnostics.error(
            DiagnosticCode::InvalidInput,
            var_term.loc,
            format!("'{}' has no symbol-table entry at codegen time", interner.resolve(var_term.name)),
        );
        return;
    };
    let Some(segment) = segment_for_kind(symbol.kind) else {
        diagnostics.error(
            DiagnosticCode::InvalidInput,
            var_term.loc,
            format!("'{}' is not a storable variable (kind {:?})", interner.resolve(var_term.name), symbol.kind),
        );
        return;
    };
    emit_push(out, segment, symbol.index);
}

pub fn generate_call(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    labels: &mut LabelAllocator,
    ctx: &GenCtx,
    out: &mut String,
    call: &SubroutineCall,
) {
    let (target_class, implicit_self) = resolve_call_target(tables, interner, diagnostics, ctx, call);

    let mut n_args = call.args.len() as u32;
    if let Some((segment, index)) = implicit_self {
        emit_push(out, segment, index);
        n_args += 1;
    }
    for arg in call.args {
        generate_expression(tables, interner, diagnostics, labels, ctx, out, arg);
    }

    let sub_name = interner.resolve(call.name);
    out.push_str(&format!("call {target_class}.{sub_name} {n_args}\n"));
}

/// Reimplements the disambiguation rules ANALYZE already applied (no cached
/// target table survives on `SubroutineCall`, only its resolved return
/// type), additionally deciding whether the call needs an implicit receiver
/// pushed first: a bare `g(...)` inside a method that resolves to another
/// method pushes `this`; a variable caller pushes that variable.
fn resolve_call_target(
    tables: &SymbolTables,
    interner: &Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &GenCtx,
    call: &SubroutineCall,
) -> (String, Option<(Segment, u32)>) {
    match call.caller {
        None => {
            let class_name = interner.resolve(ctx.current_class).to_string();
            let implicit_self = match tables.lookup(ctx.current_table, call.name, Depth::Global) {
                Some(sym) if sym.kind == Kind::Method => Some((Segment::Pointer, 0)),
                _ => None,
            };
            (class_name, implicit_self)
        }
        Some(caller) => match tables.lookup(ctx.current_table, caller, Depth::Global) {
            Some(sym) if sym.kind == Kind::Class => (interner.resolve(caller).to_string(), None),
            Some(sym) if sym.ty.basic == BasicType::UserDefined => {
                let class_name = interner.resolve(sym.ty.user_defined).to_string();
                match segment_for_kind(sym.kind) {
                    Some(segment) => (class_name, Some((segment, sym.index))),
                    None => {
                        diagnostics.error(
                            DiagnosticCode::InvalidInput,
                            call.loc,
                            format!("'{}' cannot be used as a method receiver", interner.resolve(caller)),
                        );
                        (class_name, None)
                    }
                }
            }
            _ => {
                diagnostics.error(
                    DiagnosticCode::InvalidInput,
                    call.loc,
                    format!("'{}' does not resolve to a class or object at codegen time", interner.resolve(caller)),
                );
                (interner.resolve(caller).to_string(), None)
            }
        },
    }
}
