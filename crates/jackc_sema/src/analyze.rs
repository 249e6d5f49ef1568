//! ANALYZE phase: type inference and checking over the tree BUILD has
//! already scoped.
//!
//! Every `Expression`, `Term`, `VarTerm`, and `SubroutineCall` node carries a
//! `Cell<Type>` that starts at [`Type::unknown`]; a clean ANALYZE run leaves
//! none of them unknown. Statement rules don't produce a type of their own —
//! they only check that the types their sub-expressions already computed are
//! compatible (a boolean condition, a matching assignment, ...).
//!
//! BUILD must have completed without a fatal diagnostic before this runs:
//! every name this phase looks up is expected to already have a symbol-table
//! entry. GENERATE, in turn, depends on this phase having populated every
//! type cell and resolved every `SubroutineCall`'s target.

use jackc_base::{DiagnosticCode, DiagnosticSink, Interner};
use jackc_syntax::ast::{
    BasicType, BinaryOp, Class, ClassVarDec, Expression, KeywordConst, Program, Statement,
    Statements, SubroutineBody, SubroutineCall, SubroutineDec, Term, TermKind, Type, UnaryOp,
    VarDec, VarTerm,
};

use crate::table::{Depth, Kind, SymbolTables, TableId};

/// Runs ANALYZE over every class in `program`. `global` must already carry
/// the standard library and every class/member declared by BUILD.
pub fn analyze_program(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    global: TableId,
    program: &Program,
) {
    for class in program.classes {
        analyze_class(tables, interner, diagnostics, global, class);
    }
}

fn analyze_class(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    global: TableId,
    class: &Class,
) {
    let Some(class_symbol) = tables.lookup(global, class.name, Depth::Local) else {
        diagnostics.error(DiagnosticCode::InvalidScope, class.loc, "class was not registered by BUILD");
        return;
    };
    let Some(class_table) = class_symbol.child_table else {
        diagnostics.error(DiagnosticCode::InvalidScope, class.loc, "class has no scope");
        return;
    };

    for var_dec in class.var_decs {
        analyze_class_var_dec(tables, interner, diagnostics, class_table, var_dec);
    }
    for sub in class.subroutine_decs {
        analyze_subroutine_dec(tables, interner, diagnostics, class.name, class_table, sub);
    }
}

/// Class fields carry no expression of their own to type; BUILD already
/// recorded their declared type. Present only so the dispatcher has
/// somewhere to route `ClassVarDec` during ANALYZE, matching the phase
/// table in the governing grammar.
fn analyze_class_var_dec(
    _tables: &SymbolTables,
    _interner: &mut Interner,
    _diagnostics: &mut DiagnosticSink,
    _class_table: TableId,
    _var_dec: &ClassVarDec,
) {
}

fn analyze_subroutine_dec(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    class_name: jackc_base::Symbol,
    class_table: TableId,
    sub: &SubroutineDec,
) {
    let Some(sub_symbol) = tables.lookup(class_table, sub.name, Depth::Local) else {
        diagnostics.error(DiagnosticCode::InvalidSubroutine, sub.loc, "subroutine was not registered by BUILD");
        return;
    };
    let Some(sub_table) = sub_symbol.child_table else {
        diagnostics.error(DiagnosticCode::InvalidSubroutine, sub.loc, "subroutine has no scope");
        return;
    };

    let ctx = AnalyzeCtx { current_class: class_name, current_table: sub_table };
    analyze_subroutine_body(tables, interner, diagnostics, &ctx, sub.body);
}

fn analyze_subroutine_body(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    body: &SubroutineBody,
) {
    for var_dec in body.var_decs {
        analyze_var_dec(var_dec);
    }
    analyze_statements(tables, interner, diagnostics, ctx, body.statements);
}

/// Same role as [`analyze_class_var_dec`]: locals carry no expression, BUILD
/// already recorded their declared type.
fn analyze_var_dec(_var_dec: &VarDec) {}

/// State threaded through one subroutine's ANALYZE walk: which table names
/// resolve against, and which class `this` refers to.
struct AnalyzeCtx {
    current_class: jackc_base::Symbol,
    current_table: TableId,
}

fn analyze_statements(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    statements: &Statements,
) {
    for stmt in statements.statements {
        analyze_statement(tables, interner, diagnostics, ctx, stmt);
    }
}

fn analyze_statement(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    stmt: &Statement,
) {
    match stmt {
        Statement::Let { target, index, value, loc } => {
            let Some(var_symbol) = tables.lookup(ctx.current_table, *target, Depth::Class) else {
                diagnostics.error(
                    DiagnosticCode::UndeclaredSymbol,
                    *loc,
                    format!("'{}' is undeclared", interner.resolve(*target)),
                );
                analyze_expression(tables, interner, diagnostics, ctx, value);
                return;
            };
            let var_ty = var_symbol.ty;

            if let Some(index_expr) = index {
                let idx_ty = analyze_expression(tables, interner, diagnostics, ctx, index_expr);
                if idx_ty.basic != BasicType::Int {
                    diagnostics.error(
                        DiagnosticCode::InvalidExpression,
                        *loc,
                        "array index must be of type int",
                    );
                }
            }

            let value_ty = analyze_expression(tables, interner, diagnostics, ctx, value);
            if !value_ty.type_eq(var_ty) {
                diagnostics.error(
                    DiagnosticCode::InvalidType,
                    *loc,
                    format!(
                        "cannot assign '{}' to variable of type '{}'",
                        type_name(value_ty, interner),
                        type_name(var_ty, interner)
                    ),
                );
            }
        }
        Statement::If { cond, then_branch, else_branch, loc } => {
            require_boolean(tables, interner, diagnostics, ctx, cond, *loc, "if condition");
            analyze_statements(tables, interner, diagnostics, ctx, then_branch);
            if let Some(else_branch) = else_branch {
                analyze_statements(tables, interner, diagnostics, ctx, else_branch);
            }
        }
        Statement::While { cond, body, loc } => {
            require_boolean(tables, interner, diagnostics, ctx, cond, *loc, "while condition");
            analyze_statements(tables, interner, diagnostics, ctx, body);
        }
        Statement::Do { call, .. } => {
            analyze_subroutine_call(tables, interner, diagnostics, ctx, call);
        }
        Statement::Return { value, loc } => {
            analyze_return(tables, interner, diagnostics, ctx, value, *loc);
        }
    }
}

fn require_boolean(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    expr: &Expression,
    loc: jackc_base::SourceLoc,
    what: &str,
) {
    let ty = analyze_expression(tables, interner, diagnostics, ctx, expr);
    if ty.basic != BasicType::Boolean {
        diagnostics.error(
            DiagnosticCode::InvalidType,
            loc,
            format!("{what} must be of type boolean, found '{}'", type_name(ty, interner)),
        );
    }
}

/// Finds the declared return type of the subroutine owning `ctx.current_table`
/// by scanning its parent for the symbol whose `child_table` points back at it.
fn enclosing_return_type(tables: &SymbolTables, ctx: &AnalyzeCtx) -> Option<Type> {
    tables.owning_symbol(ctx.current_table).map(|s| s.ty)
}

fn analyze_return(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    value: &Option<&Expression>,
    loc: jackc_base::SourceLoc,
) {
    let Some(return_ty) = enclosing_return_type(tables, ctx) else {
        diagnostics.error(DiagnosticCode::InvalidScope, loc, "return statement outside any subroutine");
        return;
    };

    match value {
        Some(expr) => {
            let value_ty = analyze_expression(tables, interner, diagnostics, ctx, expr);
            if !value_ty.type_eq(return_ty) {
                diagnostics.error(
                    DiagnosticCode::InvalidType,
                    loc,
                    format!(
                        "return type '{}' mismatches subroutine return type '{}'",
                        type_name(value_ty, interner),
                        type_name(return_ty, interner)
                    ),
                );
            }
        }
        None => {
            if return_ty.basic != BasicType::Void {
                diagnostics.error(
                    DiagnosticCode::InvalidType,
                    loc,
                    format!(
                        "expected a return value of type '{}', found none",
                        type_name(return_ty, interner)
                    ),
                );
            }
        }
    }
}

fn analyze_expression(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    expr: &Expression,
) -> Type {
    let mut result = analyze_term(tables, interner, diagnostics, ctx, expr.head);

    for op in expr.ops {
        let next = analyze_term(tables, interner, diagnostics, ctx, op.term);
        result = match op.op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                if !is_int(result) || !is_int(next) {
                    diagnostics.error(
                        DiagnosticCode::InvalidType,
                        expr.loc,
                        format!(
                            "invalid types for arithmetic operation: '{}' and '{}'",
                            type_name(result, interner),
                            type_name(next, interner)
                        ),
                    );
                }
                Type::basic(BasicType::Int)
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Eq => {
                if !is_comparable(result) || !is_comparable(next) {
                    diagnostics.error(
                        DiagnosticCode::InvalidType,
                        expr.loc,
                        format!(
                            "invalid types for comparison operation: '{}' and '{}'",
                            type_name(result, interner),
                            type_name(next, interner)
                        ),
                    );
                }
                Type::basic(BasicType::Boolean)
            }
            BinaryOp::And | BinaryOp::Or => {
                if result.basic != BasicType::Boolean || next.basic != BasicType::Boolean {
                    diagnostics.error(
                        DiagnosticCode::InvalidType,
                        expr.loc,
                        format!(
                            "invalid types for boolean operation: '{}' and '{}'",
                            type_name(result, interner),
                            type_name(next, interner)
                        ),
                    );
                }
                Type::basic(BasicType::Boolean)
            }
        };
    }

    expr.ty.set(result);
    result
}

fn is_int(ty: Type) -> bool {
    ty.basic == BasicType::Int
}

fn is_comparable(ty: Type) -> bool {
    matches!(ty.basic, BasicType::Int | BasicType::Char)
}

fn analyze_term(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    term: &Term,
) -> Type {
    let ty = match &term.kind {
        TermKind::IntConst(_) => Type::basic(BasicType::Int),
        TermKind::StringConst(_) => Type::basic(BasicType::String),
        TermKind::KeywordConst(KeywordConst::True) | TermKind::KeywordConst(KeywordConst::False) => {
            Type::basic(BasicType::Boolean)
        }
        TermKind::KeywordConst(KeywordConst::Null) => Type::basic(BasicType::Null),
        TermKind::KeywordConst(KeywordConst::This) => Type::user_defined(ctx.current_class),
        TermKind::Var(var_term) => analyze_var_term(tables, interner, diagnostics, ctx, var_term),
        TermKind::ArrayAccess { name, index } => {
            analyze_expression(tables, interner, diagnostics, ctx, index);
            match tables.lookup(ctx.current_table, *name, Depth::Class) {
                Some(sym) => sym.ty,
                None => {
                    diagnostics.error(
                        DiagnosticCode::UndeclaredSymbol,
                        term.loc,
                        format!("array '{}' is undeclared", interner.resolve(*name)),
                    );
                    Type::unknown()
                }
            }
        }
        TermKind::Call(call) => analyze_subroutine_call(tables, interner, diagnostics, ctx, call),
        TermKind::Paren(inner) => analyze_expression(tables, interner, diagnostics, ctx, inner),
        TermKind::Unary { op, operand } => {
            let operand_ty = analyze_term(tables, interner, diagnostics, ctx, operand);
            match op {
                UnaryOp::Not if operand_ty.basic != BasicType::Boolean => {
                    diagnostics.error(
                        DiagnosticCode::InvalidType,
                        term.loc,
                        format!("'~' expects a boolean operand, found '{}'", type_name(operand_ty, interner)),
                    );
                }
                UnaryOp::Neg if operand_ty.basic != BasicType::Int => {
                    diagnostics.error(
                        DiagnosticCode::InvalidType,
                        term.loc,
                        format!("unary '-' expects an int operand, found '{}'", type_name(operand_ty, interner)),
                    );
                }
                _ => {}
            }
            operand_ty
        }
    };

    term.ty.set(ty);
    ty
}

fn analyze_var_term(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    var_term: &VarTerm,
) -> Type {
    let ty = match var_term.qualifier {
        None => match tables.lookup(ctx.current_table, var_term.name, Depth::Class) {
            Some(sym) => sym.ty,
            None => {
                diagnostics.error(
                    DiagnosticCode::UndeclaredSymbol,
                    var_term.loc,
                    format!("undefined variable '{}'", interner.resolve(var_term.name)),
                );
                Type::unknown()
            }
        },
        Some(qualifier) => {
            let Some(class_symbol) = tables.lookup(ctx.current_table, qualifier, Depth::Global) else {
                diagnostics.error(
                    DiagnosticCode::UndeclaredSymbol,
                    var_term.loc,
                    format!("undeclared class '{}'", interner.resolve(qualifier)),
                );
                return Type::unknown();
            };
            let Some(class_table) = class_symbol.child_table else {
                diagnostics.error(
                    DiagnosticCode::InvalidScope,
                    var_term.loc,
                    format!("'{}' has no member scope", interner.resolve(qualifier)),
                );
                return Type::unknown();
            };
            match tables.lookup(class_table, var_term.name, Depth::Local) {
                Some(sym) => sym.ty,
                None => {
                    diagnostics.error(
                        DiagnosticCode::InvalidTerm,
                        var_term.loc,
                        format!(
                            "'{}' is not a valid attribute of class '{}'",
                            interner.resolve(var_term.name),
                            interner.resolve(qualifier)
                        ),
                    );
                    Type::unknown()
                }
            }
        }
    };
    var_term.ty.set(ty);
    ty
}

/// Resolves `call`'s target table by the disambiguation rules in §4.8,
/// type-checks its arguments against the declared parameter list, and
/// records the subroutine's return type on `call.ty`.
fn analyze_subroutine_call(
    tables: &SymbolTables,
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    ctx: &AnalyzeCtx,
    call: &SubroutineCall,
) -> Type {
    let target_table = match call.caller {
        None => None, // resolved directly by name below.
        Some(caller) => match tables.lookup(ctx.current_table, caller, Depth::Global) {
            Some(caller_symbol) if caller_symbol.kind == Kind::Class => caller_symbol.child_table,
            Some(caller_symbol) if caller_symbol.ty.basic == BasicType::UserDefined => {
                tables
                    .lookup(ctx.current_table, caller_symbol.ty.user_defined, Depth::Global)
                    .and_then(|class_symbol| class_symbol.child_table)
            }
            Some(_) => None,
            None => {
                diagnostics.error(
                    DiagnosticCode::UndeclaredSymbol,
                    call.loc,
                    format!("undeclared caller '{}'", interner.resolve(caller)),
                );
                None
            }
        },
    };

    let sub_symbol = match (call.caller, target_table) {
        (None, _) => tables.lookup(ctx.current_table, call.name, Depth::Global),
        (Some(_), Some(table)) => tables.lookup(table, call.name, Depth::Local),
        (Some(_), None) => None,
    };

    let Some(sub_symbol) = sub_symbol.filter(|s| s.kind.is_subroutine()) else {
        diagnostics.error(
            DiagnosticCode::InvalidExpression,
            call.loc,
            format!("'{}' has not been declared as a subroutine", interner.resolve(call.name)),
        );
        call.ty.set(Type::unknown());
        return Type::unknown();
    };

    let return_ty = sub_symbol.ty;
    let sub_table = sub_symbol.child_table;
    let all_args = sub_table.map(|t| tables.get_symbols_of_kind(t, Kind::Arg)).unwrap_or_default();
    // A method's own ARG 0 is the implicit receiver BUILD reserved for it
    // (see build_subroutine_dec); `call.args` never includes that slot, so
    // skip it here to keep positional matching aligned.
    let expected_args = if sub_symbol.kind == Kind::Method && !all_args.is_empty() {
        &all_args[1..]
    } else {
        &all_args[..]
    };

    // `Memory.deAlloc` accepts any single argument type — a documented wart
    // inherited from the stdlib contract, not generalized to other pointer-shaped calls.
    let is_memory_dealloc = call.caller.map(|c| interner.resolve(c) == "Memory").unwrap_or(false)
        && interner.resolve(call.name) == "deAlloc";

    for (i, arg) in call.args.iter().enumerate() {
        let arg_ty = analyze_expression(tables, interner, diagnostics, ctx, *arg);
        if is_memory_dealloc {
            continue;
        }
        if let Some(expected) = expected_args.get(i) {
            if !arg_ty.type_eq(expected.ty) {
                diagnostics.error(
                    DiagnosticCode::InvalidArgument,
                    call.loc,
                    format!(
                        "argument {} type '{}' mismatches parameter type '{}'",
                        i + 1,
                        type_name(arg_ty, interner),
                        type_name(expected.ty, interner)
                    ),
                );
            }
        }
    }

    call.ty.set(return_ty);
    return_ty
}

fn type_name(ty: Type, interner: &Interner) -> String {
    match ty.basic {
        BasicType::Unknown => "<unknown>".to_string(),
        BasicType::Int => "int".to_string(),
        BasicType::Char => "char".to_string(),
        BasicType::Boolean => "boolean".to_string(),
        BasicType::String => "String".to_string(),
        BasicType::Null => "null".to_string(),
        BasicType::Void => "void".to_string(),
        BasicType::UserDefined => interner.resolve(ty.user_defined).to_string(),
    }
}
