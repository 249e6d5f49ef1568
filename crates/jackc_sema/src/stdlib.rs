//! Standard-library catalog: seeds the global table with the signatures a
//! `.jack` program is compiled against but never itself defines (`Math`,
//! `String`, `Array`, `Output`, `Screen`, `Keyboard`, `Memory`, `Sys`).
//!
//! The catalog is a JSON document, parsed once at startup and inserted into
//! the global table exactly as if each stdlib subroutine had been declared
//! from source — this is the sole source of truth for stdlib signatures; no
//! catalog lookup happens later in ANALYZE or GENERATE.

use std::collections::HashMap;

use jackc_base::{Interner, SourceLoc, Symbol};
use serde::Deserialize;

use crate::table::{Kind, Scope, SymbolTables, TableId};

#[derive(Debug, Deserialize)]
pub struct CatalogParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    #[serde(rename = "KIND_FUNCTION")]
    Function,
    #[serde(rename = "KIND_METHOD")]
    Method,
    #[serde(rename = "KIND_CONSTRUCTOR")]
    Constructor,
}

impl From<CatalogKind> for Kind {
    fn from(k: CatalogKind) -> Kind {
        match k {
            CatalogKind::Function => Kind::Function,
            CatalogKind::Method => Kind::Method,
            CatalogKind::Constructor => Kind::Constructor,
        }
    }
}

impl From<CatalogKind> for Scope {
    fn from(k: CatalogKind) -> Scope {
        match k {
            CatalogKind::Function => Scope::Function,
            CatalogKind::Method => Scope::Method,
            CatalogKind::Constructor => Scope::Constructor,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogSubroutine {
    pub name: String,
    pub return_type: String,
    pub kind: CatalogKind,
    #[serde(default)]
    pub parameters: Vec<CatalogParameter>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CatalogClass {
    #[serde(default)]
    pub functions: Vec<CatalogSubroutine>,
    #[serde(default)]
    pub methods: Vec<CatalogSubroutine>,
}

/// The whole catalog: class name to its function/method/constructor entries.
pub type Catalog = HashMap<String, CatalogClass>;

/// Parses the catalog JSON. Call once at startup; an implementation may also
/// compile this to a constant table at build time instead of re-parsing on
/// every run, trading a `build.rs` step for faster startup.
pub fn parse_catalog(json: &str) -> Result<Catalog, serde_json::Error> {
    serde_json::from_str(json)
}

/// Inserts every class in `catalog` into `global`, exactly as BUILD would
/// for source classes: a `Class` symbol in `global` with a child class
/// table, and inside it one symbol per subroutine with its own child
/// subroutine table pre-populated with `Arg` symbols.
///
/// Idempotent: a class already present in `global` is left untouched on a
/// second call — no diagnostic, no count change — since re-seeding the
/// catalog is initialization, not a user declaration error.
pub fn add_stdlib_table(
    tables: &mut SymbolTables,
    global: TableId,
    catalog: &Catalog,
    interner: &mut Interner,
) {
    let synthetic_loc = SourceLoc::new(interner.intern("<stdlib>"), 0, 0);

    for (class_name, class_info) in catalog {
        let class_symbol = interner.intern(class_name);
        if tables.get(global).symbols.iter().any(|s| s.name == class_symbol) {
            continue;
        }

        let class_table = tables.create_table(Scope::Class, Some(global));
        let mut discard_diagnostics = jackc_base::DiagnosticSink::new();
        let class_idx = tables.add(
            global,
            class_symbol,
            class_name,
            Kind::Class,
            synthetic_loc,
            interner,
            &mut discard_diagnostics,
        );
        tables.link_child_table(global, class_idx, class_table);

        for entry in class_info.functions.iter().chain(class_info.methods.iter()) {
            add_subroutine(tables, class_name, class_table, entry, interner, synthetic_loc);
        }
    }
}

fn add_subroutine(
    tables: &mut SymbolTables,
    class_name: &str,
    class_table: TableId,
    entry: &CatalogSubroutine,
    interner: &mut Interner,
    loc: SourceLoc,
) {
    let mut discard_diagnostics = jackc_base::DiagnosticSink::new();
    let sub_name = interner.intern(&entry.name);
    let sub_table = tables.create_table(entry.kind.into(), Some(class_table));
    let sub_idx = tables.add(
        class_table,
        sub_name,
        &entry.return_type,
        entry.kind.into(),
        loc,
        interner,
        &mut discard_diagnostics,
    );
    tables.link_child_table(class_table, sub_idx, sub_table);

    if entry.kind == CatalogKind::Method {
        let this_name = interner.intern("this");
        tables.add(sub_table, this_name, class_name, Kind::Arg, loc, interner, &mut discard_diagnostics);
    }

    for param in &entry.parameters {
        let param_name: Symbol = interner.intern(&param.name);
        tables.add(sub_table, param_name, &param.ty, Kind::Arg, loc, interner, &mut discard_diagnostics);
    }
}
