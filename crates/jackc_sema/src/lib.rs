#![cfg_attr(docsrs, feature(doc_cfg))]

//! # jackc-sema
//!
//! Symbol tables and type checking for jackc: the BUILD and ANALYZE phases.
//!
//! ## Architecture
//!
//! 1. **BUILD** ([`build`]) — one tree walk that creates a scope for every
//!    class and subroutine and inserts every declared name, without looking
//!    at a single statement or expression.
//! 2. **ANALYZE** ([`analyze`]) — a second tree walk, run only once BUILD
//!    finished without a fatal diagnostic, that resolves every name
//!    reference and fills in the [`jackc_syntax::ast::Type`] cell on every
//!    expression-bearing node.
//!
//! Both phases share one [`table::SymbolTables`] store and the standard
//! library catalog ([`stdlib`]), which must be seeded into the global table
//! before BUILD runs so that calls to `Math.multiply` and friends resolve
//! like any other declaration.

pub mod analyze;
pub mod build;
pub mod stdlib;
pub mod table;

pub use analyze::analyze_program;
pub use build::build_program;
pub use stdlib::{add_stdlib_table, parse_catalog, Catalog, CatalogClass, CatalogKind, CatalogParameter, CatalogSubroutine};
pub use table::{Depth, Kind, Scope, SymbolEntry, SymbolTableData, SymbolTables, TableId};
