//! Nested scoped symbol tables.
//!
//! A `SymbolTable` in the source language is naturally a cyclic graph: a
//! table's entries point down to child tables (`childTable`), and a symbol
//! points back up to the table that owns it. Rust's ownership rules don't
//! allow that graph to be built from raw references, so every table and
//! symbol lives in one central, append-only store and refers to its
//! neighbors by [`TableId`] — a stable index rather than a pointer.

use jackc_base::{DiagnosticCode, DiagnosticSink, Interner, SourceLoc, Symbol};
use jackc_syntax::Type;

/// Stable handle to a [`SymbolTableData`] inside a [`SymbolTables`] store.
/// Cheap to copy, stored on [`SymbolEntry::child_table`] and
/// [`SymbolTableData::parent`] in place of a raw pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(u32);

/// The lexical construct a table is bounded by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Class,
    Function,
    Method,
    Constructor,
    Subscope,
}

/// The role a declared name plays. Used both to select a table's insertion
/// slot and, during GENERATE, to select a VM memory segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
    Class,
    Constructor,
    Function,
    Method,
}

impl Kind {
    const COUNT: usize = 8;

    fn index(self) -> usize {
        match self {
            Kind::Static => 0,
            Kind::Field => 1,
            Kind::Arg => 2,
            Kind::Var => 3,
            Kind::Class => 4,
            Kind::Constructor => 5,
            Kind::Function => 6,
            Kind::Method => 7,
        }
    }

    pub fn is_subroutine(self) -> bool {
        matches!(self, Kind::Constructor | Kind::Function | Kind::Method)
    }
}

/// Lookup breadth for [`SymbolTables::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Search only the given table.
    Local,
    /// Walk up to and including the first enclosing `Class` scope.
    Class,
    /// Walk to the root, then sweep every table reachable from it — lets a
    /// subroutine body resolve another class's top-level declarations.
    Global,
}

/// `{name, type, kind, index, table, childTable}`. `child_table` is set iff
/// `kind` is `Class` or a subroutine kind, pointing at the scope that entity
/// owns.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub ty: Type,
    pub kind: Kind,
    pub index: u32,
    pub table: TableId,
    pub child_table: Option<TableId>,
    pub loc: SourceLoc,
}

#[derive(Debug)]
pub struct SymbolTableData {
    pub scope: Scope,
    pub symbols: Vec<SymbolEntry>,
    pub counts: [u32; Kind::COUNT],
    pub parent: Option<TableId>,
    pub children: Vec<TableId>,
}

impl SymbolTableData {
    pub fn count_of(&self, kind: Kind) -> u32 {
        self.counts[kind.index()]
    }
}

/// Central store backing every [`SymbolTableData`] created during one
/// compile run. Tables are never removed; BUILD only ever appends.
#[derive(Debug, Default)]
pub struct SymbolTables {
    tables: Vec<SymbolTableData>,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&mut self, scope: Scope, parent: Option<TableId>) -> TableId {
        let id = TableId(self.tables.len() as u32);
        self.tables.push(SymbolTableData {
            scope,
            symbols: Vec::new(),
            counts: [0; Kind::COUNT],
            parent,
            children: Vec::new(),
        });
        if let Some(parent_id) = parent {
            self.tables[parent_id.0 as usize].children.push(id);
        }
        id
    }

    pub fn get(&self, id: TableId) -> &SymbolTableData {
        &self.tables[id.0 as usize]
    }

    fn get_mut(&mut self, id: TableId) -> &mut SymbolTableData {
        &mut self.tables[id.0 as usize]
    }

    /// Parses `type_name` into a [`Type`] and appends a symbol whose `index`
    /// is the running count for `kind` in `table`. A duplicate name in the
    /// same table raises `REDECLARED` but the symbol is appended regardless,
    /// so later analysis still sees the first declaration at its original
    /// index and the second at the next one.
    pub fn add(
        &mut self,
        table: TableId,
        name: Symbol,
        type_name: &str,
        kind: Kind,
        loc: SourceLoc,
        interner: &mut Interner,
        diagnostics: &mut DiagnosticSink,
    ) -> usize {
        if self.get(table).symbols.iter().any(|s| s.name == name) {
            diagnostics.error(
                DiagnosticCode::RedeclaredSymbol,
                loc,
                format!("'{}' is already declared in this scope", interner.resolve(name)),
            );
        }
        let ty = Type::from_type_name(type_name, interner);
        let data = self.get_mut(table);
        let index = data.counts[kind.index()];
        data.counts[kind.index()] += 1;
        data.symbols.push(SymbolEntry { name, ty, kind, index, table, child_table: None, loc });
        data.symbols.len() - 1
    }

    /// Links the child scope an entity (a class or subroutine) owns onto the
    /// symbol that declares it.
    pub fn link_child_table(&mut self, table: TableId, symbol_index: usize, child: TableId) {
        self.get_mut(table).symbols[symbol_index].child_table = Some(child);
    }

    pub fn lookup(&self, table: TableId, name: Symbol, depth: Depth) -> Option<&SymbolEntry> {
        match depth {
            Depth::Local => self.get(table).symbols.iter().find(|s| s.name == name),
            Depth::Class => {
                let mut current = Some(table);
                while let Some(id) = current {
                    if let Some(sym) = self.get(id).symbols.iter().find(|s| s.name == name) {
                        return Some(sym);
                    }
                    if self.get(id).scope == Scope::Class {
                        return None;
                    }
                    current = self.get(id).parent;
                }
                None
            }
            Depth::Global => {
                let mut current = Some(table);
                let mut root = table;
                while let Some(id) = current {
                    if let Some(sym) = self.get(id).symbols.iter().find(|s| s.name == name) {
                        return Some(sym);
                    }
                    root = id;
                    current = self.get(id).parent;
                }
                self.sweep(root, name)
            }
        }
    }

    /// Breadth-first sweep of every table reachable from `root`, used by the
    /// `Global` lookup depth once the ancestor chain is exhausted.
    fn sweep(&self, root: TableId, name: Symbol) -> Option<&SymbolEntry> {
        let mut queue = vec![root];
        let mut i = 0;
        while i < queue.len() {
            let id = queue[i];
            i += 1;
            if let Some(sym) = self.get(id).symbols.iter().find(|s| s.name == name) {
                return Some(sym);
            }
            queue.extend(self.get(id).children.iter().copied());
        }
        None
    }

    /// Subset of `table`'s symbols with the given kind, preserving insertion
    /// order. Used by GENERATE to size local frames and argument lists.
    pub fn get_symbols_of_kind(&self, table: TableId, kind: Kind) -> Vec<&SymbolEntry> {
        self.get(table).symbols.iter().filter(|s| s.kind == kind).collect()
    }

    /// Finds the `Symbol` whose `child_table` equals `table` by scanning
    /// `table`'s parent — used by ANALYZE to recover the enclosing
    /// subroutine's declared return type from inside its own body.
    pub fn owning_symbol(&self, table: TableId) -> Option<&SymbolEntry> {
        let parent = self.get(table).parent?;
        self.get(parent).symbols.iter().find(|s| s.child_table == Some(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SymbolTables, Interner, DiagnosticSink) {
        (SymbolTables::new(), Interner::new(), DiagnosticSink::new())
    }

    fn loc(interner: &mut Interner) -> SourceLoc {
        let f = interner.intern("Main.jack");
        SourceLoc::new(f, 1, 0)
    }

    #[test]
    fn counts_track_insertion_order_per_kind() {
        let (mut tables, mut interner, mut diagnostics) = setup();
        let l = loc(&mut interner);
        let global = tables.create_table(Scope::Global, None);
        let x = interner.intern("x");
        let y = interner.intern("y");
        tables.add(global, x, "int", Kind::Var, l, &mut interner, &mut diagnostics);
        tables.add(global, y, "int", Kind::Var, l, &mut interner, &mut diagnostics);
        assert_eq!(tables.get(global).count_of(Kind::Var), 2);
        assert_eq!(tables.lookup(global, x, Depth::Local).unwrap().index, 0);
        assert_eq!(tables.lookup(global, y, Depth::Local).unwrap().index, 1);
    }

    #[test]
    fn duplicate_insert_raises_redeclared_but_keeps_first_addressable() {
        let (mut tables, mut interner, mut diagnostics) = setup();
        let l = loc(&mut interner);
        let global = tables.create_table(Scope::Global, None);
        let x = interner.intern("x");
        tables.add(global, x, "int", Kind::Var, l, &mut interner, &mut diagnostics);
        tables.add(global, x, "boolean", Kind::Var, l, &mut interner, &mut diagnostics);
        assert!(diagnostics.has_fatal());
        assert_eq!(diagnostics.diagnostics()[0].code, DiagnosticCode::RedeclaredSymbol);
        let first = tables.lookup(global, x, Depth::Local).unwrap();
        assert_eq!(first.index, 0);
    }

    #[test]
    fn class_depth_lookup_stops_at_first_enclosing_class_scope() {
        let (mut tables, mut interner, mut diagnostics) = setup();
        let l = loc(&mut interner);
        let global = tables.create_table(Scope::Global, None);
        let class = tables.create_table(Scope::Class, Some(global));
        let method = tables.create_table(Scope::Method, Some(class));
        let other_global_name = interner.intern("OtherClass");
        tables.add(global, other_global_name, "int", Kind::Class, l, &mut interner, &mut diagnostics);

        assert!(tables.lookup(method, other_global_name, Depth::Class).is_none());
        assert!(tables.lookup(method, other_global_name, Depth::Global).is_some());
    }

    #[test]
    fn global_lookup_sweeps_sibling_class_tables() {
        let (mut tables, mut interner, mut diagnostics) = setup();
        let l = loc(&mut interner);
        let global = tables.create_table(Scope::Global, None);
        let class_a = tables.create_table(Scope::Class, Some(global));
        let class_b = tables.create_table(Scope::Class, Some(global));
        let method_in_a = tables.create_table(Scope::Method, Some(class_a));

        let field_in_b = interner.intern("secret");
        tables.add(class_b, field_in_b, "int", Kind::Field, l, &mut interner, &mut diagnostics);

        assert!(tables.lookup(method_in_a, field_in_b, Depth::Global).is_some());
    }

    #[test]
    fn child_table_link_is_set_only_after_linking() {
        let (mut tables, mut interner, mut diagnostics) = setup();
        let l = loc(&mut interner);
        let global = tables.create_table(Scope::Global, None);
        let class_name = interner.intern("Main");
        let idx = tables.add(global, class_name, "Main", Kind::Class, l, &mut interner, &mut diagnostics);
        assert!(tables.lookup(global, class_name, Depth::Local).unwrap().child_table.is_none());
        let class_table = tables.create_table(Scope::Class, Some(global));
        tables.link_child_table(global, idx, class_table);
        assert_eq!(
            tables.lookup(global, class_name, Depth::Local).unwrap().child_table,
            Some(class_table)
        );
    }

    #[test]
    fn owning_symbol_recovers_subroutine_from_its_own_body_table() {
        let (mut tables, mut interner, mut diagnostics) = setup();
        let l = loc(&mut interner);
        let global = tables.create_table(Scope::Global, None);
        let class = tables.create_table(Scope::Class, Some(global));
        let sub_name = interner.intern("run");
        let idx = tables.add(class, sub_name, "void", Kind::Function, l, &mut interner, &mut diagnostics);
        let sub_table = tables.create_table(Scope::Function, Some(class));
        tables.link_child_table(class, idx, sub_table);

        let owner = tables.owning_symbol(sub_table).unwrap();
        assert_eq!(owner.name, sub_name);
    }

    #[test]
    fn get_symbols_of_kind_preserves_insertion_order() {
        let (mut tables, mut interner, mut diagnostics) = setup();
        let l = loc(&mut interner);
        let table = tables.create_table(Scope::Function, None);
        let names: Vec<Symbol> = ["a", "b", "c"].iter().map(|n| interner.intern(n)).collect();
        for n in &names {
            tables.add(table, *n, "int", Kind::Arg, l, &mut interner, &mut diagnostics);
        }
        let args = tables.get_symbols_of_kind(table, Kind::Arg);
        let got: Vec<Symbol> = args.iter().map(|s| s.name).collect();
        assert_eq!(got, names);
    }
}
