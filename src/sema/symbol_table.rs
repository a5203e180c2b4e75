// src/sema/symbol_table.rs

use rustc_hash::FxHashMap;

use crate::frontend::token::Span;
use crate::sema::type_pool::TypeId;

/// Kind of a declared variable. Determines the VM segment and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Static,
    Field,
    Arg,
    Local,
}

impl SymbolKind {
    fn as_index(self) -> usize {
        match self {
            SymbolKind::Static => 0,
            SymbolKind::Field => 1,
            SymbolKind::Arg => 2,
            SymbolKind::Local => 3,
        }
    }

    fn is_class_scope(self) -> bool {
        matches!(self, SymbolKind::Static | SymbolKind::Field)
    }
}

/// A declared variable: type, kind, running index within the kind, and
/// declaration site.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub ty: TypeId,
    pub kind: SymbolKind,
    pub index: u16,
    pub span: Span,
}

/// State of a finished subroutine scope, re-entered by name during code
/// generation.
#[derive(Debug, Clone)]
struct SubroutineSnapshot {
    name: String,
    symbols: FxHashMap<String, Symbol>,
    counters: [u16; 4],
}

/// Per-class symbol table: a class scope (static/field), a subroutine
/// scope (arg/local), per-kind index counters, and a history of
/// finished subroutine scopes.
///
/// Shadowing class-scope names from the subroutine scope is not
/// permitted; `define` rejects any duplicate across the visible scope.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: FxHashMap<String, Symbol>,
    sub_scope: FxHashMap<String, Symbol>,
    counters: [u16; 4],
    history: Vec<SubroutineSnapshot>,
    current: Option<String>,
}

/// Rejected definition: the name already exists in the visible scope.
#[derive(Debug, Clone)]
pub struct AlreadyDefined {
    pub name: String,
    pub previous: Span,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a variable, assigning the next index of its kind.
    pub fn define(
        &mut self,
        name: &str,
        ty: TypeId,
        kind: SymbolKind,
        span: Span,
    ) -> Result<&Symbol, AlreadyDefined> {
        if let Some(existing) = self.lookup(name) {
            return Err(AlreadyDefined {
                name: name.to_string(),
                previous: existing.span,
            });
        }

        let index = self.counters[kind.as_index()];
        self.counters[kind.as_index()] += 1;

        let symbol = Symbol {
            ty,
            kind,
            index,
            span,
        };
        let scope = if kind.is_class_scope() {
            &mut self.class_scope
        } else {
            &mut self.sub_scope
        };
        Ok(scope.entry(name.to_string()).or_insert(symbol))
    }

    /// Look a name up, subroutine scope first, then class scope.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.sub_scope.get(name).or_else(|| self.class_scope.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.lookup(name).map(|s| s.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<TypeId> {
        self.lookup(name).map(|s| s.ty)
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|s| s.index)
    }

    /// Number of variables of the given kind in the visible scope.
    pub fn var_count(&self, kind: SymbolKind) -> u16 {
        self.counters[kind.as_index()]
    }

    /// Open a fresh subroutine scope: clears arg/local symbols and
    /// resets their counters. Class-scope state is untouched.
    pub fn start_subroutine(&mut self, name: &str) {
        self.sub_scope.clear();
        self.counters[SymbolKind::Arg.as_index()] = 0;
        self.counters[SymbolKind::Local.as_index()] = 0;
        self.current = Some(name.to_string());
    }

    /// Close the current subroutine scope, recording it in history so
    /// code generation can re-enter it without re-analyzing.
    pub fn end_subroutine(&mut self) {
        if let Some(name) = self.current.take() {
            self.history.push(SubroutineSnapshot {
                name,
                symbols: std::mem::take(&mut self.sub_scope),
                counters: self.counters,
            });
        }
    }

    /// Restore a finished subroutine scope by name. Returns false if no
    /// snapshot with that name exists.
    pub fn enter_subroutine(&mut self, name: &str) -> bool {
        let Some(snapshot) = self.history.iter().find(|s| s.name == name) else {
            return false;
        };
        self.sub_scope = snapshot.symbols.clone();
        self.counters = snapshot.counters;
        self.current = Some(name.to_string());
        true
    }
}
