use smol_str::SmolStr;
use std::{
    collections::{btree_map::Entry, BTreeMap},
    fmt,
};

/// Variable binding resolved from a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Primitive type name, or an unchecked class name.
    pub ty: SmolStr,
    pub kind: SymbolKind,
    /// Allocation slot within the kind's segment.
    pub index: u16,
}

/// Storage kind, which decides the memory segment a variable lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Class scope, shared by all instances.
    Static,
    /// Class scope, one per instance.
    Field,
    /// Subroutine scope.
    Argument,
    /// Subroutine scope.
    Local,
}

impl SymbolKind {
    #[inline]
    fn slot(self) -> usize {
        match self {
            Self::Static => 0,
            Self::Field => 1,
            Self::Argument => 2,
            Self::Local => 3,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Field => write!(f, "field"),
            Self::Argument => write!(f, "argument"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Mapping of names to bindings, with a running index per storage kind.
///
/// One table lives for the whole class, and a second one is
/// [`reset`](SymbolTable::reset) at the start of every subroutine.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<SmolStr, Symbol>,
    counts: [u16; 4],
}

impl SymbolTable {
    /// Register a fresh binding with the next index of its kind.
    ///
    /// Redefining a name replaces the previous binding. The replaced
    /// binding's index stays consumed.
    pub fn define(&mut self, name: &str, ty: &str, kind: SymbolKind) -> &Symbol {
        let count = &mut self.counts[kind.slot()];
        let index = *count;
        *count += 1;

        let name = SmolStr::from(name);
        let symbol = Symbol {
            name: name.clone(),
            ty: SmolStr::from(ty),
            kind,
            index,
        };

        match self.symbols.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.insert(symbol);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(symbol),
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    #[inline]
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.get(name).map(|symbol| symbol.kind)
    }

    #[inline]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|symbol| symbol.ty.as_str())
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.get(name).map(|symbol| symbol.index)
    }

    /// Number of bindings of the given kind defined since the last reset.
    #[inline]
    pub fn var_count(&self, kind: SymbolKind) -> u16 {
        self.counts[kind.slot()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Clear all bindings and zero every counter.
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.counts = [0; 4];
    }
}
