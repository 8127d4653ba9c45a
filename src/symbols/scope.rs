//! Lexical scopes and the traversal cursor over them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::table::{SymbolId, SymbolTable};
use crate::frontend::config::LanguageDefaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// One level of the static nesting.
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    /// `LENGTH FIXED(n)` in effect from this scope inward.
    pub fixed_length: Option<u32>,
    /// `LENGTH FLOAT(n)` in effect from this scope inward.
    pub float_length: Option<u32>,
    symbols: HashMap<String, SymbolId>,
    declared: Vec<SymbolId>,
}

impl Scope {
    pub fn new(id: ScopeId, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            parent,
            fixed_length: None,
            float_length: None,
            symbols: HashMap::new(),
            declared: Vec::new(),
        }
    }

    /// Bind a name in this scope; returns the previous binding if one existed.
    pub fn insert_symbol(&mut self, name: String, id: SymbolId) -> Option<SymbolId> {
        let previous = self.symbols.insert(name, id);
        match previous.and_then(|old| self.declared.iter().position(|d| *d == old)) {
            Some(slot) => self.declared[slot] = id,
            None => self.declared.push(id),
        }
        previous
    }

    /// Lookup a symbol by name within this scope only.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }

    /// Symbols in declaration order.
    pub fn declared(&self) -> &[SymbolId] {
        &self.declared
    }
}

/// Navigation cursor over a borrowed [`SymbolTable`].
///
/// Starts at the root scope. Every [`enter`](Self::enter) must be paired with a
/// [`leave`](Self::leave); the root itself can never be left.
#[derive(Debug, Clone)]
pub struct ScopeCursor<'a> {
    table: &'a SymbolTable,
    stack: Vec<ScopeId>,
}

impl<'a> ScopeCursor<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            stack: vec![table.root()],
        }
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    pub fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or_else(|| self.table.root())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Descend into `scope`.
    pub fn enter(&mut self, scope: ScopeId) {
        self.stack.push(scope);
    }

    /// Ascend to the scope active before the matching `enter`.
    pub fn leave(&mut self) -> Option<ScopeId> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.table.lookup(self.current(), name)
    }

    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.table.lookup_local(self.current(), name)
    }

    pub fn default_fixed_length(&self) -> u32 {
        self.table.default_fixed_length(self.current())
    }

    pub fn default_float_length(&self) -> u32 {
        self.table.default_float_length(self.current())
    }

    pub fn defaults(&self) -> &'a LanguageDefaults {
        self.table.defaults()
    }
}
