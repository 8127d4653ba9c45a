//! Scope-nested symbol table.
//!
//! Built by declaration processing before semantic analysis and consumed
//! read-only by the passes through a [`ScopeCursor`](super::ScopeCursor).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

use super::scope::{Scope, ScopeId};
use crate::ast::StmtId;
use crate::core::types::SemanticType;
use crate::frontend::config::LanguageDefaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Module {
        scope: ScopeId,
    },
    Procedure {
        scope: ScopeId,
        /// `None` for procedures without `RETURNS`.
        result: Option<SemanticType>,
    },
    Task {
        scope: ScopeId,
        is_main: bool,
        is_global: bool,
    },
    Variable {
        ty: SemanticType,
        /// `INV` variables; doubles as the constancy of a reference.
        assignment_protected: bool,
    },
    Semaphore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Scope the symbol is declared in.
    pub declared_in: ScopeId,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    statement_scopes: HashMap<StmtId, ScopeId>,
    defaults: LanguageDefaults,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new(LanguageDefaults::default())
    }
}

impl SymbolTable {
    pub fn new(defaults: LanguageDefaults) -> Self {
        Self {
            scopes: vec![Scope::new(ScopeId(0), None)],
            symbols: Vec::new(),
            statement_scopes: HashMap::new(),
            defaults,
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn defaults(&self) -> &LanguageDefaults {
        &self.defaults
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id).and_then(|s| s.parent)
    }

    /// Allocate a fresh scope nested in `parent`.
    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, Some(parent)));
        id
    }

    /// Record `LENGTH FIXED(..)` / `LENGTH FLOAT(..)` for a scope.
    pub fn set_default_lengths(&mut self, scope: ScopeId, fixed: Option<u32>, float: Option<u32>) {
        if let Some(s) = self.scopes.get_mut(scope.index()) {
            if fixed.is_some() {
                s.fixed_length = fixed;
            }
            if float.is_some() {
                s.float_length = float;
            }
        }
    }

    pub fn declare(&mut self, scope: ScopeId, name: &str, kind: SymbolKind) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        trace!(%scope, symbol_name = name, symbol = %id, "declare");
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            declared_in: scope,
        });
        if let Some(s) = self.scopes.get_mut(scope.index()) {
            s.insert_symbol(name.to_string(), id);
        }
        id
    }

    /// Declare a module at the root and allocate its scope.
    pub fn declare_module(&mut self, name: &str) -> (SymbolId, ScopeId) {
        let root = self.root();
        let scope = self.new_scope(root);
        (self.declare(root, name, SymbolKind::Module { scope }), scope)
    }

    pub fn declare_procedure(
        &mut self,
        parent: ScopeId,
        name: &str,
        result: Option<SemanticType>,
    ) -> (SymbolId, ScopeId) {
        let scope = self.new_scope(parent);
        let id = self.declare(parent, name, SymbolKind::Procedure { scope, result });
        (id, scope)
    }

    pub fn declare_task(
        &mut self,
        parent: ScopeId,
        name: &str,
        is_main: bool,
        is_global: bool,
    ) -> (SymbolId, ScopeId) {
        let scope = self.new_scope(parent);
        let id = self.declare(
            parent,
            name,
            SymbolKind::Task {
                scope,
                is_main,
                is_global,
            },
        );
        (id, scope)
    }

    pub fn declare_variable(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: SemanticType,
        assignment_protected: bool,
    ) -> SymbolId {
        self.declare(
            scope,
            name,
            SymbolKind::Variable {
                ty,
                assignment_protected,
            },
        )
    }

    pub fn declare_semaphore(&mut self, scope: ScopeId, name: &str) -> SymbolId {
        self.declare(scope, name, SymbolKind::Semaphore)
    }

    /// Allocate the scope opened by a block or loop statement.
    pub fn bind_statement_scope(&mut self, stmt: StmtId, parent: ScopeId) -> ScopeId {
        let scope = self.new_scope(parent);
        self.statement_scopes.insert(stmt, scope);
        scope
    }

    pub fn statement_scope(&self, stmt: StmtId) -> Option<ScopeId> {
        self.statement_scopes.get(&stmt).copied()
    }

    /// Search `scope` and then its enclosing scopes.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id)?;
            if let Some(found) = s.lookup(name) {
                return Some(found);
            }
            current = s.parent;
        }
        None
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope).and_then(|s| s.lookup(name))
    }

    /// Innermost `LENGTH FIXED` in effect, else the language default.
    pub fn default_fixed_length(&self, scope: ScopeId) -> u32 {
        self.inherited(scope, |s| s.fixed_length)
            .unwrap_or(self.defaults.fixed_precision)
    }

    /// Innermost `LENGTH FLOAT` in effect, else the language default.
    pub fn default_float_length(&self, scope: ScopeId) -> u32 {
        self.inherited(scope, |s| s.float_length)
            .unwrap_or(self.defaults.float_precision)
    }

    fn inherited(&self, scope: ScopeId, field: impl Fn(&Scope) -> Option<u32>) -> Option<u32> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id)?;
            if let Some(value) = field(s) {
                return Some(value);
            }
            current = s.parent;
        }
        None
    }

    /// Module symbols declared at the root, in declaration order.
    pub fn modules(&self) -> Vec<SymbolId> {
        self.scope(self.root())
            .map(|root| {
                root.declared()
                    .iter()
                    .copied()
                    .filter(|id| {
                        matches!(
                            self.symbol(*id).map(|s| &s.kind),
                            Some(SymbolKind::Module { .. })
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let mut table = SymbolTable::default();
        let (_, module) = table.declare_module("m");
        let x = table.declare_variable(module, "x", SemanticType::Fixed(15), false);
        let (_, proc) = table.declare_procedure(module, "p", None);

        assert_eq!(table.lookup(proc, "x"), Some(x));
        assert_eq!(table.lookup_local(proc, "x"), None);
        assert_eq!(table.lookup(proc, "y"), None);
    }

    #[test]
    fn test_inner_declaration_shadows() {
        let mut table = SymbolTable::default();
        let (_, module) = table.declare_module("m");
        table.declare_variable(module, "x", SemanticType::Fixed(15), false);
        let (_, task) = table.declare_task(module, "t", true, false);
        let inner = table.declare_variable(task, "x", SemanticType::Float(53), false);
        assert_eq!(table.lookup(task, "x"), Some(inner));
    }

    #[test]
    fn test_default_lengths_inherit() {
        let mut table = SymbolTable::default();
        let (_, module) = table.declare_module("m");
        table.set_default_lengths(module, Some(15), None);
        let (_, proc) = table.declare_procedure(module, "p", None);
        let block = table.bind_statement_scope(StmtId(3), proc);
        table.set_default_lengths(block, None, Some(53));

        assert_eq!(table.default_fixed_length(table.root()), 31);
        assert_eq!(table.default_fixed_length(block), 15);
        assert_eq!(table.default_float_length(block), 53);
        assert_eq!(table.default_float_length(proc), 24);
        assert_eq!(table.statement_scope(StmtId(3)), Some(block));
    }

    #[test]
    fn test_modules_in_declaration_order() {
        let mut table = SymbolTable::default();
        let (a, _) = table.declare_module("a");
        table.declare_semaphore(table.root(), "s");
        let (b, _) = table.declare_module("b");
        assert_eq!(table.modules(), vec![a, b]);
    }

    #[test]
    fn test_redeclared_module_listed_once() {
        let mut table = SymbolTable::default();
        table.declare_module("m");
        let (again, _) = table.declare_module("m");
        assert_eq!(table.modules(), vec![again]);
    }
}
