//! Traversal state shared by the analysis passes.
//!
//! The context owns the scope cursor and the contextual literal-precision
//! state. Changes are made through the closure-scoped helpers of [`Scoped`],
//! which restore the previous state when the closure returns, including when
//! it returns an error.

use tracing::trace;

use super::literal::DefaultPrecision;
use crate::ast::StmtId;
use crate::core::types::{Precision, SemanticType};
use crate::errors::{Result, SemanticError, SourceLocation};
use crate::symbols::{ScopeCursor, ScopeId, Symbol, SymbolKind, SymbolTable};

/// Declaration forms that own a scope through their symbol entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOwner {
    Module,
    Procedure,
    Task,
}

impl ScopeOwner {
    fn scope_of(self, symbol: &Symbol) -> Option<ScopeId> {
        match (self, &symbol.kind) {
            (ScopeOwner::Module, SymbolKind::Module { scope })
            | (ScopeOwner::Procedure, SymbolKind::Procedure { scope, .. })
            | (ScopeOwner::Task, SymbolKind::Task { scope, .. }) => Some(*scope),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TraversalContext<'a> {
    cursor: ScopeCursor<'a>,
    /// Precision imposed on fixed literals by an enclosing assignment.
    fixed_length: Option<Precision>,
    /// Type fixed literals at their minimal width (counting-loop bounds).
    minimal_width: bool,
    /// Literal precisions replacing the scope defaults (declaration initializers).
    literal_defaults: Option<DefaultPrecision>,
}

impl<'a> TraversalContext<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            cursor: ScopeCursor::new(table),
            fixed_length: None,
            minimal_width: false,
            literal_defaults: None,
        }
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.cursor.table()
    }

    pub fn cursor(&self) -> &ScopeCursor<'a> {
        &self.cursor
    }

    pub fn current_scope(&self) -> ScopeId {
        self.cursor.current()
    }

    pub fn fixed_length(&self) -> Option<Precision> {
        self.fixed_length
    }

    pub fn minimal_width(&self) -> bool {
        self.minimal_width
    }

    /// Literal precisions in effect: the initializer override if one is
    /// active, else the defaults of the current scope.
    pub fn default_precision(&self) -> DefaultPrecision {
        self.literal_defaults.unwrap_or_else(|| DefaultPrecision {
            fixed: self.cursor.default_fixed_length(),
            float: self.cursor.default_float_length(),
        })
    }

    /// Literal precisions of an initializer of variable `name`, declared in
    /// the current scope: the language default fixed precision, and the
    /// declared precision for float variables.
    pub fn initializer_defaults(
        &self,
        name: &str,
        location: SourceLocation,
    ) -> Result<DefaultPrecision> {
        let ty = match self.lookup_local(name).map(|s| &s.kind) {
            Some(SymbolKind::Variable { ty, .. }) => ty,
            _ => return Err(SemanticError::internal(location, name)),
        };
        let language = self.table().defaults();
        Ok(DefaultPrecision {
            fixed: language.fixed_precision,
            float: match ty.scalar() {
                SemanticType::Float(g) => *g,
                _ => language.float_precision,
            },
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&'a Symbol> {
        self.cursor
            .lookup(name)
            .and_then(|id| self.table().symbol(id))
    }

    pub fn lookup_local(&self, name: &str) -> Option<&'a Symbol> {
        self.cursor
            .lookup_local(name)
            .and_then(|id| self.table().symbol(id))
    }

    /// Scope of the module, procedure or task `name` declared in the current
    /// scope.
    pub fn declared_scope(
        &self,
        owner: ScopeOwner,
        name: &str,
        location: SourceLocation,
    ) -> Result<ScopeId> {
        self.lookup_local(name)
            .and_then(|symbol| owner.scope_of(symbol))
            .ok_or_else(|| SemanticError::internal(location, name))
    }

    /// Scope opened by a block or loop statement.
    pub fn statement_scope(&self, stmt: StmtId, location: SourceLocation) -> Result<ScopeId> {
        self.table()
            .statement_scope(stmt)
            .ok_or_else(|| SemanticError::internal(location, format!("no scope bound to {}", stmt)))
    }
}

/// Access to a [`TraversalContext`] with state-restoring helpers.
pub trait Scoped<'a>: Sized {
    fn context(&mut self) -> &mut TraversalContext<'a>;

    /// Run `f` with the cursor descended into `scope`.
    fn within_scope<R>(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let cursor = &mut self.context().cursor;
        let parent = cursor.current();
        cursor.enter(scope);
        trace!(%parent, %scope, depth = cursor.depth(), "enter scope");

        let result = f(self);

        let cursor = &mut self.context().cursor;
        cursor.leave();
        debug_assert_eq!(cursor.current(), parent);
        trace!(%scope, %parent, "leave scope");
        result
    }

    /// Run `f` inside the scope of the module, procedure or task `name`.
    fn within_declared<R>(
        &mut self,
        owner: ScopeOwner,
        name: &str,
        location: SourceLocation,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let scope = self.context().declared_scope(owner, name, location)?;
        self.within_scope(scope, f)
    }

    /// Run `f` inside the scope opened by a block or loop statement.
    fn within_statement<R>(
        &mut self,
        stmt: StmtId,
        location: SourceLocation,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let scope = self.context().statement_scope(stmt, location)?;
        self.within_scope(scope, f)
    }

    /// Run `f` with minimal-width typing of fixed literals switched on or off.
    fn with_minimal_width<R>(
        &mut self,
        enabled: bool,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let previous = std::mem::replace(&mut self.context().minimal_width, enabled);
        let result = f(self);
        self.context().minimal_width = previous;
        result
    }

    /// Run `f` with `defaults` in place of the scope's literal precisions.
    fn with_literal_defaults<R>(
        &mut self,
        defaults: DefaultPrecision,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let previous = self.context().literal_defaults.replace(defaults);
        let result = f(self);
        self.context().literal_defaults = previous;
        result
    }

    /// Run `f` with `length` as the contextual precision of fixed literals.
    fn with_fixed_length<R>(
        &mut self,
        length: Option<Precision>,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let previous = std::mem::replace(&mut self.context().fixed_length, length);
        let result = f(self);
        self.context().fixed_length = previous;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Walker<'a> {
        ctx: TraversalContext<'a>,
    }

    impl<'a> Scoped<'a> for Walker<'a> {
        fn context(&mut self) -> &mut TraversalContext<'a> {
            &mut self.ctx
        }
    }

    #[test]
    fn test_scope_restored_after_error() {
        let mut table = SymbolTable::default();
        let (_, module) = table.declare_module("m");
        let mut walker = Walker {
            ctx: TraversalContext::new(&table),
        };
        let root = walker.ctx.current_scope();

        let result: Result<()> = walker.within_scope(module, |p| {
            assert_eq!(p.ctx.current_scope(), module);
            Err(SemanticError::internal(SourceLocation::default(), "boom"))
        });

        assert!(result.is_err());
        assert_eq!(walker.ctx.current_scope(), root);
    }

    #[test]
    fn test_contextual_state_nests() {
        let table = SymbolTable::default();
        let mut walker = Walker {
            ctx: TraversalContext::new(&table),
        };

        walker
            .with_fixed_length(Some(7), |p| {
                assert_eq!(p.ctx.fixed_length(), Some(7));
                p.with_minimal_width(true, |p| {
                    assert!(p.ctx.minimal_width());
                    Ok(())
                })?;
                assert!(!p.ctx.minimal_width());
                Ok(())
            })
            .unwrap();

        assert_eq!(walker.ctx.fixed_length(), None);
    }

    #[test]
    fn test_initializer_defaults_override_scope() {
        let mut table = SymbolTable::default();
        let (_, module) = table.declare_module("m");
        table.set_default_lengths(module, Some(15), Some(53));
        table.declare_variable(module, "n", SemanticType::Fixed(15), false);
        table.declare_variable(module, "r", SemanticType::Float(53), false);

        let mut walker = Walker {
            ctx: TraversalContext::new(&table),
        };
        walker
            .within_scope(module, |p| {
                let loc = SourceLocation::default();
                assert_eq!(p.ctx.default_precision(), DefaultPrecision { fixed: 15, float: 53 });

                let n = p.ctx.initializer_defaults("n", loc)?;
                assert_eq!(n, DefaultPrecision { fixed: 31, float: 24 });
                assert_eq!(p.ctx.initializer_defaults("r", loc)?.float, 53);
                assert!(p.ctx.initializer_defaults("missing", loc).is_err());

                p.with_literal_defaults(n, |p| {
                    assert_eq!(p.ctx.default_precision(), n);
                    Ok(())
                })?;
                assert_eq!(p.ctx.default_precision().fixed, 15);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_declared_scope_checks_kind() {
        let mut table = SymbolTable::default();
        let (_, module) = table.declare_module("m");
        let (_, proc) = table.declare_procedure(module, "p", Some(SemanticType::Fixed(15)));
        table.declare_variable(module, "v", SemanticType::Fixed(15), false);

        let mut walker = Walker {
            ctx: TraversalContext::new(&table),
        };
        walker
            .within_scope(module, |p| {
                let loc = SourceLocation::default();
                assert_eq!(p.ctx.declared_scope(ScopeOwner::Procedure, "p", loc)?, proc);
                assert!(p.ctx.declared_scope(ScopeOwner::Task, "p", loc).is_err());
                assert!(p.ctx.declared_scope(ScopeOwner::Procedure, "v", loc).is_err());
                Ok(())
            })
            .unwrap();
    }
}
