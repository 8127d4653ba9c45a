//! Symbol table service
//!
//! Scopes nest statically (root, module, procedure/task, block/loop) and are
//! owned by the [`SymbolTable`]; the analysis navigates them with a borrowed
//! [`ScopeCursor`].

pub mod scope;
pub mod table;

pub use scope::{Scope, ScopeCursor, ScopeId};
pub use table::{Symbol, SymbolId, SymbolKind, SymbolTable};
