//! Static semantic analysis for PEARL compilation units.
//!
//! After symbol collection, two passes run over the syntax tree of a unit:
//! the constant pool builder collects every compile-time constant, and the
//! expression type engine computes the type and constancy of every
//! expression, enforcing the operator typing rules.

pub mod analysis;
pub mod ast;
pub mod core;
pub mod errors;
pub mod frontend;
pub mod infrastructure;
pub mod symbols;

// Re-export commonly used items
pub use analysis::{
    AnalysisResult, ConstantPoolBuilder, ExpressionTable, ExpressionTypeEngine, SemanticAnalyzer,
};
pub use ast::{SyntaxTree, TreeBuilder, Visitor};
pub use crate::core::{ConstantPool, ConstantValue, ExpressionResult, SemanticType};
pub use errors::{ErrorKind, Result, SemanticError, SourceLocation};
pub use frontend::{Config, LanguageDefaults};
pub use symbols::{SymbolTable, ScopeId, SymbolId, SymbolKind};

/// Build the symbol table for a configured analysis.
pub fn symbol_table(config: &Config) -> SymbolTable {
    SymbolTable::new(config.defaults)
}
