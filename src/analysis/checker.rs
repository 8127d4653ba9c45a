//! Semantic analysis of one compilation unit.

use serde::Serialize;
use tracing::{info, info_span};

use super::constant_pool::ConstantPoolBuilder;
use super::expression_type::{ExpressionTable, ExpressionTypeEngine};
use crate::ast::SyntaxTree;
use crate::core::constant::ConstantPool;
use crate::errors::{Result, SemanticError, SourceLocation};
use crate::symbols::SymbolTable;

/// Side tables produced for a unit.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub pool: ConstantPool,
    pub expressions: ExpressionTable,
}

impl AnalysisResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs the constant pool pass and then the expression typing pass.
pub struct SemanticAnalyzer<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    pub fn analyze(&self, tree: &SyntaxTree) -> Result<AnalysisResult> {
        let span = info_span!("semantic_analysis", modules = tree.modules.len());
        let _guard = span.enter();

        self.check_single_module(tree)?;

        let pool = ConstantPoolBuilder::new(self.symbols).build(tree)?;
        let expressions = ExpressionTypeEngine::new(self.symbols).analyze(tree)?;

        info!(
            constants = pool.len(),
            expressions = expressions.len(),
            "semantic analysis complete"
        );
        Ok(AnalysisResult { pool, expressions })
    }

    /// Only a single top-level module per unit is supported.
    fn check_single_module(&self, tree: &SyntaxTree) -> Result<()> {
        let declared = self.symbols.modules().len();
        if declared > 1 || tree.modules.len() > 1 {
            let location = tree
                .modules
                .get(1)
                .map(|m| m.location)
                .unwrap_or_else(SourceLocation::default);
            return Err(SemanticError::not_yet_implemented("multiple modules", location));
        }
        Ok(())
    }
}
