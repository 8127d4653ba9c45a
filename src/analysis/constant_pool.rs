//! Constant pool construction
//!
//! Walks the unit and pools every literal, folding a unary minus that
//! directly precedes a numeric literal into a single negative constant.

use tracing::{debug, info, instrument, trace};

use super::context::{ScopeOwner, Scoped, TraversalContext};
use super::literal::{self, LiteralSite};
use crate::ast::*;
use crate::core::constant::{ConstantPool, ConstantValue};
use crate::errors::{Result, SemanticError};
use crate::symbols::SymbolTable;

pub struct ConstantPoolBuilder<'a> {
    ctx: TraversalContext<'a>,
    pool: ConstantPool,
}

impl<'a> ConstantPoolBuilder<'a> {
    /// A builder over a pool seeded with 0, 1 and -1 at the language default
    /// fixed precision.
    pub fn new(table: &'a SymbolTable) -> Self {
        let pool = ConstantPool::seeded(table.defaults().fixed_precision);
        Self::with_pool(table, pool)
    }

    pub fn with_pool(table: &'a SymbolTable, pool: ConstantPool) -> Self {
        Self {
            ctx: TraversalContext::new(table),
            pool,
        }
    }

    pub fn pool(&self) -> &ConstantPool {
        &self.pool
    }

    /// Pool every constant of `tree`.
    #[instrument(skip_all, name = "constant_pool")]
    pub fn build(mut self, tree: &SyntaxTree) -> Result<ConstantPool> {
        if let Err(e) = self.visit_tree(tree) {
            debug!(error = %e, "constant pool construction aborted");
            return Err(e);
        }
        info!(
            entries = self.pool.len(),
            bit_strings = self.pool.bit_strings().count(),
            "constant pool built"
        );
        Ok(self.pool)
    }

    /// Insert `value`, returning its pool index.
    pub fn add(&mut self, value: ConstantValue) -> usize {
        self.pool.add(value)
    }

    fn visit_literal(&mut self, expr: &Expr, lit: &Literal) -> Result<()> {
        let site = LiteralSite::new(expr.location, &expr.text);
        let value = literal::decode(lit, self.ctx.default_precision(), site)?;
        trace!(text = %expr.text, %value, "literal");
        self.add(value);
        Ok(())
    }

    /// `-literal` pools the negated value; any other operand is visited as is.
    fn visit_unary_subtractive(
        &mut self,
        tree: &SyntaxTree,
        id: ExprId,
        operand: ExprId,
    ) -> Result<()> {
        let inner = tree.expr(operand);
        if let ExprKind::Literal(lit) = &inner.kind {
            let site = LiteralSite::new(inner.location, &tree.expr(id).text);
            if let Some(value) = literal::decode_negated(lit, self.ctx.default_precision(), site)? {
                trace!(text = %tree.expr(id).text, %value, "folded negative literal");
                self.add(value);
                return Ok(());
            }
        }
        self.visit_expr(tree, operand)
    }

    fn visit_initializer(&mut self, tree: &SyntaxTree, name: &str, init: ExprId) -> Result<()> {
        let defaults = self.ctx.initializer_defaults(name, tree.expr(init).location)?;
        self.with_literal_defaults(defaults, |this| this.visit_expr(tree, init))
    }
}

impl<'a> Scoped<'a> for ConstantPoolBuilder<'a> {
    fn context(&mut self) -> &mut TraversalContext<'a> {
        &mut self.ctx
    }
}

impl<'a> Visitor for ConstantPoolBuilder<'a> {
    fn visit_module(&mut self, tree: &SyntaxTree, module: &Module) -> Result<()> {
        debug!(module = %module.name, "pooling constants");
        self.within_declared(ScopeOwner::Module, &module.name, module.location, |this| {
            this.walk_module(tree, module)
        })
    }

    fn visit_procedure(&mut self, tree: &SyntaxTree, proc: &ProcedureDecl) -> Result<()> {
        self.within_declared(ScopeOwner::Procedure, &proc.name, proc.location, |this| {
            this.walk_body(tree, &proc.body)
        })
    }

    fn visit_task(&mut self, tree: &SyntaxTree, task: &TaskDecl) -> Result<()> {
        self.within_declared(ScopeOwner::Task, &task.name, task.location, |this| {
            this.walk_task(tree, task)
        })
    }

    fn visit_variable(&mut self, tree: &SyntaxTree, decl: &VariableDecl) -> Result<()> {
        for (i, init) in decl.init.iter().enumerate() {
            let name = decl
                .names
                .get(i)
                .or_else(|| decl.names.last())
                .ok_or_else(|| SemanticError::internal(decl.location, "declaration without names"))?;
            self.visit_initializer(tree, name, *init)?;
        }
        Ok(())
    }

    fn visit_block(&mut self, tree: &SyntaxTree, stmt: StmtId, body: &[StmtId]) -> Result<()> {
        self.within_statement(stmt, tree.stmt(stmt).location, |this| {
            this.walk_body(tree, body)
        })
    }

    fn visit_loop(&mut self, tree: &SyntaxTree, stmt: StmtId, lp: &LoopStmt) -> Result<()> {
        self.within_statement(stmt, tree.stmt(stmt).location, |this| this.walk_loop(tree, lp))
    }

    fn visit_expr(&mut self, tree: &SyntaxTree, id: ExprId) -> Result<()> {
        let expr = tree.expr(id);
        match &expr.kind {
            ExprKind::Literal(lit) => self.visit_literal(expr, lit),
            ExprKind::Unary {
                op: UnaryOp::Minus,
                operand,
            } => self.visit_unary_subtractive(tree, id, *operand),
            _ => self.walk_expr(tree, id),
        }
    }
}
