//! Expression typing
//!
//! Computes a `(type, constant, variable)` result for every expression node,
//! bottom-up, and records it in an [`ExpressionTable`] indexed by expression
//! id. Operand combinations are checked against the rule table in
//! [`super::rules`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info, instrument, trace};

use super::context::{ScopeOwner, Scoped, TraversalContext};
use super::literal::{self, LiteralSite};
use super::rules::{self, RuleParams};
use crate::ast::*;
use crate::core::constant::ConstantValue;
use crate::core::types::{ExpressionResult, SemanticType};
use crate::errors::{Result, SemanticError};
use crate::symbols::{SymbolKind, SymbolTable};

/// Expression results of one unit, indexed by [`ExprId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionTable {
    results: Vec<Option<ExpressionResult>>,
}

impl ExpressionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(expressions: usize) -> Self {
        Self {
            results: vec![None; expressions],
        }
    }

    pub fn record(&mut self, id: ExprId, result: ExpressionResult) {
        if id.index() >= self.results.len() {
            self.results.resize(id.index() + 1, None);
        }
        self.results[id.index()] = Some(result);
    }

    pub fn result_of(&self, id: ExprId) -> Option<&ExpressionResult> {
        self.results.get(id.index()).and_then(Option::as_ref)
    }

    pub fn type_of(&self, id: ExprId) -> Option<&SemanticType> {
        self.result_of(id).map(|r| &r.ty)
    }

    /// Number of typed expressions.
    pub fn len(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &ExpressionResult)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().map(|r| (ExprId(i as u32), r)))
    }

    /// JSON object keyed by expression id.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ExpressionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, result) in self.iter() {
            map.serialize_entry(&id.0, result)?;
        }
        map.end()
    }
}

pub struct ExpressionTypeEngine<'a> {
    ctx: TraversalContext<'a>,
    results: ExpressionTable,
    params: RuleParams,
}

impl<'a> ExpressionTypeEngine<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            ctx: TraversalContext::new(symbols),
            results: ExpressionTable::new(),
            params: RuleParams {
                duration_ratio_precision: symbols.defaults().duration_ratio_precision,
            },
        }
    }

    pub fn results(&self) -> &ExpressionTable {
        &self.results
    }

    /// Type every expression of `tree`.
    #[instrument(skip_all, name = "expression_types")]
    pub fn analyze(mut self, tree: &SyntaxTree) -> Result<ExpressionTable> {
        self.results = ExpressionTable::with_capacity(tree.expr_count());
        if let Err(e) = self.visit_tree(tree) {
            debug!(error = %e, "expression typing aborted");
            return Err(e);
        }
        info!(typed = self.results.len(), "expression types computed");
        Ok(self.results)
    }

    /// Result of an already visited operand.
    fn operand(&self, tree: &SyntaxTree, id: ExprId) -> Result<ExpressionResult> {
        self.results.result_of(id).cloned().ok_or_else(|| {
            let expr = tree.expr(id);
            SemanticError::internal(expr.location, &expr.text)
        })
    }

    fn infer(&mut self, tree: &SyntaxTree, id: ExprId) -> Result<ExpressionResult> {
        let expr = tree.expr(id);
        match &expr.kind {
            ExprKind::Literal(lit) => self.type_literal(expr, lit),
            ExprKind::Name(name) => self.type_name(expr, name),
            ExprKind::Unary { op, operand } => {
                if *op == UnaryOp::Minus && self.ctx.minimal_width() {
                    if let Some(result) = self.type_negative_bound(tree, id, *operand)? {
                        return Ok(result);
                    }
                }
                self.visit_expr(tree, *operand)?;
                let operand = self.operand(tree, *operand)?;
                let ty = rules::unary(*op, &operand.ty)
                    .map_err(|v| v.at(expr.location, &expr.text))?;
                trace!(%op, operand = %operand.ty, result = %ty, "monadic rule");
                Ok(ExpressionResult::new(ty, operand.constant))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.visit_expr(tree, *lhs)?;
                let lhs = self.operand(tree, *lhs)?;
                self.visit_expr(tree, *rhs)?;
                let rhs = self.operand(tree, *rhs)?;
                let ty = rules::binary(*op, &lhs.ty, &rhs.ty, self.params)
                    .map_err(|v| v.at(expr.location, &expr.text))?;
                trace!(%op, lhs = %lhs.ty, rhs = %rhs.ty, result = %ty, "dyadic rule");
                Ok(ExpressionResult::new(ty, lhs.constant && rhs.constant))
            }
            ExprKind::Paren(inner) => {
                self.visit_expr(tree, *inner)?;
                self.operand(tree, *inner)
            }
            ExprKind::SemaTry(semaphores) => {
                if semaphores.is_empty() {
                    return Err(SemanticError::internal(expr.location, &expr.text));
                }
                Ok(ExpressionResult::runtime(SemanticType::Bit(1)))
            }
            ExprKind::Now => Ok(ExpressionResult::runtime(SemanticType::Clock)),
            ExprKind::SizeOf(_) => Ok(ExpressionResult::runtime(SemanticType::Fixed(
                self.ctx.table().defaults().fixed_length,
            ))),
            ExprKind::TaskFunction(_) => Ok(ExpressionResult::runtime(SemanticType::Task)),
            ExprKind::Cont(inner) => {
                self.visit_expr(tree, *inner)?;
                match self.operand(tree, *inner)?.ty {
                    SemanticType::Reference(target) => Ok(ExpressionResult::runtime(*target)),
                    _ => Err(SemanticError::illegal_expression(expr.location, &expr.text)),
                }
            }
            ExprKind::Slice {
                kind,
                target,
                index,
            } => {
                self.visit_expr(tree, *target)?;
                self.visit_expr(tree, *index)?;
                let ty = match kind {
                    SliceKind::Bit => SemanticType::Bit(1),
                    SliceKind::Char => SemanticType::Char(1),
                };
                Ok(ExpressionResult::runtime(ty))
            }
        }
    }

    /// `-literal` in a loop bound is one value, so its width includes the
    /// sign bit.
    fn type_negative_bound(
        &mut self,
        tree: &SyntaxTree,
        id: ExprId,
        operand: ExprId,
    ) -> Result<Option<ExpressionResult>> {
        let inner = tree.expr(operand);
        let ExprKind::Literal(lit) = &inner.kind else {
            return Ok(None);
        };
        let site = LiteralSite::new(inner.location, &tree.expr(id).text);
        match literal::decode_negated(lit, self.ctx.default_precision(), site)? {
            Some(ConstantValue::Fixed { value, .. }) => {
                let ty = SemanticType::Fixed(literal::minimal_fixed_width(value));
                self.results.record(operand, ExpressionResult::constant(ty.clone()));
                Ok(Some(ExpressionResult::constant(ty)))
            }
            _ => Ok(None),
        }
    }

    /// Fixed literal precision, lowest to highest priority: scope default,
    /// explicit suffix, assignment target, minimal width in loop bounds.
    fn type_literal(&self, expr: &Expr, lit: &Literal) -> Result<ExpressionResult> {
        let site = LiteralSite::new(expr.location, &expr.text);
        let value = literal::decode(lit, self.ctx.default_precision(), site)?;
        let ty = match value {
            ConstantValue::Fixed { value, precision } => {
                let precision = if self.ctx.minimal_width() {
                    literal::minimal_fixed_width(value)
                } else {
                    self.ctx.fixed_length().unwrap_or(precision)
                };
                SemanticType::Fixed(precision)
            }
            ref other => literal::type_of_constant(other),
        };
        Ok(ExpressionResult::constant(ty))
    }

    fn type_name(&self, expr: &Expr, name: &str) -> Result<ExpressionResult> {
        let id = self
            .ctx
            .cursor()
            .lookup(name)
            .ok_or_else(|| SemanticError::unknown_identifier(expr.location, name))?;
        let symbol = self
            .ctx
            .table()
            .symbol(id)
            .ok_or_else(|| SemanticError::internal(expr.location, name))?;

        match &symbol.kind {
            SymbolKind::Variable {
                ty,
                assignment_protected,
            } => {
                let ty = match ty {
                    SemanticType::Array(base) => base.as_ref().clone(),
                    other => other.clone(),
                };
                Ok(ExpressionResult::new(ty, *assignment_protected).with_variable(id))
            }
            SymbolKind::Procedure {
                result: Some(result),
                ..
            } => Ok(ExpressionResult::runtime(result.clone())),
            _ => Err(SemanticError::internal(expr.location, name)),
        }
    }
}

impl<'a> Scoped<'a> for ExpressionTypeEngine<'a> {
    fn context(&mut self) -> &mut TraversalContext<'a> {
        &mut self.ctx
    }
}

impl<'a> Visitor for ExpressionTypeEngine<'a> {
    fn visit_module(&mut self, tree: &SyntaxTree, module: &Module) -> Result<()> {
        debug!(module = %module.name, "typing expressions");
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
            let defaults = self.ctx.initializer_defaults(name, tree.expr(*init).location)?;
            self.with_literal_defaults(defaults, |this| this.visit_expr(tree, *init))?;
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

    fn visit_loop_clause(
        &mut self,
        tree: &SyntaxTree,
        clause: LoopClause,
        expr: ExprId,
    ) -> Result<()> {
        match clause {
            LoopClause::From | LoopClause::By | LoopClause::To => {
                self.with_minimal_width(true, |this| this.visit_expr(tree, expr))
            }
            LoopClause::While => self.visit_expr(tree, expr),
        }
    }

    fn visit_assignment(
        &mut self,
        tree: &SyntaxTree,
        stmt: StmtId,
        target: &str,
        value: ExprId,
    ) -> Result<()> {
        let location = tree.stmt(stmt).location;
        let length = match self.ctx.lookup(target).map(|s| &s.kind) {
            Some(SymbolKind::Variable { ty, .. }) => match ty.scalar() {
                SemanticType::Fixed(g) => Some(*g),
                _ => None,
            },
            _ => return Err(SemanticError::unknown_identifier(location, target)),
        };
        self.with_fixed_length(length, |this| this.visit_expr(tree, value))
    }

    fn visit_expr(&mut self, tree: &SyntaxTree, id: ExprId) -> Result<()> {
        let result = self.infer(tree, id)?;
        trace!(expr = %id, text = %tree.expr(id).text, %result, "typed");
        self.results.record(id, result);
        Ok(())
    }
}
