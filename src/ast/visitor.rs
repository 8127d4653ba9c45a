use super::nodes::*;
use crate::errors::Result;

/// Visitor trait for traversing a [`SyntaxTree`] with extensible callbacks.
///
/// Each `visit_*` callback defaults to the matching `walk_*` method, which
/// recurses into the children of the node. Traversal stops at the first error.
pub trait Visitor {
    fn visit_tree(&mut self, tree: &SyntaxTree) -> Result<()> {
        self.walk_tree(tree)
    }

    fn visit_module(&mut self, tree: &SyntaxTree, module: &Module) -> Result<()> {
        self.walk_module(tree, module)
    }

    fn visit_variable(&mut self, tree: &SyntaxTree, decl: &VariableDecl) -> Result<()> {
        self.walk_variable(tree, decl)
    }

    fn visit_procedure(&mut self, tree: &SyntaxTree, proc: &ProcedureDecl) -> Result<()> {
        self.walk_body(tree, &proc.body)
    }

    fn visit_task(&mut self, tree: &SyntaxTree, task: &TaskDecl) -> Result<()> {
        self.walk_task(tree, task)
    }

    fn visit_stmt(&mut self, tree: &SyntaxTree, id: StmtId) -> Result<()> {
        self.walk_stmt(tree, id)
    }

    fn visit_assignment(
        &mut self,
        tree: &SyntaxTree,
        _stmt: StmtId,
        _target: &str,
        value: ExprId,
    ) -> Result<()> {
        self.visit_expr(tree, value)
    }

    fn visit_block(&mut self, tree: &SyntaxTree, _stmt: StmtId, body: &[StmtId]) -> Result<()> {
        self.walk_body(tree, body)
    }

    fn visit_loop(&mut self, tree: &SyntaxTree, _stmt: StmtId, lp: &LoopStmt) -> Result<()> {
        self.walk_loop(tree, lp)
    }

    fn visit_loop_clause(
        &mut self,
        tree: &SyntaxTree,
        _clause: LoopClause,
        expr: ExprId,
    ) -> Result<()> {
        self.visit_expr(tree, expr)
    }

    fn visit_expr(&mut self, tree: &SyntaxTree, id: ExprId) -> Result<()> {
        self.walk_expr(tree, id)
    }

    // Default walk implementations
    fn walk_tree(&mut self, tree: &SyntaxTree) -> Result<()> {
        for module in &tree.modules {
            self.visit_module(tree, module)?;
        }
        Ok(())
    }

    fn walk_module(&mut self, tree: &SyntaxTree, module: &Module) -> Result<()> {
        for item in &module.items {
            match item {
                Item::Variable(decl) => self.visit_variable(tree, decl)?,
                Item::Procedure(proc) => self.visit_procedure(tree, proc)?,
                Item::Task(task) => self.visit_task(tree, task)?,
            }
        }
        Ok(())
    }

    fn walk_variable(&mut self, tree: &SyntaxTree, decl: &VariableDecl) -> Result<()> {
        for init in &decl.init {
            self.visit_expr(tree, *init)?;
        }
        Ok(())
    }

    fn walk_task(&mut self, tree: &SyntaxTree, task: &TaskDecl) -> Result<()> {
        if let Some(priority) = task.priority {
            self.visit_expr(tree, priority)?;
        }
        self.walk_body(tree, &task.body)
    }

    fn walk_body(&mut self, tree: &SyntaxTree, body: &[StmtId]) -> Result<()> {
        for stmt in body {
            self.visit_stmt(tree, *stmt)?;
        }
        Ok(())
    }

    fn walk_stmt(&mut self, tree: &SyntaxTree, id: StmtId) -> Result<()> {
        match &tree.stmt(id).kind {
            StmtKind::Declare(decl) => self.visit_variable(tree, decl),
            StmtKind::Assign { target, value } => self.visit_assignment(tree, id, target, *value),
            StmtKind::Block(body) => self.visit_block(tree, id, body),
            StmtKind::Loop(lp) => self.visit_loop(tree, id, lp),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(tree, *condition)?;
                self.walk_body(tree, then_branch)?;
                self.walk_body(tree, else_branch)
            }
            StmtKind::Return(value) => match value {
                Some(value) => self.visit_expr(tree, *value),
                None => Ok(()),
            },
            StmtKind::Expr(expr) => self.visit_expr(tree, *expr),
        }
    }

    fn walk_loop(&mut self, tree: &SyntaxTree, lp: &LoopStmt) -> Result<()> {
        for (clause, expr) in lp.clauses() {
            self.visit_loop_clause(tree, clause, expr)?;
        }
        self.walk_body(tree, &lp.body)
    }

    fn walk_expr(&mut self, tree: &SyntaxTree, id: ExprId) -> Result<()> {
        for child in tree.expr(id).kind.children() {
            self.visit_expr(tree, child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TreeBuilder;

    #[derive(Default)]
    struct NameCollector {
        names: Vec<String>,
        clauses: Vec<LoopClause>,
    }

    impl Visitor for NameCollector {
        fn visit_loop_clause(
            &mut self,
            tree: &SyntaxTree,
            clause: LoopClause,
            expr: ExprId,
        ) -> Result<()> {
            self.clauses.push(clause);
            self.visit_expr(tree, expr)
        }

        fn visit_expr(&mut self, tree: &SyntaxTree, id: ExprId) -> Result<()> {
            if let ExprKind::Name(name) = &tree.expr(id).kind {
                self.names.push(name.clone());
            }
            self.walk_expr(tree, id)
        }
    }

    #[test]
    fn test_walk_reaches_nested_statements() {
        let mut b = TreeBuilder::new();
        let x = b.name("x");
        let one = b.fixed("1");
        let sum = b.binary(BinaryOp::Add, x, one);
        let assign = b.assign("y", sum);
        let lo = b.name("lo");
        let hi = b.name("hi");
        let body = b.block(vec![assign]);
        let lp = b.loop_stmt(LoopStmt {
            control: Some("i".to_string()),
            from: Some(lo),
            to: Some(hi),
            body: vec![body],
            ..LoopStmt::default()
        });
        let proc = b.procedure("p", vec![lp]);
        b.module("m", vec![proc]);
        let tree = b.finish();

        let mut collector = NameCollector::default();
        collector.visit_tree(&tree).unwrap();
        assert_eq!(collector.names, vec!["lo", "hi", "x"]);
        assert_eq!(collector.clauses, vec![LoopClause::From, LoopClause::To]);
    }
}
