use super::nodes::*;
use crate::errors::SourceLocation;

/// Incremental constructor for [`SyntaxTree`]s.
///
/// Nodes are stamped with the position last set through [`TreeBuilder::at`].
/// Diagnostic text of composite expressions is assembled from the text of
/// their operands.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: SyntaxTree,
    location: SourceLocation,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position of subsequently created nodes.
    pub fn at(&mut self, line: usize, col: usize) -> &mut Self {
        self.location = SourceLocation::at(line, col);
        self
    }

    pub fn span(&mut self, location: SourceLocation) -> &mut Self {
        self.location = location;
        self
    }

    pub fn expr(&mut self, kind: ExprKind, text: impl Into<String>) -> ExprId {
        let id = ExprId(self.tree.exprs.len() as u32);
        self.tree.exprs.push(Expr {
            kind,
            location: self.location,
            text: text.into(),
        });
        id
    }

    fn text_of(&self, id: ExprId) -> &str {
        self.tree
            .get_expr(id)
            .map(|e| e.text.as_str())
            .unwrap_or("?")
    }

    pub fn literal(&mut self, literal: Literal, text: impl Into<String>) -> ExprId {
        self.expr(ExprKind::Literal(literal), text)
    }

    pub fn fixed(&mut self, text: &str) -> ExprId {
        self.literal(
            Literal::Fixed {
                text: text.to_string(),
                precision: None,
            },
            text,
        )
    }

    pub fn fixed_with_precision(&mut self, text: &str, precision: u32) -> ExprId {
        self.literal(
            Literal::Fixed {
                text: text.to_string(),
                precision: Some(precision),
            },
            format!("{}({})", text, precision),
        )
    }

    pub fn float(&mut self, text: &str) -> ExprId {
        self.literal(
            Literal::Float {
                text: text.to_string(),
                precision: None,
            },
            text,
        )
    }

    pub fn float_with_precision(&mut self, text: &str, precision: u32) -> ExprId {
        self.literal(
            Literal::Float {
                text: text.to_string(),
                precision: Some(precision),
            },
            format!("{}({})", text, precision),
        )
    }

    /// Bit string in base `B1`.
    pub fn bits(&mut self, digits: &str) -> ExprId {
        self.bits_in_base(digits, 1)
    }

    pub fn bits_in_base(&mut self, digits: &str, base: u8) -> ExprId {
        self.literal(
            Literal::BitString {
                digits: digits.to_string(),
                base,
            },
            format!("'{}'B{}", digits, base),
        )
    }

    pub fn string(&mut self, content: &str) -> ExprId {
        self.literal(Literal::Str(content.to_string()), format!("'{}'", content))
    }

    pub fn duration(
        &mut self,
        hours: Option<&str>,
        minutes: Option<&str>,
        seconds: Option<&str>,
    ) -> ExprId {
        let mut text = Vec::new();
        if let Some(h) = hours {
            text.push(format!("{} HRS", h));
        }
        if let Some(m) = minutes {
            text.push(format!("{} MIN", m));
        }
        if let Some(s) = seconds {
            text.push(format!("{} SEC", s));
        }
        self.literal(
            Literal::Duration {
                hours: hours.map(str::to_string),
                minutes: minutes.map(str::to_string),
                seconds: seconds.map(str::to_string),
            },
            text.join(" "),
        )
    }

    pub fn clock(&mut self, hours: &str, minutes: &str, seconds: &str) -> ExprId {
        self.literal(
            Literal::Clock {
                hours: hours.to_string(),
                minutes: minutes.to_string(),
                seconds: seconds.to_string(),
            },
            format!("{}:{}:{}", hours, minutes, seconds),
        )
    }

    pub fn name(&mut self, name: &str) -> ExprId {
        self.expr(ExprKind::Name(name.to_string()), name)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        let text = match op {
            UnaryOp::Plus | UnaryOp::Minus => format!("{}{}", op, self.text_of(operand)),
            _ => format!("{} {}", op, self.text_of(operand)),
        };
        self.expr(ExprKind::Unary { op, operand }, text)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let text = format!("{} {} {}", self.text_of(lhs), op, self.text_of(rhs));
        self.expr(ExprKind::Binary { op, lhs, rhs }, text)
    }

    pub fn paren(&mut self, inner: ExprId) -> ExprId {
        let text = format!("({})", self.text_of(inner));
        self.expr(ExprKind::Paren(inner), text)
    }

    pub fn sema_try(&mut self, semaphores: &[&str]) -> ExprId {
        let text = format!("TRY {}", semaphores.join(","));
        self.expr(
            ExprKind::SemaTry(semaphores.iter().map(|s| s.to_string()).collect()),
            text,
        )
    }

    pub fn now(&mut self) -> ExprId {
        self.expr(ExprKind::Now, "NOW")
    }

    pub fn size_of(&mut self, name: &str) -> ExprId {
        self.expr(ExprKind::SizeOf(name.to_string()), format!("SIZEOF {}", name))
    }

    pub fn task_function(&mut self, task: Option<&str>) -> ExprId {
        let text = match task {
            Some(t) => format!("TASK({})", t),
            None => "TASK".to_string(),
        };
        self.expr(ExprKind::TaskFunction(task.map(str::to_string)), text)
    }

    pub fn cont(&mut self, inner: ExprId) -> ExprId {
        let text = format!("CONT {}", self.text_of(inner));
        self.expr(ExprKind::Cont(inner), text)
    }

    pub fn slice(&mut self, kind: SliceKind, target: ExprId, index: ExprId) -> ExprId {
        let selector = match kind {
            SliceKind::Bit => "BIT",
            SliceKind::Char => "CHAR",
        };
        let text = format!("{}.{}({})", self.text_of(target), selector, self.text_of(index));
        self.expr(ExprKind::Slice { kind, target, index }, text)
    }

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId(self.tree.stmts.len() as u32);
        self.tree.stmts.push(Stmt {
            kind,
            location: self.location,
        });
        id
    }

    pub fn variable(&self, names: &[&str], init: Vec<ExprId>) -> VariableDecl {
        VariableDecl {
            names: names.iter().map(|n| n.to_string()).collect(),
            init,
            location: self.location,
        }
    }

    pub fn declare(&mut self, names: &[&str], init: Vec<ExprId>) -> StmtId {
        let decl = self.variable(names, init);
        self.stmt(StmtKind::Declare(decl))
    }

    pub fn assign(&mut self, target: &str, value: ExprId) -> StmtId {
        self.stmt(StmtKind::Assign {
            target: target.to_string(),
            value,
        })
    }

    pub fn block(&mut self, body: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block(body))
    }

    pub fn loop_stmt(&mut self, lp: LoopStmt) -> StmtId {
        self.stmt(StmtKind::Loop(lp))
    }

    pub fn if_stmt(
        &mut self,
        condition: ExprId,
        then_branch: Vec<StmtId>,
        else_branch: Vec<StmtId>,
    ) -> StmtId {
        self.stmt(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn procedure(&self, name: &str, body: Vec<StmtId>) -> Item {
        Item::Procedure(ProcedureDecl {
            name: name.to_string(),
            body,
            location: self.location,
        })
    }

    pub fn task(&self, name: &str, priority: Option<ExprId>, body: Vec<StmtId>) -> Item {
        Item::Task(TaskDecl {
            name: name.to_string(),
            priority,
            body,
            location: self.location,
        })
    }

    pub fn module(&mut self, name: &str, items: Vec<Item>) -> &mut Self {
        self.tree.modules.push(Module {
            name: name.to_string(),
            items,
            location: self.location,
        });
        self
    }

    pub fn finish(self) -> SyntaxTree {
        self.tree
    }
}
