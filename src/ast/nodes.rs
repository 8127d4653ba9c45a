//! Syntax tree consumed by the semantic passes
//!
//! Expressions and statements live in flat arenas owned by [`SyntaxTree`] and
//! are addressed by stable integer ids assigned at construction time. Side
//! tables produced by the analysis are indexed by the same ids.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(pub u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtId(pub u32);

impl StmtId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Literal forms as they appear in source.
///
/// Numeric parts are kept as source text; decoding (and its range errors)
/// belongs to the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// `2 HRS 30 MIN 1.5 SEC`; absent parts are zero.
    Duration {
        hours: Option<String>,
        minutes: Option<String>,
        seconds: Option<String>,
    },
    /// `12:30:00`
    Clock {
        hours: String,
        minutes: String,
        seconds: String,
    },
    /// `'1011'B1`; `base` is the bits per digit (1..=4).
    BitString { digits: String, base: u8 },
    /// `3.14` or `3.14(53)`
    Float { text: String, precision: Option<u32> },
    Str(String),
    /// `42` or `42(15)`
    Fixed { text: String, precision: Option<u32> },
}

impl Literal {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Literal::Fixed { .. } | Literal::Float { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Abs,
    Sign,
    Not,
    ToFixed,
    ToFloat,
    ToBit,
    ToChar,
    Entier,
    Round,
    Sqrt,
    Sin,
    Cos,
    Exp,
    Ln,
    Tan,
    Atan,
    Tanh,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Abs => "ABS",
            UnaryOp::Sign => "SIGN",
            UnaryOp::Not => "NOT",
            UnaryOp::ToFixed => "TOFIXED",
            UnaryOp::ToFloat => "TOFLOAT",
            UnaryOp::ToBit => "TOBIT",
            UnaryOp::ToChar => "TOCHAR",
            UnaryOp::Entier => "ENTIER",
            UnaryOp::Round => "ROUND",
            UnaryOp::Sqrt => "SQRT",
            UnaryOp::Sin => "SIN",
            UnaryOp::Cos => "COS",
            UnaryOp::Exp => "EXP",
            UnaryOp::Ln => "LN",
            UnaryOp::Tan => "TAN",
            UnaryOp::Atan => "ATAN",
            UnaryOp::Tanh => "TANH",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Rem,
    Pow,
    Fit,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Exor,
    Cat,
    Shift,
    CShift,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::IntDiv => "//",
            BinaryOp::Rem => "REM",
            BinaryOp::Pow => "**",
            BinaryOp::Fit => "FIT",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "/=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Exor => "EXOR",
            BinaryOp::Cat => "CAT",
            BinaryOp::Shift => "SHIFT",
            BinaryOp::CShift => "CSHIFT",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliceKind {
    Bit,
    Char,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Name(String),
    Unary { op: UnaryOp, operand: ExprId },
    Binary { op: BinaryOp, lhs: ExprId, rhs: ExprId },
    Paren(ExprId),
    /// `TRY sema, ...`
    SemaTry(Vec<String>),
    Now,
    SizeOf(String),
    /// `TASK` or `TASK(name)`
    TaskFunction(Option<String>),
    Cont(ExprId),
    /// `x.BIT(i)` / `x.CHAR(i)`
    Slice { kind: SliceKind, target: ExprId, index: ExprId },
}

impl ExprKind {
    /// Direct sub-expressions in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Unary { operand, .. } => vec![*operand],
            ExprKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            ExprKind::Paren(inner) | ExprKind::Cont(inner) => vec![*inner],
            ExprKind::Slice { target, index, .. } => vec![*target, *index],
            ExprKind::Literal(_)
            | ExprKind::Name(_)
            | ExprKind::SemaTry(_)
            | ExprKind::Now
            | ExprKind::SizeOf(_)
            | ExprKind::TaskFunction(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: SourceLocation,
    /// Source text, used in diagnostics.
    pub text: String,
}

/// `DCL (a, b) FIXED(15) INIT(1, 2);`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub names: Vec<String>,
    pub init: Vec<ExprId>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDecl {
    pub name: String,
    pub body: Vec<StmtId>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDecl {
    pub name: String,
    pub priority: Option<ExprId>,
    pub body: Vec<StmtId>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Variable(VariableDecl),
    Procedure(ProcedureDecl),
    Task(TaskDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub items: Vec<Item>,
    pub location: SourceLocation,
}

/// Which clause of a counting loop an expression bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopClause {
    From,
    By,
    To,
    While,
}

/// `FOR i FROM a BY b TO c WHILE d REPEAT ... END;`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopStmt {
    pub control: Option<String>,
    pub from: Option<ExprId>,
    pub by: Option<ExprId>,
    pub to: Option<ExprId>,
    pub while_cond: Option<ExprId>,
    pub body: Vec<StmtId>,
}

impl LoopStmt {
    /// Bound clauses in source order.
    pub fn clauses(&self) -> Vec<(LoopClause, ExprId)> {
        [
            (LoopClause::From, self.from),
            (LoopClause::By, self.by),
            (LoopClause::To, self.to),
            (LoopClause::While, self.while_cond),
        ]
        .into_iter()
        .filter_map(|(clause, expr)| expr.map(|e| (clause, e)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Declare(VariableDecl),
    Assign { target: String, value: ExprId },
    Block(Vec<StmtId>),
    Loop(LoopStmt),
    If {
        condition: ExprId,
        then_branch: Vec<StmtId>,
        else_branch: Vec<StmtId>,
    },
    Return(Option<ExprId>),
    Expr(ExprId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

/// A parsed compilation unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntaxTree {
    pub modules: Vec<Module>,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) stmts: Vec<Stmt>,
}

impl SyntaxTree {
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn get_expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn expr_ids(&self) -> impl Iterator<Item = ExprId> + '_ {
        (0..self.exprs.len()).map(|i| ExprId(i as u32))
    }
}
