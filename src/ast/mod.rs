//! Syntax tree and traversal utilities
//!
//! The tree is produced by an external parser (or by [`TreeBuilder`] in tests)
//! and consumed read-only by the semantic passes through the [`Visitor`] trait.

pub mod builder;
pub mod nodes;
pub mod visitor;

pub use builder::TreeBuilder;
pub use nodes::{
    BinaryOp, Expr, ExprId, ExprKind, Item, Literal, LoopClause, LoopStmt, Module, ProcedureDecl,
    SliceKind, Stmt, StmtId, StmtKind, SyntaxTree, TaskDecl, UnaryOp, VariableDecl,
};
pub use visitor::Visitor;
