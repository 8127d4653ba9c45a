//! Semantic analysis passes
//!
//! Two passes run over a unit after symbol collection: the constant pool
//! builder ([`constant_pool`]) and the expression type engine
//! ([`expression_type`]). Both share literal decoding ([`literal`]) and the
//! traversal context ([`context`]); operator typing lives in [`rules`].

pub mod checker;
pub mod constant_pool;
pub mod context;
pub mod expression_type;
pub mod literal;
pub mod rules;

pub use checker::{AnalysisResult, SemanticAnalyzer};
pub use constant_pool::ConstantPoolBuilder;
pub use context::{ScopeOwner, Scoped, TraversalContext};
pub use expression_type::{ExpressionTable, ExpressionTypeEngine};
pub use literal::{minimal_fixed_width, DefaultPrecision};
pub use rules::{RuleParams, RuleViolation};
