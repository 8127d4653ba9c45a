//! Core semantic values
//!
//! Semantic types and expression results ([`types`]) and compile-time
//! constants with the unit's constant pool ([`constant`]).

pub mod constant;
pub mod types;

pub use constant::{BitPattern, ConstantPool, ConstantValue};
pub use types::{ExpressionResult, Precision, SemanticType};
