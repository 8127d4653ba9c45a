use serde::{Deserialize, Serialize};
use std::fmt;

use crate::symbols::SymbolId;

/// Bit width of a fixed/float value, or the length of a bit/char string.
pub type Precision = u32;

/// Semantic type of an expression.
///
/// Types are immutable values; equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    Fixed(Precision),
    Float(Precision),
    Bit(Precision),
    Char(Precision),
    Duration,
    Clock,
    Array(Box<SemanticType>),
    Task,
    Reference(Box<SemanticType>),
}

impl SemanticType {
    pub fn array_of(base: SemanticType) -> Self {
        SemanticType::Array(Box::new(base))
    }

    pub fn reference_to(target: SemanticType) -> Self {
        SemanticType::Reference(Box::new(target))
    }

    /// Precision of a fixed or float type.
    pub fn numeric_precision(&self) -> Option<Precision> {
        match self {
            SemanticType::Fixed(g) | SemanticType::Float(g) => Some(*g),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Fixed(_) | SemanticType::Float(_))
    }

    /// Element type for arrays, the type itself otherwise.
    pub fn scalar(&self) -> &SemanticType {
        match self {
            SemanticType::Array(base) => base.scalar(),
            other => other,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Fixed(g) => write!(f, "FIXED({})", g),
            SemanticType::Float(g) => write!(f, "FLOAT({})", g),
            SemanticType::Bit(lg) => write!(f, "BIT({})", lg),
            SemanticType::Char(lg) => write!(f, "CHAR({})", lg),
            SemanticType::Duration => write!(f, "DURATION"),
            SemanticType::Clock => write!(f, "CLOCK"),
            SemanticType::Array(base) => write!(f, "ARRAY OF {}", base),
            SemanticType::Task => write!(f, "TASK"),
            SemanticType::Reference(target) => write!(f, "REF {}", target),
        }
    }
}

/// Result computed for one expression node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionResult {
    pub ty: SemanticType,
    /// Whether the value is known at compile time.
    pub constant: bool,
    /// The variable denoted by a simple name reference.
    pub variable: Option<SymbolId>,
}

impl ExpressionResult {
    pub fn new(ty: SemanticType, constant: bool) -> Self {
        Self {
            ty,
            constant,
            variable: None,
        }
    }

    /// A result whose value is only known at run time.
    pub fn runtime(ty: SemanticType) -> Self {
        Self::new(ty, false)
    }

    pub fn constant(ty: SemanticType) -> Self {
        Self::new(ty, true)
    }

    pub fn with_variable(mut self, variable: SymbolId) -> Self {
        self.variable = Some(variable);
        self
    }
}

impl fmt::Display for ExpressionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        if self.constant {
            write!(f, " const")?;
        }
        if let Some(var) = self.variable {
            write!(f, " -> {}", var)?;
        }
        Ok(())
    }
}
