//! Operator typing rules
//!
//! Each operator is an exhaustive match over the pair (or single) of operand
//! types; the first matching arm wins and every unlisted combination is a
//! [`RuleViolation`]. Precision arithmetic follows the language report:
//! dyadic numeric operators take the larger precision, except `REM`, `**` and
//! `FIT`, which take the precision of the second operand.

use std::cmp::max;

use crate::ast::{BinaryOp, UnaryOp};
use crate::core::types::{Precision, SemanticType};
use crate::errors::{SemanticError, SourceLocation};

/// Why an operand combination was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    IllegalExpression,
    TypeMismatch,
    NotYetImplemented(&'static str),
}

impl RuleViolation {
    pub fn at(self, location: SourceLocation, text: &str) -> SemanticError {
        match self {
            RuleViolation::IllegalExpression => SemanticError::illegal_expression(location, text),
            RuleViolation::TypeMismatch => SemanticError::type_mismatch(location, text),
            RuleViolation::NotYetImplemented(feature) => {
                SemanticError::not_yet_implemented(feature, location)
            }
        }
    }
}

pub type RuleResult = std::result::Result<SemanticType, RuleViolation>;

/// Parameters of the table that are configurable per compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleParams {
    /// Float precision of `duration / duration`.
    pub duration_ratio_precision: Precision,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            duration_ratio_precision: 24,
        }
    }
}

use SemanticType::{Bit, Char, Clock, Duration, Fixed, Float};

pub fn binary(op: BinaryOp, lhs: &SemanticType, rhs: &SemanticType, params: RuleParams) -> RuleResult {
    match op {
        BinaryOp::Add => add(lhs, rhs),
        BinaryOp::Sub => subtract(lhs, rhs),
        BinaryOp::Mul => multiply(lhs, rhs),
        BinaryOp::Div => divide(lhs, rhs, params),
        BinaryOp::IntDiv => integer_divide(lhs, rhs),
        BinaryOp::Rem => remainder(lhs, rhs),
        BinaryOp::Pow => power(lhs, rhs),
        BinaryOp::Fit => fit(lhs, rhs),
        BinaryOp::Eq | BinaryOp::Ne => equality(lhs, rhs),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => ordering(lhs, rhs),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Exor => bitwise(lhs, rhs),
        BinaryOp::Cat => concatenate(lhs, rhs),
        BinaryOp::Shift | BinaryOp::CShift => shift(lhs, rhs),
    }
}

pub fn unary(op: UnaryOp, operand: &SemanticType) -> RuleResult {
    match op {
        UnaryOp::Plus | UnaryOp::Minus | UnaryOp::Abs => match operand {
            Fixed(g) => Ok(Fixed(*g)),
            Float(g) => Ok(Float(*g)),
            Duration => Ok(Duration),
            _ => Err(RuleViolation::IllegalExpression),
        },
        UnaryOp::Sign => match operand {
            Fixed(_) | Float(_) | Duration => Ok(Fixed(1)),
            _ => Err(RuleViolation::IllegalExpression),
        },
        UnaryOp::Not => match operand {
            Bit(lg) => Ok(Bit(*lg)),
            _ => Err(RuleViolation::IllegalExpression),
        },
        UnaryOp::ToFixed => match operand {
            Bit(lg) => Ok(Fixed(lg.saturating_sub(1))),
            Char(_) => Err(RuleViolation::NotYetImplemented("CHARACTER")),
            _ => Err(RuleViolation::IllegalExpression),
        },
        UnaryOp::ToFloat => match operand {
            Fixed(g) => Ok(Float(*g)),
            _ => Err(RuleViolation::IllegalExpression),
        },
        UnaryOp::ToBit => match operand {
            Fixed(g) => Ok(Bit(*g)),
            _ => Err(RuleViolation::IllegalExpression),
        },
        UnaryOp::ToChar => Err(RuleViolation::NotYetImplemented("TOCHAR")),
        UnaryOp::Entier | UnaryOp::Round => match operand {
            Float(g) => Ok(Fixed(*g)),
            _ => Err(RuleViolation::IllegalExpression),
        },
        UnaryOp::Sqrt
        | UnaryOp::Sin
        | UnaryOp::Cos
        | UnaryOp::Exp
        | UnaryOp::Ln
        | UnaryOp::Tan
        | UnaryOp::Atan
        | UnaryOp::Tanh => match operand {
            Float(g) => Ok(Float(*g)),
            _ => Err(RuleViolation::IllegalExpression),
        },
    }
}

/// fixed/float mix: fixed only when both are fixed, precision is the max.
fn dyadic_numeric(lhs: &SemanticType, rhs: &SemanticType) -> Option<SemanticType> {
    match (lhs, rhs) {
        (Fixed(g1), Fixed(g2)) => Some(Fixed(max(*g1, *g2))),
        (Fixed(g1), Float(g2)) | (Float(g1), Fixed(g2)) | (Float(g1), Float(g2)) => {
            Some(Float(max(*g1, *g2)))
        }
        _ => None,
    }
}

fn add(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    if let Some(ty) = dyadic_numeric(lhs, rhs) {
        return Ok(ty);
    }
    match (lhs, rhs) {
        (Duration, Duration) => Ok(Duration),
        (Duration, Clock) | (Clock, Duration) => Ok(Clock),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn subtract(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    if let Some(ty) = dyadic_numeric(lhs, rhs) {
        return Ok(ty);
    }
    match (lhs, rhs) {
        (Duration, Duration) => Ok(Duration),
        (Clock, Duration) => Ok(Clock),
        (Clock, Clock) => Ok(Duration),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn multiply(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    if let Some(ty) = dyadic_numeric(lhs, rhs) {
        return Ok(ty);
    }
    match (lhs, rhs) {
        (Duration, Fixed(_) | Float(_)) | (Fixed(_) | Float(_), Duration) => Ok(Duration),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn divide(lhs: &SemanticType, rhs: &SemanticType, params: RuleParams) -> RuleResult {
    match (lhs, rhs) {
        (Fixed(g1) | Float(g1), Fixed(g2) | Float(g2)) => Ok(Float(max(*g1, *g2))),
        (Duration, Duration) => Ok(Float(params.duration_ratio_precision)),
        (Duration, Fixed(_) | Float(_)) => Ok(Duration),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn integer_divide(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Fixed(g1), Fixed(g2)) => Ok(Fixed(max(*g1, *g2))),
        (Float(g1), Float(g2)) => Ok(Float(max(*g1, *g2))),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn remainder(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Fixed(_), Fixed(g2)) => Ok(Fixed(*g2)),
        (Float(_), Float(g2)) => Ok(Float(*g2)),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn power(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Fixed(_), Fixed(g2)) => Ok(Fixed(*g2)),
        (Float(_), Float(g2)) => Ok(Float(*g2)),
        (Float(g1), Fixed(_)) => Ok(Float(*g1)),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn fit(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Fixed(_), Fixed(g2)) => Ok(Fixed(*g2)),
        (Float(_), Float(g2)) => Ok(Float(*g2)),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn ordering(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Fixed(_) | Float(_), Fixed(_) | Float(_))
        | (Clock, Clock)
        | (Duration, Duration)
        | (Char(_), Char(_)) => Ok(Bit(1)),
        _ => Err(RuleViolation::IllegalExpression),
    }
}

fn equality(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Bit(_), Bit(_)) => Ok(Bit(1)),
        _ => ordering(lhs, rhs),
    }
}

fn bitwise(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Bit(l1), Bit(l2)) => Ok(Bit(max(*l1, *l2))),
        _ => Err(RuleViolation::TypeMismatch),
    }
}

fn concatenate(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Bit(l1), Bit(l2)) => Ok(Bit(l1 + l2)),
        (Char(l1), Char(l2)) => Ok(Char(l1 + l2)),
        _ => Err(RuleViolation::TypeMismatch),
    }
}

fn shift(lhs: &SemanticType, rhs: &SemanticType) -> RuleResult {
    match (lhs, rhs) {
        (Bit(lg), Fixed(_)) => Ok(Bit(*lg)),
        _ => Err(RuleViolation::TypeMismatch),
    }
}
