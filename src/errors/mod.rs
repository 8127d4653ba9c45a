//! Error taxonomy for semantic analysis
//!
//! Every error carries the source span of the offending node. Errors are not
//! collected: the first one aborts the analysis of the compilation unit.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl SourceLocation {
    pub fn new(line: usize, col: usize, end_line: usize, end_col: usize) -> Self {
        Self { line, col, end_line, end_col }
    }

    /// A location covering a single position.
    pub fn at(line: usize, col: usize) -> Self {
        Self::new(line, col, line, col)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("number out of range")]
    NumberOutOfRange,

    #[error("illegal expression")]
    IllegalExpression,

    #[error("type mismatch")]
    TypeMismatch,

    #[error("unknown identifier")]
    UnknownIdentifier,

    #[error("value out of bounds")]
    ValueOutOfBounds,

    #[error("not yet implemented: {feature}")]
    NotYetImplemented { feature: String },

    #[error("internal compiler error")]
    InternalCompilerError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: ErrorKind,
    pub location: SourceLocation,
    /// Source text of the offending node, if known.
    pub text: String,
}

impl SemanticError {
    pub fn new(kind: ErrorKind, location: SourceLocation, text: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            text: text.into(),
        }
    }

    pub fn number_out_of_range(location: SourceLocation, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::NumberOutOfRange, location, text)
    }

    pub fn illegal_expression(location: SourceLocation, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalExpression, location, text)
    }

    pub fn type_mismatch(location: SourceLocation, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, location, text)
    }

    pub fn unknown_identifier(location: SourceLocation, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownIdentifier, location, name)
    }

    pub fn value_out_of_bounds(location: SourceLocation, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValueOutOfBounds, location, text)
    }

    pub fn not_yet_implemented(feature: impl Into<String>, location: SourceLocation) -> Self {
        let feature = feature.into();
        Self::new(
            ErrorKind::NotYetImplemented { feature: feature.clone() },
            location,
            feature,
        )
    }

    pub fn internal(location: SourceLocation, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalCompilerError, location, text)
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn col(&self) -> usize {
        self.location.col
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)?;
        if !self.text.is_empty() {
            write!(f, " ({})", self.text)?;
        }
        Ok(())
    }
}

impl std::error::Error for SemanticError {}

pub type Result<T, E = SemanticError> = std::result::Result<T, E>;
