//! Literal decoding shared by the constant pool builder and the type engine.
//!
//! Decoding validates the literal text and produces the constant it denotes;
//! malformed numbers raise `NumberOutOfRange`, temporal components outside
//! their range raise `ValueOutOfBounds`.

use crate::ast::Literal;
use crate::core::constant::{BitPattern, ConstantValue};
use crate::core::types::{Precision, SemanticType};
use crate::errors::{Result, SemanticError, SourceLocation};

/// Precisions applied to numeric literals without an explicit suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPrecision {
    pub fixed: Precision,
    pub float: Precision,
}

/// Where a literal sits in the source, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct LiteralSite<'t> {
    pub location: SourceLocation,
    pub text: &'t str,
}

impl<'t> LiteralSite<'t> {
    pub fn new(location: SourceLocation, text: &'t str) -> Self {
        Self { location, text }
    }

    fn out_of_range(&self) -> SemanticError {
        SemanticError::number_out_of_range(self.location, self.text)
    }

    fn out_of_bounds(&self) -> SemanticError {
        SemanticError::value_out_of_bounds(self.location, self.text)
    }
}

/// Decode `literal` into the constant it denotes.
pub fn decode(
    literal: &Literal,
    defaults: DefaultPrecision,
    site: LiteralSite<'_>,
) -> Result<ConstantValue> {
    match literal {
        Literal::Duration {
            hours,
            minutes,
            seconds,
        } => {
            let (h, m, s) = decode_duration(
                hours.as_deref(),
                minutes.as_deref(),
                seconds.as_deref(),
                site,
            )?;
            Ok(ConstantValue::duration(h, m, s))
        }
        Literal::Clock {
            hours,
            minutes,
            seconds,
        } => {
            let (h, m, s) = decode_clock(hours, minutes, seconds, site)?;
            Ok(ConstantValue::clock(h, m, s))
        }
        Literal::BitString { digits, base } => {
            Ok(ConstantValue::bits(decode_bit_string(digits, *base, site)?))
        }
        Literal::Float { text, precision } => Ok(ConstantValue::float(
            parse_float(text, site)?,
            precision.unwrap_or(defaults.float),
        )),
        Literal::Str(content) => Ok(ConstantValue::char(content.clone())),
        Literal::Fixed { text, precision } => Ok(ConstantValue::fixed(
            parse_fixed(text, site)?,
            precision.unwrap_or(defaults.fixed),
        )),
    }
}

/// Decode a numeric literal preceded by a unary minus.
///
/// Returns `None` for non-numeric literals, which are not folded.
pub fn decode_negated(
    literal: &Literal,
    defaults: DefaultPrecision,
    site: LiteralSite<'_>,
) -> Result<Option<ConstantValue>> {
    if !literal.is_numeric() {
        return Ok(None);
    }
    match decode(literal, defaults, site)? {
        ConstantValue::Fixed { value, precision } => {
            let value = value.checked_neg().ok_or_else(|| site.out_of_range())?;
            Ok(Some(ConstantValue::fixed(value, precision)))
        }
        ConstantValue::Float { value, precision } => {
            Ok(Some(ConstantValue::float(-value, precision)))
        }
        _ => Ok(None),
    }
}

/// Type of a decoded literal. Fixed and float precisions are taken from the
/// constant; callers adjust them for contextual precision.
pub fn type_of_constant(value: &ConstantValue) -> SemanticType {
    match value {
        ConstantValue::Fixed { precision, .. } => SemanticType::Fixed(*precision),
        ConstantValue::Float { precision, .. } => SemanticType::Float(*precision),
        ConstantValue::Bit { bits, .. } => SemanticType::Bit(bits.len() as Precision),
        ConstantValue::Char { value } => SemanticType::Char(value.chars().count() as Precision),
        ConstantValue::Duration { .. } => SemanticType::Duration,
        ConstantValue::Clock { .. } => SemanticType::Clock,
    }
}

/// Smallest two's-complement width holding `value`: the length of the binary
/// representation of its magnitude, plus a sign bit when negative.
pub fn minimal_fixed_width(value: i64) -> Precision {
    let magnitude = value.unsigned_abs();
    let bits = (u64::BITS - magnitude.leading_zeros()).max(1);
    if value < 0 {
        bits + 1
    } else {
        bits
    }
}

pub fn parse_fixed(text: &str, site: LiteralSite<'_>) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|_| site.out_of_range())
}

pub fn parse_float(text: &str, site: LiteralSite<'_>) -> Result<f64> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(site.out_of_range()),
    }
}

/// Expand `digits` written in base `B1`..`B4` (1 to 4 bits per digit).
pub fn decode_bit_string(digits: &str, base: u8, site: LiteralSite<'_>) -> Result<BitPattern> {
    if !(1..=4).contains(&base) {
        return Err(site.out_of_range());
    }
    let width = usize::from(base);
    let mut bits = BitPattern::with_capacity(digits.len() * width);
    for digit in digits.chars() {
        let value = digit
            .to_digit(16)
            .filter(|v| *v < (1 << base))
            .ok_or_else(|| site.out_of_range())?;
        for shift in (0..width).rev() {
            bits.push((value >> shift) & 1 == 1);
        }
    }
    Ok(bits)
}

fn decode_duration(
    hours: Option<&str>,
    minutes: Option<&str>,
    seconds: Option<&str>,
    site: LiteralSite<'_>,
) -> Result<(u64, u32, f64)> {
    let hours = match hours {
        Some(text) => {
            let h = parse_fixed(text, site)?;
            u64::try_from(h).map_err(|_| site.out_of_bounds())?
        }
        None => 0,
    };
    let minutes = match minutes {
        Some(text) => parse_minutes(text, site)?,
        None => 0,
    };
    let seconds = match seconds {
        Some(text) => parse_seconds(text, site)?,
        None => 0.0,
    };
    Ok((hours, minutes, seconds))
}

fn decode_clock(
    hours: &str,
    minutes: &str,
    seconds: &str,
    site: LiteralSite<'_>,
) -> Result<(u32, u32, f64)> {
    let h = parse_fixed(hours, site)?;
    if h < 0 {
        return Err(site.out_of_bounds());
    }
    let hours = (h % 24) as u32;
    Ok((hours, parse_minutes(minutes, site)?, parse_seconds(seconds, site)?))
}

fn parse_minutes(text: &str, site: LiteralSite<'_>) -> Result<u32> {
    let m = parse_fixed(text, site)?;
    if (0..=59).contains(&m) {
        Ok(m as u32)
    } else {
        Err(site.out_of_bounds())
    }
}

fn parse_seconds(text: &str, site: LiteralSite<'_>) -> Result<f64> {
    let s = parse_float(text, site)?;
    if s < 0.0 {
        Err(site.out_of_bounds())
    } else {
        Ok(s)
    }
}
