//! Constant values and the per-unit constant pool.

use bitvec::prelude::*;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::trace;

use super::types::Precision;

/// Bit pattern of a bit-string constant, most significant bit first.
pub type BitPattern = BitVec<u8, Msb0>;

/// A typed compile-time value.
///
/// Equality is the pool's deduplication relation and never holds across
/// variants:
/// - fixed: value and precision
/// - float: value, bit for bit (precision is not compared)
/// - bit: bit pattern (the ordinal is not compared)
/// - char: text
/// - duration and clock: total number of seconds
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConstantValue {
    Fixed {
        value: i64,
        precision: Precision,
    },
    Float {
        value: f64,
        precision: Precision,
    },
    Bit {
        #[serde(serialize_with = "serialize_bits")]
        bits: BitPattern,
        /// Assigned by the pool, starting at 1; 0 until pooled.
        ordinal: u32,
    },
    Char {
        value: String,
    },
    Duration {
        hours: u64,
        minutes: u32,
        seconds: f64,
    },
    Clock {
        hours: u32,
        minutes: u32,
        seconds: f64,
    },
}

fn serialize_bits<S: Serializer>(bits: &BitPattern, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&bits_to_string(bits))
}

fn bits_to_string(bits: &BitPattern) -> String {
    bits.iter().map(|b| if *b { '1' } else { '0' }).collect()
}

impl ConstantValue {
    pub fn fixed(value: i64, precision: Precision) -> Self {
        ConstantValue::Fixed { value, precision }
    }

    pub fn float(value: f64, precision: Precision) -> Self {
        ConstantValue::Float { value, precision }
    }

    pub fn bits(bits: BitPattern) -> Self {
        ConstantValue::Bit { bits, ordinal: 0 }
    }

    pub fn char(value: impl Into<String>) -> Self {
        ConstantValue::Char {
            value: value.into(),
        }
    }

    pub fn duration(hours: u64, minutes: u32, seconds: f64) -> Self {
        ConstantValue::Duration {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn clock(hours: u32, minutes: u32, seconds: f64) -> Self {
        ConstantValue::Clock {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            ConstantValue::Fixed { .. } => "fixed",
            ConstantValue::Float { .. } => "float",
            ConstantValue::Bit { .. } => "bit",
            ConstantValue::Char { .. } => "char",
            ConstantValue::Duration { .. } => "duration",
            ConstantValue::Clock { .. } => "clock",
        }
    }

    pub fn same_variant(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Pool ordinal of a bit-string constant.
    pub fn ordinal(&self) -> Option<u32> {
        match self {
            ConstantValue::Bit { ordinal, .. } if *ordinal > 0 => Some(*ordinal),
            _ => None,
        }
    }

    /// Seconds denoted by a duration or clock value.
    pub fn total_seconds(&self) -> Option<f64> {
        match self {
            ConstantValue::Duration {
                hours,
                minutes,
                seconds,
            } => Some(*hours as f64 * 3600.0 + f64::from(*minutes) * 60.0 + seconds),
            ConstantValue::Clock {
                hours,
                minutes,
                seconds,
            } => Some(f64::from(*hours) * 3600.0 + f64::from(*minutes) * 60.0 + seconds),
            _ => None,
        }
    }
}

impl PartialEq for ConstantValue {
    fn eq(&self, other: &Self) -> bool {
        use ConstantValue::*;
        match (self, other) {
            (
                Fixed { value: a, precision: pa },
                Fixed { value: b, precision: pb },
            ) => a == b && pa == pb,
            (Float { value: a, .. }, Float { value: b, .. }) => a.to_bits() == b.to_bits(),
            (Bit { bits: a, .. }, Bit { bits: b, .. }) => a == b,
            (Char { value: a }, Char { value: b }) => a == b,
            (Duration { .. }, Duration { .. }) | (Clock { .. }, Clock { .. }) => {
                self.total_seconds() == other.total_seconds()
            }
            _ => false,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Fixed { value, precision } => write!(f, "{}({})", value, precision),
            ConstantValue::Float { value, precision } => write!(f, "{:?}({})", value, precision),
            ConstantValue::Bit { bits, ordinal } => {
                write!(f, "'{}'B", bits_to_string(bits))?;
                if *ordinal > 0 {
                    write!(f, " #{}", ordinal)?;
                }
                Ok(())
            }
            ConstantValue::Char { value } => write!(f, "'{}'", value),
            ConstantValue::Duration {
                hours,
                minutes,
                seconds,
            } => write!(f, "{} HRS {} MIN {} SEC", hours, minutes, seconds),
            ConstantValue::Clock {
                hours,
                minutes,
                seconds,
            } => write!(f, "{:02}:{:02}:{}", hours, minutes, seconds),
        }
    }
}

/// Insertion-ordered, deduplicated table of the constants of one unit.
///
/// Indices are stable: entries are never removed or reordered.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConstantPool {
    entries: Vec<ConstantValue>,
}

impl ConstantPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool holding 0, 1 and -1 at `fixed_precision`.
    pub fn seeded(fixed_precision: Precision) -> Self {
        let mut pool = Self::new();
        for value in [0, 1, -1] {
            pool.add(ConstantValue::fixed(value, fixed_precision));
        }
        pool
    }

    /// Insert `value` unless an equal constant is already pooled.
    ///
    /// Returns the index of the pooled entry. New bit strings receive the
    /// ordinal `1 + number of bit strings already pooled`.
    pub fn add(&mut self, mut value: ConstantValue) -> usize {
        let mut bit_count = 0;
        for (index, existing) in self.entries.iter().enumerate() {
            if !existing.same_variant(&value) {
                continue;
            }
            if matches!(existing, ConstantValue::Bit { .. }) {
                bit_count += 1;
            }
            if *existing == value {
                trace!(%value, index, "duplicate constant");
                return index;
            }
        }

        if let ConstantValue::Bit { ordinal, .. } = &mut value {
            *ordinal = bit_count + 1;
        }
        trace!(%value, index = self.entries.len(), "pooled constant");
        self.entries.push(value);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&ConstantValue> {
        self.entries.get(index)
    }

    /// Index of the entry equal to `value`.
    pub fn position(&self, value: &ConstantValue) -> Option<usize> {
        self.entries.iter().position(|e| e == value)
    }

    pub fn contains(&self, value: &ConstantValue) -> bool {
        self.position(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstantValue> {
        self.entries.iter()
    }

    pub fn bit_strings(&self) -> impl Iterator<Item = &ConstantValue> {
        self.entries
            .iter()
            .filter(|e| matches!(e, ConstantValue::Bit { .. }))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::ops::Index<usize> for ConstantPool {
    type Output = ConstantValue;

    fn index(&self, index: usize) -> &ConstantValue {
        &self.entries[index]
    }
}
