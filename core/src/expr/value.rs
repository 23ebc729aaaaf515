//! file: core/src/expr/value.rs
//! description: literal values carried by constant nodes.
//!
//! `Value` is shared by both trees: source `Constant` nodes hold one and the
//! target `CriteriaOperator::Value` wraps one. `TimeSpan` keeps the host
//! runtime's 100ns tick resolution so extreme spans render exactly.
//!
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Fixed-point decimal, carried as f64 and rendered with the `m` suffix.
    Decimal(f64),
    Str(String),
    DateTime(NaiveDateTime),
    TimeSpan(TimeSpan),
    Array(Vec<Value>),
    /// Field map of a captured holder (closure display class).
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used by the host evaluator for math folding.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Long(l) => Some(*l as f64),
            Value::Float(f) => Some(*f as f64),
            Value::Double(d) | Value::Decimal(d) => Some(*d),
            Value::Char(c) => Some(*c as u32 as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i as i64),
            Value::Long(l) => Some(*l),
            Value::Char(c) => Some(*c as u32 as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Elements of an enumerable value. Strings are not treated as sequences.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Char(_) => "Char",
            Value::Int(_) => "Int32",
            Value::Long(_) => "Int64",
            Value::Float(_) => "Single",
            Value::Double(_) => "Double",
            Value::Decimal(_) => "Decimal",
            Value::Str(_) => "String",
            Value::DateTime(_) => "DateTime",
            Value::TimeSpan(_) => "TimeSpan",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
        }
    }
}

/// Host-language flavoured rendering, used when an expression tree is shown
/// in an error message.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}", l),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%m/%d/%Y %H:%M:%S")),
            Value::TimeSpan(ts) => write!(f, "{}", ts),
            Value::Array(items) => {
                write!(f, "new [] {{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}", item)?;
                }
                write!(f, " }}")
            }
            Value::Object(_) => write!(f, "value(<closure>)"),
        }
    }
}

/// Signed time interval in 100-nanosecond ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    pub ticks: i64,
}

impl TimeSpan {
    pub const TICKS_PER_MILLISECOND: i64 = 10_000;
    pub const TICKS_PER_SECOND: i64 = 10_000_000;
    pub const TICKS_PER_MINUTE: i64 = 600_000_000;
    pub const TICKS_PER_HOUR: i64 = 36_000_000_000;
    pub const TICKS_PER_DAY: i64 = 864_000_000_000;

    pub const ZERO: TimeSpan = TimeSpan { ticks: 0 };
    pub const MAX: TimeSpan = TimeSpan { ticks: i64::MAX };
    pub const MIN: TimeSpan = TimeSpan { ticks: i64::MIN };

    pub fn from_ticks(ticks: i64) -> Self {
        TimeSpan { ticks }
    }

    /// Scale a fractional unit count to ticks; `None` when out of range.
    pub fn from_units(value: f64, ticks_per_unit: i64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }
        let ticks = (value * ticks_per_unit as f64).round();
        if ticks >= i64::MAX as f64 || ticks < i64::MIN as f64 {
            return None;
        }
        Some(TimeSpan { ticks: ticks as i64 })
    }

    pub fn from_hms(days: i64, hours: i64, minutes: i64, seconds: i64, millis: i64) -> Option<Self> {
        let ticks = days
            .checked_mul(Self::TICKS_PER_DAY)?
            .checked_add(hours.checked_mul(Self::TICKS_PER_HOUR)?)?
            .checked_add(minutes.checked_mul(Self::TICKS_PER_MINUTE)?)?
            .checked_add(seconds.checked_mul(Self::TICKS_PER_SECOND)?)?
            .checked_add(millis.checked_mul(Self::TICKS_PER_MILLISECOND)?)?;
        Some(TimeSpan { ticks })
    }

    /// Converts to a chrono duration; spans beyond chrono's range yield `None`.
    pub fn to_duration(self) -> Option<Duration> {
        let micros = self.ticks / 10;
        let nanos = (self.ticks % 10) * 100;
        Duration::microseconds(micros).checked_add(&Duration::nanoseconds(nanos))
    }
}

/// Constant ("c") format: `[-][d.]hh:mm:ss[.fffffff]`.
impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.ticks.unsigned_abs();
        let per_day = TimeSpan::TICKS_PER_DAY as u64;
        let days = magnitude / per_day;
        let rest = magnitude % per_day;
        let hours = rest / TimeSpan::TICKS_PER_HOUR as u64;
        let minutes = (rest / TimeSpan::TICKS_PER_MINUTE as u64) % 60;
        let seconds = (rest / TimeSpan::TICKS_PER_SECOND as u64) % 60;
        let fraction = rest % TimeSpan::TICKS_PER_SECOND as u64;

        if self.ticks < 0 {
            write!(f, "-")?;
        }
        if days > 0 {
            write!(f, "{}.", days)?;
        }
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
        if fraction > 0 {
            write!(f, ".{:07}", fraction)?;
        }
        Ok(())
    }
}
