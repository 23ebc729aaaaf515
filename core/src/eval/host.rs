//! file: core/src/eval/host.rs
//! description: built-in evaluator for host library members.
//!
//! Covers the members a predicate typically folds: `Math`, `TimeSpan` and
//! `DateTime` statics and constructors, date arithmetic on literal dates,
//! a handful of string helpers and the `Convert` class. Callers can bind
//! their own static functions and values with `with_function` and
//! `with_static`.
//!
use std::collections::HashMap;

use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, Timelike, Utc};
use lazy_static::lazy_static;

use super::{Evaluator, EvalError, convert_value, read_field};
use crate::expr::{ExprType, MethodRef, TimeSpan, Value, type_of_value};

lazy_static! {
    static ref DATE_MIN: NaiveDateTime = date(1, 1, 1);
    static ref DATE_MAX: NaiveDateTime = NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_900))
        .unwrap_or_default();
    static ref OA_EPOCH: NaiveDateTime = date(1899, 12, 30);
    static ref FILE_TIME_EPOCH: NaiveDateTime = date(1601, 1, 1);
}

const UNREPRESENTABLE: &str = "The added or subtracted value results in an un-representable DateTime.";

fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub type HostFunction = Box<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

pub struct HostEvaluator {
    functions: HashMap<(String, String), HostFunction>,
    statics: HashMap<(String, String), Value>,
}

impl Default for HostEvaluator {
    fn default() -> Self {
        HostEvaluator::new()
    }
}

impl HostEvaluator {
    pub fn new() -> Self {
        HostEvaluator { functions: HashMap::new(), statics: HashMap::new() }
    }

    /// Bind a static method `owner.name`. Bindings win over the built-ins.
    pub fn with_function<F>(mut self, owner: impl Into<String>, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.insert((owner.into(), name.into()), Box::new(function));
        self
    }

    /// Bind a static field or property `owner.name`.
    pub fn with_static(mut self, owner: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        self.statics.insert((owner.into(), name.into()), value);
        self
    }
}

impl Evaluator for HostEvaluator {
    fn call(&self, method: &MethodRef, receiver: Option<&Value>, args: &[Value]) -> Result<Value, EvalError> {
        let key = (method.declaring_type.clone(), method.name.clone());
        if receiver.is_none() {
            if let Some(function) = self.functions.get(&key) {
                return function(args);
            }
        }
        let name = method.name.as_str();
        match receiver {
            Some(Value::DateTime(dt)) => call_date_time(*dt, name, args),
            Some(Value::TimeSpan(ts)) => call_time_span(*ts, name, args),
            Some(Value::Str(s)) => call_string(s, name, args),
            Some(other) if name == "ToString" && args.is_empty() => to_text(other).map(Value::Str),
            Some(other) => Err(EvalError::unsupported(format!("{}.{}", other.type_name(), name))),
            None => match method.declaring_type.as_str() {
                "Math" => call_math(name, args),
                "TimeSpan" => call_time_span_static(name, args),
                "DateTime" => call_date_time_static(name, args),
                "String" => call_string_static(name, args),
                "Convert" => call_convert(name, args),
                owner => Err(EvalError::unsupported(format!("{}.{}", owner, name))),
            },
        }
    }

    fn read_static(&self, declaring_type: &str, member: &str) -> Result<Value, EvalError> {
        if let Some(value) = self.statics.get(&(declaring_type.to_string(), member.to_string())) {
            return Ok(value.clone());
        }
        let value = match (declaring_type, member) {
            ("DateTime", "Now") => Value::DateTime(Local::now().naive_local()),
            ("DateTime", "UtcNow") => Value::DateTime(Utc::now().naive_utc()),
            ("DateTime", "Today") => Value::DateTime(midnight(Local::now().naive_local())),
            ("DateTime", "MinValue") => Value::DateTime(*DATE_MIN),
            ("DateTime", "MaxValue") => Value::DateTime(*DATE_MAX),
            ("TimeSpan", "Zero") => Value::TimeSpan(TimeSpan::ZERO),
            ("TimeSpan", "MaxValue") => Value::TimeSpan(TimeSpan::MAX),
            ("TimeSpan", "MinValue") => Value::TimeSpan(TimeSpan::MIN),
            ("Math", "PI") => Value::Double(std::f64::consts::PI),
            ("Math", "E") => Value::Double(std::f64::consts::E),
            ("String", "Empty") => Value::str(""),
            ("Int32", "MaxValue") => Value::Int(i32::MAX),
            ("Int32", "MinValue") => Value::Int(i32::MIN),
            ("Int64", "MaxValue") => Value::Long(i64::MAX),
            ("Int64", "MinValue") => Value::Long(i64::MIN),
            _ => return Err(EvalError::unsupported(format!("{}.{}", declaring_type, member))),
        };
        Ok(value)
    }

    fn read_member(&self, target: &Value, member: &str) -> Result<Value, EvalError> {
        match target {
            Value::DateTime(dt) => date_time_part(*dt, member),
            Value::TimeSpan(ts) => time_span_part(*ts, member),
            Value::Str(s) if member == "Length" => length(s.chars().count()),
            Value::Array(items) if member == "Length" || member == "Count" => length(items.len()),
            _ => read_field(target, member),
        }
    }

    fn construct(&self, ty: &ExprType, args: &[Value]) -> Result<Value, EvalError> {
        match ty.underlying() {
            ExprType::DateTime => construct_date_time(args),
            ExprType::TimeSpan => construct_time_span(args),
            other => Err(EvalError::unsupported(format!("new {}", other))),
        }
    }

    fn convert(&self, value: &Value, ty: &ExprType) -> Result<Value, EvalError> {
        convert_value(value, ty)
    }
}

// ------- argument helpers -------

fn length(len: usize) -> Result<Value, EvalError> {
    i32::try_from(len)
        .map(Value::Int)
        .map_err(|_| EvalError::failed(format!("Length {} overflows Int32.", len)))
}

fn arity(name: &str, args: &[Value], expected: &[usize]) -> Result<(), EvalError> {
    if expected.contains(&args.len()) {
        Ok(())
    } else {
        Err(EvalError::unsupported(format!("{} with {} argument(s)", name, args.len())))
    }
}

fn num(args: &[Value], index: usize) -> Result<f64, EvalError> {
    args.get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| EvalError::failed(format!("Argument {} is not a number.", index)))
}

fn int(args: &[Value], index: usize) -> Result<i64, EvalError> {
    args.get(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| EvalError::failed(format!("Argument {} is not an integer.", index)))
}

fn text(args: &[Value], index: usize) -> Result<&str, EvalError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| EvalError::failed(format!("Argument {} is not a string.", index)))
}

fn span(args: &[Value], index: usize) -> Result<TimeSpan, EvalError> {
    match args.get(index) {
        Some(Value::TimeSpan(ts)) => Ok(*ts),
        _ => Err(EvalError::failed(format!("Argument {} is not a TimeSpan.", index))),
    }
}

fn to_text(value: &Value) -> Result<String, EvalError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Str(s) => Ok(s.clone()),
        Value::Char(c) => Ok(c.to_string()),
        Value::Bool(_) | Value::Int(_) | Value::Long(_) => Ok(value.to_string()),
        Value::Double(v) | Value::Decimal(v) => Ok(v.to_string()),
        Value::Float(v) => Ok(v.to_string()),
        other => Err(EvalError::unsupported(format!("{}.ToString", other.type_name()))),
    }
}

/// Keeps the numeric variant of `template`, as overloads like `Math.Max(int, int)` do.
fn numeric_like(template: &Value, v: f64) -> Result<Value, EvalError> {
    let value = match template {
        Value::Int(_) | Value::Long(_) => return convert_value(&Value::Double(v), &type_of_value(template)),
        Value::Float(_) => Value::Float(v as f32),
        Value::Decimal(_) => Value::Decimal(v),
        _ => Value::Double(v),
    };
    Ok(value)
}

fn abs(value: &Value) -> Result<Value, EvalError> {
    let overflow = || EvalError::failed("Negating the minimum value of a twos complement number is invalid.");
    match value {
        Value::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(overflow),
        Value::Long(l) => l.checked_abs().map(Value::Long).ok_or_else(overflow),
        other => {
            let v = other.as_f64().ok_or_else(|| EvalError::failed("Argument 0 is not a number."))?;
            numeric_like(other, v.abs())
        }
    }
}

fn decimal_or_double(template: &Value, v: f64) -> Value {
    match template {
        Value::Decimal(_) => Value::Decimal(v),
        _ => Value::Double(v),
    }
}

// ------- Math -------

fn call_math(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let unary: Option<fn(f64) -> f64> = match name {
        "Sqrt" => Some(f64::sqrt),
        "Sin" => Some(f64::sin),
        "Cos" => Some(f64::cos),
        "Tan" => Some(f64::tan),
        "Asin" => Some(f64::asin),
        "Acos" => Some(f64::acos),
        "Atan" => Some(f64::atan),
        "Sinh" => Some(f64::sinh),
        "Cosh" => Some(f64::cosh),
        "Tanh" => Some(f64::tanh),
        "Exp" => Some(f64::exp),
        "Log10" => Some(f64::log10),
        _ => None,
    };
    if let Some(f) = unary {
        arity(name, args, &[1])?;
        return Ok(Value::Double(f(num(args, 0)?)));
    }

    match name {
        "Abs" => {
            arity(name, args, &[1])?;
            abs(&args[0])
        }
        "Max" | "Min" => {
            arity(name, args, &[2])?;
            let (a, b) = (num(args, 0)?, num(args, 1)?);
            let v = if name == "Max" { a.max(b) } else { a.min(b) };
            numeric_like(&args[0], v)
        }
        "Pow" => {
            arity(name, args, &[2])?;
            Ok(Value::Double(num(args, 0)?.powf(num(args, 1)?)))
        }
        "Atan2" => {
            arity(name, args, &[2])?;
            Ok(Value::Double(num(args, 0)?.atan2(num(args, 1)?)))
        }
        "Log" => {
            arity(name, args, &[1, 2])?;
            let x = num(args, 0)?;
            match args.len() {
                1 => Ok(Value::Double(x.ln())),
                _ => Ok(Value::Double(x.log(num(args, 1)?))),
            }
        }
        "Floor" => {
            arity(name, args, &[1])?;
            Ok(decimal_or_double(&args[0], num(args, 0)?.floor()))
        }
        "Ceiling" => {
            arity(name, args, &[1])?;
            Ok(decimal_or_double(&args[0], num(args, 0)?.ceil()))
        }
        "Truncate" => {
            arity(name, args, &[1])?;
            Ok(decimal_or_double(&args[0], num(args, 0)?.trunc()))
        }
        "Round" => {
            arity(name, args, &[1, 2])?;
            let x = num(args, 0)?;
            let v = if args.len() == 2 {
                let digits = int(args, 1)?;
                if !(0..=15).contains(&digits) {
                    return Err(EvalError::failed("Rounding digits must be between 0 and 15, inclusive."));
                }
                let scale = 10f64.powi(digits as i32);
                (x * scale).round_ties_even() / scale
            } else {
                x.round_ties_even()
            };
            Ok(decimal_or_double(&args[0], v))
        }
        "Sign" => {
            arity(name, args, &[1])?;
            let x = num(args, 0)?;
            if x.is_nan() {
                return Err(EvalError::failed("Function does not accept floating point Not-a-Number values."));
            }
            Ok(Value::Int(if x > 0.0 {
                1
            } else if x < 0.0 {
                -1
            } else {
                0
            }))
        }
        "BigMul" => {
            arity(name, args, &[2])?;
            int(args, 0)?
                .checked_mul(int(args, 1)?)
                .map(Value::Long)
                .ok_or_else(|| EvalError::failed("Arithmetic operation resulted in an overflow."))
        }
        _ => Err(EvalError::unsupported(format!("Math.{}", name))),
    }
}

// ------- TimeSpan -------

fn call_time_span_static(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let per_unit = match name {
        "FromDays" => TimeSpan::TICKS_PER_DAY,
        "FromHours" => TimeSpan::TICKS_PER_HOUR,
        "FromMinutes" => TimeSpan::TICKS_PER_MINUTE,
        "FromSeconds" => TimeSpan::TICKS_PER_SECOND,
        "FromMilliseconds" => TimeSpan::TICKS_PER_MILLISECOND,
        "FromTicks" => {
            arity(name, args, &[1])?;
            return Ok(Value::TimeSpan(TimeSpan::from_ticks(int(args, 0)?)));
        }
        _ => return Err(EvalError::unsupported(format!("TimeSpan.{}", name))),
    };
    arity(name, args, &[1])?;
    TimeSpan::from_units(num(args, 0)?, per_unit)
        .map(Value::TimeSpan)
        .ok_or_else(|| EvalError::failed("TimeSpan overflowed because the duration is too long."))
}

fn call_time_span(ts: TimeSpan, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let overflow = || EvalError::failed("TimeSpan overflowed because the duration is too long.");
    match name {
        "Add" | "Subtract" => {
            arity(name, args, &[1])?;
            let other = span(args, 0)?.ticks;
            let ticks = if name == "Add" { ts.ticks.checked_add(other) } else { ts.ticks.checked_sub(other) };
            ticks.map(|t| Value::TimeSpan(TimeSpan::from_ticks(t))).ok_or_else(overflow)
        }
        "Negate" => {
            arity(name, args, &[0])?;
            ts.ticks.checked_neg().map(|t| Value::TimeSpan(TimeSpan::from_ticks(t))).ok_or_else(overflow)
        }
        "Duration" => {
            arity(name, args, &[0])?;
            ts.ticks.checked_abs().map(|t| Value::TimeSpan(TimeSpan::from_ticks(t))).ok_or_else(overflow)
        }
        "ToString" if args.is_empty() => Ok(Value::Str(ts.to_string())),
        _ => Err(EvalError::unsupported(format!("TimeSpan.{}", name))),
    }
}

fn time_span_part(ts: TimeSpan, member: &str) -> Result<Value, EvalError> {
    let t = ts.ticks;
    let value = match member {
        "Ticks" => Value::Long(t),
        "Days" => Value::Int((t / TimeSpan::TICKS_PER_DAY) as i32),
        "Hours" => Value::Int(((t / TimeSpan::TICKS_PER_HOUR) % 24) as i32),
        "Minutes" => Value::Int(((t / TimeSpan::TICKS_PER_MINUTE) % 60) as i32),
        "Seconds" => Value::Int(((t / TimeSpan::TICKS_PER_SECOND) % 60) as i32),
        "Milliseconds" => Value::Int(((t / TimeSpan::TICKS_PER_MILLISECOND) % 1000) as i32),
        "TotalDays" => Value::Double(t as f64 / TimeSpan::TICKS_PER_DAY as f64),
        "TotalHours" => Value::Double(t as f64 / TimeSpan::TICKS_PER_HOUR as f64),
        "TotalMinutes" => Value::Double(t as f64 / TimeSpan::TICKS_PER_MINUTE as f64),
        "TotalSeconds" => Value::Double(t as f64 / TimeSpan::TICKS_PER_SECOND as f64),
        "TotalMilliseconds" => Value::Double(t as f64 / TimeSpan::TICKS_PER_MILLISECOND as f64),
        _ => return Err(EvalError::unsupported(format!("TimeSpan.{}", member))),
    };
    Ok(value)
}

fn construct_time_span(args: &[Value]) -> Result<Value, EvalError> {
    let too_long = || EvalError::failed("TimeSpan overflowed because the duration is too long.");
    let ts = match args.len() {
        1 => TimeSpan::from_ticks(int(args, 0)?),
        3 => TimeSpan::from_hms(0, int(args, 0)?, int(args, 1)?, int(args, 2)?, 0).ok_or_else(too_long)?,
        4 => TimeSpan::from_hms(int(args, 0)?, int(args, 1)?, int(args, 2)?, int(args, 3)?, 0).ok_or_else(too_long)?,
        5 => TimeSpan::from_hms(int(args, 0)?, int(args, 1)?, int(args, 2)?, int(args, 3)?, int(args, 4)?)
            .ok_or_else(too_long)?,
        n => return Err(EvalError::unsupported(format!("new TimeSpan with {} argument(s)", n))),
    };
    Ok(Value::TimeSpan(ts))
}

// ------- DateTime -------

fn midnight(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_hms_opt(0, 0, 0).unwrap_or(dt)
}

fn ticks_between(from: NaiveDateTime, to: NaiveDateTime) -> Option<i64> {
    let elapsed = to.signed_duration_since(from);
    let micros = elapsed.num_microseconds()?;
    let rest = (elapsed - Duration::microseconds(micros)).num_nanoseconds()?;
    micros.checked_mul(10)?.checked_add(rest / 100)
}

fn shift(dt: NaiveDateTime, delta: TimeSpan) -> Result<Value, EvalError> {
    delta
        .to_duration()
        .and_then(|d| dt.checked_add_signed(d))
        .filter(|r| *r >= *DATE_MIN && *r <= *DATE_MAX)
        .map(Value::DateTime)
        .ok_or_else(|| EvalError::failed(UNREPRESENTABLE))
}

fn shift_months(dt: NaiveDateTime, months: i64) -> Result<Value, EvalError> {
    let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| EvalError::failed(UNREPRESENTABLE))?;
    let shifted = if months >= 0 {
        dt.checked_add_months(Months::new(magnitude))
    } else {
        dt.checked_sub_months(Months::new(magnitude))
    };
    shifted
        .filter(|r| *r >= *DATE_MIN && *r <= *DATE_MAX)
        .map(Value::DateTime)
        .ok_or_else(|| EvalError::failed(UNREPRESENTABLE))
}

fn units(value: f64, per_unit: i64) -> Result<TimeSpan, EvalError> {
    TimeSpan::from_units(value, per_unit).ok_or_else(|| EvalError::failed(UNREPRESENTABLE))
}

fn call_date_time(dt: NaiveDateTime, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "AddDays" | "AddHours" | "AddMinutes" | "AddSeconds" | "AddMilliseconds" => {
            arity(name, args, &[1])?;
            let per_unit = match name {
                "AddDays" => TimeSpan::TICKS_PER_DAY,
                "AddHours" => TimeSpan::TICKS_PER_HOUR,
                "AddMinutes" => TimeSpan::TICKS_PER_MINUTE,
                "AddSeconds" => TimeSpan::TICKS_PER_SECOND,
                _ => TimeSpan::TICKS_PER_MILLISECOND,
            };
            shift(dt, units(num(args, 0)?, per_unit)?)
        }
        "AddTicks" => {
            arity(name, args, &[1])?;
            shift(dt, TimeSpan::from_ticks(int(args, 0)?))
        }
        "AddMonths" => {
            arity(name, args, &[1])?;
            shift_months(dt, int(args, 0)?)
        }
        "AddYears" => {
            arity(name, args, &[1])?;
            let years = int(args, 0)?;
            shift_months(dt, years.checked_mul(12).ok_or_else(|| EvalError::failed(UNREPRESENTABLE))?)
        }
        "Add" => {
            arity(name, args, &[1])?;
            shift(dt, span(args, 0)?)
        }
        "Subtract" => {
            arity(name, args, &[1])?;
            match &args[0] {
                Value::DateTime(other) => ticks_between(*other, dt)
                    .map(|t| Value::TimeSpan(TimeSpan::from_ticks(t)))
                    .ok_or_else(|| EvalError::failed("TimeSpan overflowed because the duration is too long.")),
                _ => {
                    let delta = span(args, 0)?;
                    let negated = delta.ticks.checked_neg().ok_or_else(|| EvalError::failed(UNREPRESENTABLE))?;
                    shift(dt, TimeSpan::from_ticks(negated))
                }
            }
        }
        _ => Err(EvalError::unsupported(format!("DateTime.{}", name))),
    }
}

fn date_time_part(dt: NaiveDateTime, member: &str) -> Result<Value, EvalError> {
    let value = match member {
        "Year" => Value::Int(dt.year()),
        "Month" => Value::Int(dt.month() as i32),
        "Day" => Value::Int(dt.day() as i32),
        "Hour" => Value::Int(dt.hour() as i32),
        "Minute" => Value::Int(dt.minute() as i32),
        "Second" => Value::Int(dt.second() as i32),
        "Millisecond" => Value::Int((dt.nanosecond() / 1_000_000) as i32),
        "DayOfYear" => Value::Int(dt.ordinal() as i32),
        "DayOfWeek" => Value::Int(dt.weekday().num_days_from_sunday() as i32),
        "Date" => Value::DateTime(midnight(dt)),
        "TimeOfDay" => Value::TimeSpan(TimeSpan::from_ticks(ticks_between(midnight(dt), dt).unwrap_or(0))),
        "Ticks" => Value::Long(ticks_between(*DATE_MIN, dt).unwrap_or(0)),
        _ => return Err(EvalError::unsupported(format!("DateTime.{}", member))),
    };
    Ok(value)
}

fn from_epoch(epoch: NaiveDateTime, ticks: i64) -> Result<Value, EvalError> {
    if ticks < 0 {
        return Err(EvalError::failed("Not a valid Win32 FileTime."));
    }
    shift(epoch, TimeSpan::from_ticks(ticks))
}

fn call_date_time_static(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "FromOADate" => {
            arity(name, args, &[1])?;
            let days = num(args, 0)?;
            shift(*OA_EPOCH, units(days, TimeSpan::TICKS_PER_DAY)?)
                .map_err(|_| EvalError::failed("Not a legal OleAut date."))
        }
        "FromFileTimeUtc" => {
            arity(name, args, &[1])?;
            from_epoch(*FILE_TIME_EPOCH, int(args, 0)?)
        }
        "FromFileTime" => {
            arity(name, args, &[1])?;
            match from_epoch(*FILE_TIME_EPOCH, int(args, 0)?)? {
                Value::DateTime(utc) => {
                    let local = utc.and_utc().with_timezone(&Local).naive_local();
                    Ok(Value::DateTime(local))
                }
                other => Ok(other),
            }
        }
        "FromBinary" => {
            arity(name, args, &[1])?;
            let ticks = int(args, 0)? & 0x3FFF_FFFF_FFFF_FFFF;
            shift(*DATE_MIN, TimeSpan::from_ticks(ticks))
        }
        "DaysInMonth" => {
            arity(name, args, &[2])?;
            let (year, month) = (int(args, 0)?, int(args, 1)?);
            let first = ymd(year, month, 1)?;
            let next = first
                .checked_add_months(Months::new(1))
                .ok_or_else(|| EvalError::failed(UNREPRESENTABLE))?;
            Ok(Value::Int(next.signed_duration_since(first).num_days() as i32))
        }
        "IsLeapYear" => {
            arity(name, args, &[1])?;
            let year = int(args, 0)?;
            Ok(Value::Bool((year % 4 == 0 && year % 100 != 0) || year % 400 == 0))
        }
        _ => Err(EvalError::unsupported(format!("DateTime.{}", name))),
    }
}

fn ymd(year: i64, month: i64, day: i64) -> Result<NaiveDate, EvalError> {
    let invalid = || EvalError::failed("Year, Month, and Day parameters describe an un-representable DateTime.");
    if !(1..=9999).contains(&year) {
        return Err(invalid());
    }
    let month = u32::try_from(month).map_err(|_| invalid())?;
    let day = u32::try_from(day).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)
}

fn construct_date_time(args: &[Value]) -> Result<Value, EvalError> {
    let invalid = || EvalError::failed("Hour, Minute, and Second parameters describe an un-representable DateTime.");
    let hms = |h: i64, m: i64, s: i64, ms: i64| -> Result<(u32, u32, u32, u32), EvalError> {
        let conv = |v: i64| u32::try_from(v).map_err(|_| invalid());
        Ok((conv(h)?, conv(m)?, conv(s)?, conv(ms)?))
    };
    let (day, time) = match args.len() {
        3 => (ymd(int(args, 0)?, int(args, 1)?, int(args, 2)?)?, (0, 0, 0, 0)),
        6 => (
            ymd(int(args, 0)?, int(args, 1)?, int(args, 2)?)?,
            hms(int(args, 3)?, int(args, 4)?, int(args, 5)?, 0)?,
        ),
        7 => (
            ymd(int(args, 0)?, int(args, 1)?, int(args, 2)?)?,
            hms(int(args, 3)?, int(args, 4)?, int(args, 5)?, int(args, 6)?)?,
        ),
        n => return Err(EvalError::unsupported(format!("new DateTime with {} argument(s)", n))),
    };
    if time.3 > 999 {
        return Err(invalid());
    }
    day.and_hms_milli_opt(time.0, time.1, time.2, time.3)
        .map(Value::DateTime)
        .ok_or_else(invalid)
}

// ------- String and Convert -------

fn call_string(s: &str, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match (name, args.len()) {
        ("ToUpper", 0) => Ok(Value::Str(s.to_uppercase())),
        ("ToLower", 0) => Ok(Value::Str(s.to_lowercase())),
        ("Trim", 0) => Ok(Value::str(s.trim())),
        ("ToString", 0) => Ok(Value::str(s)),
        ("Contains", 1) => Ok(Value::Bool(s.contains(text(args, 0)?))),
        ("StartsWith", 1) => Ok(Value::Bool(s.starts_with(text(args, 0)?))),
        ("EndsWith", 1) => Ok(Value::Bool(s.ends_with(text(args, 0)?))),
        ("Substring", 1 | 2) => {
            let chars: Vec<char> = s.chars().collect();
            let start = int(args, 0)?;
            let length = if args.len() == 2 { int(args, 1)? } else { chars.len() as i64 - start };
            if start < 0 || length < 0 || start + length > chars.len() as i64 {
                return Err(EvalError::failed("Index and length must refer to a location within the string."));
            }
            Ok(Value::Str(chars[start as usize..(start + length) as usize].iter().collect()))
        }
        _ => Err(EvalError::unsupported(format!("String.{}", name))),
    }
}

fn call_string_static(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "Concat" => {
            let mut out = String::new();
            for arg in args {
                out.push_str(&to_text(arg)?);
            }
            Ok(Value::Str(out))
        }
        "IsNullOrEmpty" => {
            arity(name, args, &[1])?;
            Ok(Value::Bool(match &args[0] {
                Value::Null => true,
                Value::Str(s) => s.is_empty(),
                _ => false,
            }))
        }
        _ => Err(EvalError::unsupported(format!("String.{}", name))),
    }
}

fn call_convert(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    arity(name, args, &[1])?;
    let target = match name {
        "ToInt32" => ExprType::Int32,
        "ToInt64" => ExprType::Int64,
        "ToDouble" => ExprType::Double,
        "ToSingle" => ExprType::Single,
        "ToDecimal" => ExprType::Decimal,
        "ToChar" => ExprType::Char,
        "ToString" => return to_text(&args[0]).map(Value::Str),
        _ => return Err(EvalError::unsupported(format!("Convert.{}", name))),
    };
    // Convert.ToInt* rounds to even where a cast truncates.
    let source = match (&target, &args[0]) {
        (ExprType::Int32 | ExprType::Int64, Value::Double(v) | Value::Decimal(v)) => Value::Double(v.round_ties_even()),
        (ExprType::Int32 | ExprType::Int64, Value::Float(v)) => Value::Double((*v as f64).round_ties_even()),
        (_, other) => other.clone(),
    };
    convert_value(&source, &target)
}
