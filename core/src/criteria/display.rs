//! file: core/src/criteria/display.rs
//! description: textual rendering of criteria operator trees.
//!
//! Produces the filtering library's criteria-language text. Parentheses are
//! emitted only where operator precedence requires them.
//!
use std::fmt;

use chrono::Timelike;

use super::op::{
    Aggregate, AggregateOperand, BinaryOperatorType, CriteriaOperator, FunctionKind, FunctionOperatorType,
    UnaryOperatorType,
};
use crate::expr::Value;
use crate::registry::LIKE_FUNCTION;

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_COMPARE: u8 = 4;
const PREC_BIT_OR: u8 = 5;
const PREC_BIT_XOR: u8 = 6;
const PREC_BIT_AND: u8 = 7;
const PREC_ADD: u8 = 8;
const PREC_MUL: u8 = 9;
const PREC_UNARY: u8 = 10;
const PREC_ATOM: u8 = 11;

impl BinaryOperatorType {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperatorType::And => "And",
            BinaryOperatorType::Or => "Or",
            BinaryOperatorType::Equal => "=",
            BinaryOperatorType::NotEqual => "<>",
            BinaryOperatorType::Greater => ">",
            BinaryOperatorType::GreaterOrEqual => ">=",
            BinaryOperatorType::Less => "<",
            BinaryOperatorType::LessOrEqual => "<=",
            BinaryOperatorType::BitwiseAnd => "&",
            BinaryOperatorType::BitwiseOr => "|",
            BinaryOperatorType::BitwiseXor => "^",
            BinaryOperatorType::Plus => "+",
            BinaryOperatorType::Minus => "-",
            BinaryOperatorType::Multiply => "*",
            BinaryOperatorType::Divide => "/",
            BinaryOperatorType::Modulo => "%",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinaryOperatorType::Or => PREC_OR,
            BinaryOperatorType::And => PREC_AND,
            BinaryOperatorType::Equal
            | BinaryOperatorType::NotEqual
            | BinaryOperatorType::Greater
            | BinaryOperatorType::GreaterOrEqual
            | BinaryOperatorType::Less
            | BinaryOperatorType::LessOrEqual => PREC_COMPARE,
            BinaryOperatorType::BitwiseOr => PREC_BIT_OR,
            BinaryOperatorType::BitwiseXor => PREC_BIT_XOR,
            BinaryOperatorType::BitwiseAnd => PREC_BIT_AND,
            BinaryOperatorType::Plus | BinaryOperatorType::Minus => PREC_ADD,
            BinaryOperatorType::Multiply | BinaryOperatorType::Divide | BinaryOperatorType::Modulo => PREC_MUL,
        }
    }
}

impl fmt::Display for FunctionOperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Variant names are the criteria-language spellings.
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Builtin(kind) => write!(f, "{}", kind),
            FunctionKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn precedence(op: &CriteriaOperator) -> u8 {
    match op {
        CriteriaOperator::Binary { op, .. } => op.precedence(),
        CriteriaOperator::Unary { op, .. } => match op {
            UnaryOperatorType::Not => PREC_NOT,
            UnaryOperatorType::IsNull => PREC_COMPARE,
            UnaryOperatorType::Minus | UnaryOperatorType::Plus | UnaryOperatorType::BitwiseNot => PREC_UNARY,
        },
        CriteriaOperator::In { .. } => PREC_COMPARE,
        _ if is_like(op) => PREC_COMPARE,
        CriteriaOperator::Value { value } if starts_with_sign(value) => PREC_UNARY,
        _ => PREC_ATOM,
    }
}

/// `Like` is a custom function the filtering library prints infix.
fn is_like(op: &CriteriaOperator) -> bool {
    matches!(
        op,
        CriteriaOperator::Function { function: FunctionKind::Custom(name), operands }
            if name == LIKE_FUNCTION && operands.len() == 2
    )
}

fn starts_with_sign(value: &Value) -> bool {
    match value {
        Value::Int(i) => *i < 0,
        Value::Long(l) => *l < 0,
        Value::Float(v) => *v < 0.0,
        Value::Double(v) | Value::Decimal(v) => *v < 0.0,
        _ => false,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, op: &CriteriaOperator, min_prec: u8) -> fmt::Result {
    if precedence(op) < min_prec {
        write!(f, "(")?;
        write_operator(f, op)?;
        write!(f, ")")
    } else {
        write_operator(f, op)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[CriteriaOperator]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_operand(f, item, 0)?;
    }
    Ok(())
}

fn write_aggregate(f: &mut fmt::Formatter<'_>, agg: &AggregateOperand) -> fmt::Result {
    write!(f, "[{}][", agg.collection)?;
    if let Some(cond) = &agg.condition {
        write_operand(f, cond, 0)?;
    }
    write!(f, "]")?;
    if agg.aggregate == Aggregate::Exists && agg.expression.is_none() {
        return Ok(());
    }
    write!(f, ".{}(", agg.aggregate)?;
    if let Some(expr) = &agg.expression {
        write_operand(f, expr, 0)?;
    }
    write!(f, ")")
}

fn write_operator(f: &mut fmt::Formatter<'_>, op: &CriteriaOperator) -> fmt::Result {
    match op {
        CriteriaOperator::Property { name } => write!(f, "[{}]", name),
        CriteriaOperator::Value { value } => write_literal(f, value),
        CriteriaOperator::Binary { op, left, right } => {
            let prec = op.precedence();
            // And/Or are groups: a nested group of the same kind prints flat.
            let right_prec = match op {
                BinaryOperatorType::And | BinaryOperatorType::Or => prec,
                _ => prec + 1,
            };
            write_operand(f, left, prec)?;
            write!(f, " {} ", op.symbol())?;
            write_operand(f, right, right_prec)
        }
        CriteriaOperator::Unary { op, operand } => match op {
            UnaryOperatorType::Not => {
                write!(f, "Not ")?;
                write_operand(f, operand, PREC_NOT)
            }
            UnaryOperatorType::IsNull => {
                write_operand(f, operand, PREC_COMPARE + 1)?;
                write!(f, " Is Null")
            }
            UnaryOperatorType::Minus => {
                write!(f, "- ")?;
                write_operand(f, operand, PREC_UNARY)
            }
            UnaryOperatorType::Plus => {
                write!(f, "+ ")?;
                write_operand(f, operand, PREC_UNARY)
            }
            UnaryOperatorType::BitwiseNot => {
                write!(f, "~ ")?;
                write_operand(f, operand, PREC_UNARY)
            }
        },
        CriteriaOperator::Function { operands, .. } if is_like(op) => {
            write_operand(f, &operands[0], PREC_COMPARE + 1)?;
            write!(f, " Like ")?;
            write_operand(f, &operands[1], PREC_COMPARE + 1)
        }
        CriteriaOperator::Function { function, operands } => {
            write!(f, "{}(", function)?;
            write_list(f, operands)?;
            write!(f, ")")
        }
        CriteriaOperator::Aggregate(agg) => write_aggregate(f, agg),
        CriteriaOperator::In { probe, values } => {
            write_operand(f, probe, PREC_COMPARE + 1)?;
            write!(f, " In (")?;
            write_list(f, values)?;
            write!(f, ")")
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        write!(f, "{:.1}", v)
    } else {
        write!(f, "{}", v)
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => write!(f, "null"),
        Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
        Value::Char(c) => {
            if *c == '\'' {
                write!(f, "''''c")
            } else {
                write!(f, "'{}'c", c)
            }
        }
        Value::Int(i) => write!(f, "{}", i),
        Value::Long(l) => write!(f, "{}L", l),
        Value::Float(v) => {
            write_float(f, *v as f64)?;
            write!(f, "f")
        }
        Value::Double(v) => write_float(f, *v),
        Value::Decimal(v) => {
            write_float(f, *v)?;
            write!(f, "m")
        }
        Value::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
        Value::DateTime(dt) => {
            write!(f, "#{}", dt.format("%Y-%m-%d"))?;
            let time = dt.time();
            let fraction = time.nanosecond() / 10_000;
            if time.num_seconds_from_midnight() != 0 || time.nanosecond() != 0 {
                write!(f, " {}", dt.format("%H:%M:%S"))?;
                if fraction != 0 {
                    let digits = format!("{:05}", fraction);
                    write!(f, ".{}", digits.trim_end_matches('0'))?;
                }
            }
            write!(f, "#")
        }
        Value::TimeSpan(ts) => write!(f, "#{}#", ts),
        Value::Array(items) => {
            write!(f, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_literal(f, item)?;
            }
            write!(f, ")")
        }
        Value::Object(fields) => {
            write!(f, "{{")?;
            for (i, (name, item)) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} = ", name)?;
                write_literal(f, item)?;
            }
            write!(f, "}}")
        }
    }
}

impl fmt::Display for CriteriaOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_operator(f, self)
    }
}
