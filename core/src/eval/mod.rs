//! file: core/src/eval/mod.rs
//! description: constant evaluation of parameter-free sub-trees.
//!
//! `fold` tries to reduce a sub-tree to a literal `Value` when it has no
//! dependency on the lowered context parameter. The actual invocation of
//! host members is delegated to an `Evaluator`; `HostEvaluator` is the
//! built-in one.
//!
pub mod err;
pub mod host;

pub use err::{EvalError, EvalErrorKind};
pub use host::HostEvaluator;

use log::debug;

use crate::expr::{Expr, ExprKind, ExprType, MemberTarget, MethodRef, UnaryKind, Value};

/// Evaluate-constant-subtree capability. Every argument handed in is
/// already a literal.
pub trait Evaluator: Send + Sync {
    /// Invoke a method. `receiver` is `None` for static methods.
    fn call(&self, method: &MethodRef, receiver: Option<&Value>, args: &[Value]) -> Result<Value, EvalError>;

    /// Read a static field or property.
    fn read_static(&self, declaring_type: &str, member: &str) -> Result<Value, EvalError>;

    /// Construct an instance of `ty`.
    fn construct(&self, ty: &ExprType, args: &[Value]) -> Result<Value, EvalError>;

    /// Read a field or property off a literal value.
    fn read_member(&self, target: &Value, member: &str) -> Result<Value, EvalError> {
        read_field(target, member)
    }

    /// Apply a `Convert` node to a literal.
    fn convert(&self, value: &Value, ty: &ExprType) -> Result<Value, EvalError> {
        convert_value(value, ty)
    }
}

/// Field lookup on a captured holder object.
pub fn read_field(target: &Value, member: &str) -> Result<Value, EvalError> {
    match target {
        Value::Object(fields) => fields
            .get(member)
            .cloned()
            .ok_or_else(|| EvalError::unsupported(format!("{}.{}", target.type_name(), member))),
        _ => Err(EvalError::unsupported(format!("{}.{}", target.type_name(), member))),
    }
}

/// Numeric and nullable conversions shared by evaluators.
pub fn convert_value(value: &Value, ty: &ExprType) -> Result<Value, EvalError> {
    if value.is_null() {
        return match ty {
            ExprType::Nullable(_) | ExprType::Object(_) | ExprType::String => Ok(Value::Null),
            _ => Err(EvalError::failed(format!("Cannot convert null to {}.", ty))),
        };
    }
    let unsupported = || EvalError::unsupported(format!("Convert({}, {})", value.type_name(), ty));
    match ty.underlying() {
        ExprType::Int32 => {
            let v = value.as_f64().ok_or_else(unsupported)?;
            if v.is_nan() || v.trunc() < i32::MIN as f64 || v.trunc() > i32::MAX as f64 {
                return Err(EvalError::failed(format!("Value {} overflows Int32.", v)));
            }
            Ok(Value::Int(v.trunc() as i32))
        }
        ExprType::Int64 => match value.as_i64() {
            Some(l) => Ok(Value::Long(l)),
            None => {
                let v = value.as_f64().ok_or_else(unsupported)?;
                // i64::MAX as f64 rounds up to 2^63, which is already out of range.
                if v.is_nan() || v.trunc() < i64::MIN as f64 || v.trunc() >= i64::MAX as f64 {
                    return Err(EvalError::failed(format!("Value {} overflows Int64.", v)));
                }
                Ok(Value::Long(v.trunc() as i64))
            }
        },
        ExprType::Double => Ok(Value::Double(value.as_f64().ok_or_else(unsupported)?)),
        ExprType::Single => Ok(Value::Float(value.as_f64().ok_or_else(unsupported)? as f32)),
        ExprType::Decimal => Ok(Value::Decimal(value.as_f64().ok_or_else(unsupported)?)),
        ExprType::Char => {
            let code = value.as_i64().ok_or_else(unsupported)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| EvalError::failed(format!("{} is not a valid character code.", code)))
        }
        ExprType::Object(_) => Ok(value.clone()),
        other if *other == crate::expr::type_of_value(value) => Ok(value.clone()),
        _ => Err(unsupported()),
    }
}

fn settle(result: Result<Value, EvalError>) -> Result<Option<Value>, EvalError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_unsupported() => {
            debug!("constant folding skipped: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn fold_all(exprs: &[Expr], evaluator: &dyn Evaluator) -> Result<Option<Vec<Value>>, EvalError> {
    let mut values = Vec::with_capacity(exprs.len());
    for e in exprs {
        match fold(e, evaluator)? {
            Some(v) => values.push(v),
            None => return Ok(None),
        }
    }
    Ok(Some(values))
}

/// Try to reduce `expr` to a literal.
///
/// `Ok(None)` means "not a constant": the sub-tree references a parameter,
/// contains a node kind that never folds, or the evaluator has no binding
/// for something it calls. `Err` means an evaluation actually failed.
pub fn fold(expr: &Expr, evaluator: &dyn Evaluator) -> Result<Option<Value>, EvalError> {
    match &expr.kind {
        ExprKind::Constant { value } => Ok(Some(value.clone())),
        ExprKind::Member { target, member } => match target {
            MemberTarget::Static(owner) => settle(evaluator.read_static(owner, member)),
            MemberTarget::Instance(obj) => match fold(obj, evaluator)? {
                Some(value) => settle(evaluator.read_member(&value, member)),
                None => Ok(None),
            },
        },
        ExprKind::Call { receiver, method, args } => {
            let receiver_value = match receiver {
                Some(r) => match fold(r, evaluator)? {
                    Some(v) => Some(v),
                    None => return Ok(None),
                },
                None => None,
            };
            let Some(values) = fold_all(args, evaluator)? else {
                return Ok(None);
            };
            settle(evaluator.call(method, receiver_value.as_ref(), &values))
        }
        ExprKind::New { args } => {
            let Some(values) = fold_all(args, evaluator)? else {
                return Ok(None);
            };
            settle(evaluator.construct(&expr.ty, &values))
        }
        ExprKind::NewArray { elements } => Ok(fold_all(elements, evaluator)?.map(Value::Array)),
        ExprKind::Unary { op: UnaryKind::Convert, operand } => match fold(operand, evaluator)? {
            Some(value) => settle(evaluator.convert(&value, &expr.ty)),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}
