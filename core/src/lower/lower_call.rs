//! file: core/src/lower/lower_call.rs
//! description: method call classification.
//!
//! A call that folds to a constant becomes that constant. Otherwise calls
//! declared on a sequence type become aggregates or membership tests, and
//! every other call becomes a criteria function: built-in by name first,
//! then a registered custom function.
//!
use log::debug;

use crate::criteria::{Aggregate, CriteriaOperator, FunctionKind, FunctionOperatorType};
use crate::expr::{Expr, MethodRef};

use super::aggregate_builder::build_aggregation;
use super::declare_builtins::function_for_method;
use super::err::LoweringError;
use super::lower_expr::lower_expr;
use super::lowering_context::LoweringContext;

/// Which slot the optional second argument of a collection call fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LambdaSlot {
    Projection,
    Filter,
}

fn collection_operation(name: &str) -> Option<(Aggregate, LambdaSlot)> {
    let op = match name {
        "Average" => (Aggregate::Avg, LambdaSlot::Projection),
        "Max" => (Aggregate::Max, LambdaSlot::Projection),
        "Min" => (Aggregate::Min, LambdaSlot::Projection),
        "Sum" => (Aggregate::Sum, LambdaSlot::Projection),
        "Count" => (Aggregate::Count, LambdaSlot::Filter),
        "Any" | "Where" => (Aggregate::Exists, LambdaSlot::Filter),
        "Single" | "SingleOrDefault" => (Aggregate::Single, LambdaSlot::Filter),
        _ => return None,
    };
    Some(op)
}

pub fn lower_call(
    ctx: &mut LoweringContext<'_>,
    expr: &Expr,
    receiver: Option<&Expr>,
    method: &MethodRef,
    args: &[Expr],
) -> Result<CriteriaOperator, LoweringError> {
    if let Some(value) = ctx.try_fold(expr)? {
        debug!("folded call to {}.{} into a constant", method.declaring_type, method.name);
        return Ok(CriteriaOperator::value(value));
    }
    if method.is_collection_operation() {
        lower_collection_call(ctx, expr, receiver, method, args)
    } else {
        lower_function_call(ctx, expr, receiver, method, args)
    }
}

fn lower_collection_call(
    ctx: &mut LoweringContext<'_>,
    expr: &Expr,
    receiver: Option<&Expr>,
    method: &MethodRef,
    args: &[Expr],
) -> Result<CriteriaOperator, LoweringError> {
    if method.name == "Contains" && receiver.is_none() {
        return lower_membership(ctx, expr, args);
    }
    let Some((aggregate, slot)) = collection_operation(&method.name) else {
        // Unknown sequence methods get the scalar treatment.
        return lower_function_call(ctx, expr, receiver, method, args);
    };
    let Some(collection) = args.first() else {
        return Err(LoweringError::expression_not_supported(expr));
    };
    let lambda = args.get(1);
    match slot {
        LambdaSlot::Projection => build_aggregation(ctx, collection, lambda, None, aggregate),
        LambdaSlot::Filter => build_aggregation(ctx, collection, None, lambda, aggregate),
    }
}

/// `source.Contains(probe)` over a constant sequence becomes `probe In (...)`.
fn lower_membership(ctx: &mut LoweringContext<'_>, expr: &Expr, args: &[Expr]) -> Result<CriteriaOperator, LoweringError> {
    let [source, probe] = args else {
        return Err(LoweringError::expression_not_supported(expr));
    };
    let probe = lower_expr(ctx, probe)?;
    let values = match lower_expr(ctx, source)? {
        CriteriaOperator::Value { value } => match value.elements() {
            Some(items) => items.iter().cloned().map(CriteriaOperator::value).collect(),
            None => return Err(LoweringError::contains_requires_array(&value)),
        },
        _ => return Err(LoweringError::contains_requires_array(source)),
    };
    Ok(CriteriaOperator::in_values(probe, values))
}

fn lower_function_call(
    ctx: &mut LoweringContext<'_>,
    expr: &Expr,
    receiver: Option<&Expr>,
    method: &MethodRef,
    args: &[Expr],
) -> Result<CriteriaOperator, LoweringError> {
    let name = method.name.as_str();
    if name == "IndexOf" {
        return lower_char_index(ctx, expr, receiver, args);
    }
    if name == "Trim" && !args.is_empty() {
        return Err(LoweringError::trim_arguments_not_supported());
    }

    let function = match function_for_method(name) {
        Some(kind) => FunctionKind::Builtin(kind),
        None if ctx.registry().is_registered(name) => {
            debug!("resolved '{}' as a custom function", name);
            FunctionKind::Custom(name.to_string())
        }
        None => return Err(LoweringError::method_not_supported(name)),
    };

    let mut operands = Vec::with_capacity(args.len() + 1);
    if let Some(receiver) = receiver {
        operands.push(lower_expr(ctx, receiver)?);
    }
    for arg in args {
        operands.push(lower_expr(ctx, arg)?);
    }
    Ok(CriteriaOperator::Function { function, operands })
}

/// `s.IndexOf(probe, rest..)` => `CharIndex(probe, s, rest..)`.
fn lower_char_index(
    ctx: &mut LoweringContext<'_>,
    expr: &Expr,
    receiver: Option<&Expr>,
    args: &[Expr],
) -> Result<CriteriaOperator, LoweringError> {
    let (Some(receiver), Some((probe, rest))) = (receiver, args.split_first()) else {
        return Err(LoweringError::expression_not_supported(expr));
    };
    let mut operands = vec![lower_expr(ctx, probe)?, lower_expr(ctx, receiver)?];
    for arg in rest {
        operands.push(lower_expr(ctx, arg)?);
    }
    Ok(CriteriaOperator::function(FunctionOperatorType::CharIndex, operands))
}
