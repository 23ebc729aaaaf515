//! file: core/src/lower/lower_objects.rs
//! description: conditionals, object construction and array literals.
//!
use crate::criteria::{CriteriaOperator, FunctionOperatorType};
use crate::expr::{Expr, ExprKind, Value};

use super::err::LoweringError;
use super::lower_expr::lower_expr;
use super::lowering_context::LoweringContext;

/// `a ? x : b ? y : z` becomes one `Iif(a, x, b, y, z)`.
pub fn lower_conditional(ctx: &mut LoweringContext<'_>, expr: &Expr) -> Result<CriteriaOperator, LoweringError> {
    let mut operands = Vec::new();
    let mut node = expr;
    while let ExprKind::Conditional { test, if_true, if_false } = &node.kind {
        operands.push(lower_expr(ctx, test)?);
        operands.push(lower_expr(ctx, if_true)?);
        node = if_false;
    }
    operands.push(lower_expr(ctx, node)?);
    Ok(CriteriaOperator::function(FunctionOperatorType::Iif, operands))
}

/// Object construction is only representable as the constructed value.
pub fn lower_new(ctx: &mut LoweringContext<'_>, expr: &Expr) -> Result<CriteriaOperator, LoweringError> {
    match ctx.try_fold(expr)? {
        Some(value) => Ok(CriteriaOperator::value(value)),
        None => Err(LoweringError::new_not_supported(expr)),
    }
}

pub fn lower_new_array(ctx: &mut LoweringContext<'_>, elements: &[Expr]) -> Result<CriteriaOperator, LoweringError> {
    let mut items = Vec::with_capacity(elements.len());
    for element in elements {
        match lower_expr(ctx, element)? {
            CriteriaOperator::Value { value } => items.push(value),
            _ => return Err(LoweringError::array_init_requires_constant(element)),
        }
    }
    Ok(CriteriaOperator::value(Value::Array(items)))
}
