//! file: core/src/lower/lower_operator.rs
//! description: binary, unary and conversion operator mapping.
//!
use crate::criteria::{BinaryOperatorType, CriteriaOperator, FunctionOperatorType, UnaryOperatorType};
use crate::expr::{BinaryKind, Expr, ExprType, UnaryKind};

use super::declare_builtins::conversion_function;
use super::err::LoweringError;
use super::lower_expr::lower_expr;
use super::lowering_context::LoweringContext;

fn binary_operator(kind: BinaryKind) -> Option<BinaryOperatorType> {
    let op = match kind {
        BinaryKind::AndAlso => BinaryOperatorType::And,
        BinaryKind::OrElse => BinaryOperatorType::Or,
        BinaryKind::Equal => BinaryOperatorType::Equal,
        BinaryKind::NotEqual => BinaryOperatorType::NotEqual,
        BinaryKind::GreaterThan => BinaryOperatorType::Greater,
        BinaryKind::GreaterThanOrEqual => BinaryOperatorType::GreaterOrEqual,
        BinaryKind::LessThan => BinaryOperatorType::Less,
        BinaryKind::LessThanOrEqual => BinaryOperatorType::LessOrEqual,
        BinaryKind::And => BinaryOperatorType::BitwiseAnd,
        BinaryKind::Or => BinaryOperatorType::BitwiseOr,
        BinaryKind::ExclusiveOr => BinaryOperatorType::BitwiseXor,
        BinaryKind::Add => BinaryOperatorType::Plus,
        BinaryKind::Subtract => BinaryOperatorType::Minus,
        BinaryKind::Multiply => BinaryOperatorType::Multiply,
        BinaryKind::Divide => BinaryOperatorType::Divide,
        BinaryKind::Modulo => BinaryOperatorType::Modulo,
        BinaryKind::Coalesce
        | BinaryKind::LeftShift
        | BinaryKind::RightShift
        | BinaryKind::Power
        | BinaryKind::ArrayIndex => return None,
    };
    Some(op)
}

pub fn lower_binary(
    ctx: &mut LoweringContext<'_>,
    op: BinaryKind,
    left: &Expr,
    right: &Expr,
) -> Result<CriteriaOperator, LoweringError> {
    if op == BinaryKind::Coalesce {
        // left ?? right  =>  Iif(left Is Null, right, left)
        let left = lower_expr(ctx, left)?;
        let right = lower_expr(ctx, right)?;
        return Ok(CriteriaOperator::function(
            FunctionOperatorType::Iif,
            vec![CriteriaOperator::is_null(left.clone()), right, left],
        ));
    }
    let Some(target) = binary_operator(op) else {
        return Err(LoweringError::expression_not_supported(op));
    };
    let left = lower_expr(ctx, left)?;
    let right = lower_expr(ctx, right)?;
    Ok(CriteriaOperator::binary(target, left, right))
}

pub fn lower_unary(
    ctx: &mut LoweringContext<'_>,
    expr: &Expr,
    op: UnaryKind,
    operand: &Expr,
) -> Result<CriteriaOperator, LoweringError> {
    match op {
        UnaryKind::Not => {
            let kind = if expr.ty.is_bool() { UnaryOperatorType::Not } else { UnaryOperatorType::BitwiseNot };
            Ok(CriteriaOperator::unary(kind, lower_expr(ctx, operand)?))
        }
        UnaryKind::Negate => Ok(CriteriaOperator::unary(UnaryOperatorType::Minus, lower_expr(ctx, operand)?)),
        UnaryKind::Convert => lower_convert(ctx, expr, operand),
        UnaryKind::Quote => lower_expr(ctx, operand),
        UnaryKind::UnaryPlus | UnaryKind::ArrayLength | UnaryKind::TypeAs => {
            Err(LoweringError::expression_not_supported(op))
        }
    }
}

/// Casts that change only nullability or box to an object leave no trace.
fn is_transparent(from: &ExprType, to: &ExprType) -> bool {
    from == to || matches!(to, ExprType::Object(_)) || from.underlying() == to.underlying()
}

fn lower_convert(ctx: &mut LoweringContext<'_>, expr: &Expr, operand: &Expr) -> Result<CriteriaOperator, LoweringError> {
    if is_transparent(&operand.ty, &expr.ty) {
        return lower_expr(ctx, operand);
    }
    if let Some(value) = ctx.try_fold(expr)? {
        return Ok(CriteriaOperator::value(value));
    }
    let Some(kind) = conversion_function(&expr.ty) else {
        return Err(LoweringError::conversion_not_supported(&operand.ty, &expr.ty));
    };
    Ok(CriteriaOperator::function(kind, vec![lower_expr(ctx, operand)?]))
}
