//! file: core/src/lower/lower_expr.rs
//! description: top-level dispatch of the lowering pass.
//!
//! `lower_expr` matches on the source node kind and hands the node to the
//! helper for that family (members, operators, calls, objects). Helpers
//! recurse back through `lower_expr` for their children and return the
//! produced criteria node directly.
//!
use log::trace;

use crate::criteria::CriteriaOperator;
use crate::expr::{Expr, ExprKind, Param};

use super::err::LoweringError;
use super::lower_call::lower_call;
use super::lower_member::lower_member;
use super::lower_objects::{lower_conditional, lower_new, lower_new_array};
use super::lower_operator::{lower_binary, lower_unary};
use super::lowering_context::LoweringContext;

pub fn lower_expr(ctx: &mut LoweringContext<'_>, expr: &Expr) -> Result<CriteriaOperator, LoweringError> {
    trace!("lowering {} at depth {}: {}", expr.kind, ctx.scopes.depth(), expr);
    match &expr.kind {
        ExprKind::Constant { value } => Ok(CriteriaOperator::value(value.clone())),
        ExprKind::Member { target, member } => lower_member(ctx, expr, target, member),
        ExprKind::Binary { op, left, right } => lower_binary(ctx, *op, left, right),
        ExprKind::Unary { op, operand } => lower_unary(ctx, expr, *op, operand),
        ExprKind::Call { receiver, method, args } => lower_call(ctx, expr, receiver.as_deref(), method, args),
        ExprKind::Conditional { .. } => lower_conditional(ctx, expr),
        ExprKind::New { .. } => lower_new(ctx, expr),
        ExprKind::NewArray { elements } => lower_new_array(ctx, elements),
        ExprKind::Lambda { params, body } => lower_lambda(ctx, expr, params, body),
        // A bare parameter has no criteria form; only its members do.
        ExprKind::Parameter { .. } | ExprKind::Other { .. } => Err(LoweringError::expression_not_supported(expr)),
    }
}

/// Lower a single-parameter lambda body with its parameter in scope.
pub fn lower_lambda(
    ctx: &mut LoweringContext<'_>,
    expr: &Expr,
    params: &[Param],
    body: &Expr,
) -> Result<CriteriaOperator, LoweringError> {
    let [param] = params else {
        return Err(LoweringError::expression_not_supported(expr));
    };
    ctx.with_scope(param, |ctx| lower_expr(ctx, body))
}
