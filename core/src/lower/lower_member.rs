//! file: core/src/lower/lower_member.rs
//! description: member access resolution.
//!
//! First match wins:
//! 1. static member        -> folded value
//! 2. member of a parameter -> property path with parent prefix
//! 3. known accessor        -> `Len`, `GetYear`, ...
//! 4. closed-over object    -> folded value
//! 5. anything else         -> lower the object, then extend a property
//!    path or project a `Single` aggregate
//!
use log::debug;

use crate::criteria::{Aggregate, CriteriaOperator};
use crate::expr::{Expr, ExprKind, MemberTarget};

use super::aggregate_builder::AggregateBuilder;
use super::declare_builtins::member_accessor;
use super::err::LoweringError;
use super::lower_expr::lower_expr;
use super::lowering_context::LoweringContext;

pub fn lower_member(
    ctx: &mut LoweringContext<'_>,
    expr: &Expr,
    target: &MemberTarget,
    member: &str,
) -> Result<CriteriaOperator, LoweringError> {
    let object = match target {
        MemberTarget::Static(_) => return lower_folded(ctx, expr),
        MemberTarget::Instance(object) => object.as_ref(),
    };

    if let ExprKind::Parameter { param } = &object.kind {
        let prefix = ctx
            .scopes
            .chain_prefix(param)
            .ok_or_else(|| LoweringError::parameter_out_of_scope(param))?;
        return Ok(CriteriaOperator::property(format!("{}{}", prefix, member)));
    }

    if let Some(kind) = member_accessor(&object.ty, member) {
        let operand = lower_expr(ctx, object)?;
        return Ok(CriteriaOperator::function(kind, vec![operand]));
    }

    if object.is_closed() {
        return lower_folded(ctx, expr);
    }

    match lower_expr(ctx, object)? {
        CriteriaOperator::Property { name } => Ok(CriteriaOperator::property(format!("{}.{}", name, member))),
        CriteriaOperator::Aggregate(agg) if agg.aggregate == Aggregate::Single => {
            debug!("projecting '{}' out of single aggregate over [{}]", member, agg.collection);
            Ok(AggregateBuilder::resume(agg).project_member(member).finish())
        }
        _ => Err(LoweringError::expression_not_supported(expr)),
    }
}

fn lower_folded(ctx: &mut LoweringContext<'_>, expr: &Expr) -> Result<CriteriaOperator, LoweringError> {
    match ctx.try_fold(expr)? {
        Some(value) => Ok(CriteriaOperator::value(value)),
        None => Err(LoweringError::expression_not_supported(expr)),
    }
}
