//! file: core/src/lower/aggregate_builder.rs
//! description: aggregate descriptor threaded through chained collection calls.
//!
//! A chain such as `Where(p).Sum(s)` lowers its root once; every further
//! call in the chain resumes the same descriptor instead of wrapping the
//! previous result, so the chain ends up as one aggregate operand carrying
//! both the filter and the reduction.
//!
use log::debug;

use crate::criteria::{Aggregate, AggregateOperand, BinaryOperatorType, CriteriaOperator};
use crate::expr::Expr;

use super::err::LoweringError;
use super::lower_expr::lower_expr;
use super::lowering_context::LoweringContext;

#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    collection: String,
    aggregate: Aggregate,
    expression: Option<CriteriaOperator>,
    condition: Option<CriteriaOperator>,
}

impl AggregateBuilder {
    /// First operation seen on `collection`.
    pub fn fresh(collection: impl Into<String>) -> Self {
        AggregateBuilder { collection: collection.into(), aggregate: Aggregate::Exists, expression: None, condition: None }
    }

    /// Continue an aggregate an earlier call in the chain produced.
    pub fn resume(operand: AggregateOperand) -> Self {
        AggregateBuilder {
            collection: operand.collection,
            aggregate: operand.aggregate,
            expression: operand.expression.map(|e| *e),
            condition: operand.condition.map(|c| *c),
        }
    }

    /// Start from a lowered collection root: a property path begins a new
    /// aggregate, an aggregate is resumed, anything else has no collection.
    pub fn from_root(root: CriteriaOperator, source: &Expr) -> Result<Self, LoweringError> {
        match root {
            CriteriaOperator::Property { name } => Ok(AggregateBuilder::fresh(name)),
            CriteriaOperator::Aggregate(operand) => {
                debug!("fusing into aggregate over [{}]", operand.collection);
                Ok(AggregateBuilder::resume(operand))
            }
            _ => Err(LoweringError::collection_property_absent(source)),
        }
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    /// Replace the aggregated expression.
    pub fn project(mut self, expression: Option<CriteriaOperator>) -> Self {
        self.expression = expression;
        self
    }

    /// Project a member of the selected element, extending a projection
    /// that already names a property.
    pub fn project_member(mut self, member: &str) -> Self {
        let path = match self.expression.take() {
            Some(CriteriaOperator::Property { name }) => format!("{}.{}", name, member),
            _ => member.to_string(),
        };
        self.expression = Some(CriteriaOperator::property(path));
        self
    }

    /// Attach a filter; an existing filter is kept and combined with `And`.
    pub fn filter(mut self, condition: Option<CriteriaOperator>) -> Self {
        self.condition = match (self.condition.take(), condition) {
            (Some(existing), Some(added)) => Some(CriteriaOperator::binary(BinaryOperatorType::And, existing, added)),
            (existing, added) => existing.or(added),
        };
        self
    }

    pub fn finish(self) -> CriteriaOperator {
        CriteriaOperator::Aggregate(AggregateOperand::new(
            self.collection,
            self.aggregate,
            self.expression,
            self.condition,
        ))
    }
}

/// Lower `collection` and fold one collection operation into it.
pub fn build_aggregation(
    ctx: &mut LoweringContext<'_>,
    collection: &Expr,
    projection: Option<&Expr>,
    condition: Option<&Expr>,
    aggregate: Aggregate,
) -> Result<CriteriaOperator, LoweringError> {
    let root = lower_expr(ctx, collection)?;
    let builder = AggregateBuilder::from_root(root, collection)?;
    let projection = projection.map(|e| lower_expr(ctx, e)).transpose()?;
    let condition = condition.map(|e| lower_expr(ctx, e)).transpose()?;
    Ok(builder.aggregate(aggregate).project(projection).filter(condition).finish())
}
