//! Criteria operator tree: the output of lowering.
pub mod display;
pub mod op;

pub use op::{
    Aggregate, AggregateOperand, BinaryOperatorType, CriteriaOperator, FunctionKind, FunctionOperatorType,
    UnaryOperatorType,
};
