pub mod criteria;
pub mod error;
pub mod eval;
pub mod expr;
pub mod lower;
pub mod registry;

pub use criteria::{
    Aggregate, AggregateOperand, BinaryOperatorType, CriteriaOperator, FunctionKind, FunctionOperatorType,
    UnaryOperatorType,
};
pub use error::{CriteriaErrorExt, Level};
pub use eval::{EvalError, EvalErrorKind, Evaluator, HostEvaluator};
pub use expr::{BinaryKind, Expr, ExprKind, ExprType, MethodRef, Param, TimeSpan, UnaryKind, Value};
pub use lower::{CriteriaBuilder, LoweringError, LoweringErrorKind};
pub use registry::{CustomFunction, CustomFunctionRegistry, FunctionDef, ScopedRegistration};

pub fn generate_error_report<E: CriteriaErrorExt + ?Sized>(error: &E) -> String {
    format!("CRITERIA | {} | {} | {}", error.level(), error.issuer(), error.message())
}

/// Lower `expr` with a default builder (global registry, host evaluator).
pub fn build_criteria(expr: &Expr) -> Result<CriteriaOperator, LoweringError> {
    CriteriaBuilder::new().build(expr)
}
