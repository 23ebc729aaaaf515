use std::fmt::Display;

use crate::error::{CriteriaErrorExt, Level};
use crate::eval::EvalError;
use crate::expr::{ExprType, Param};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoweringErrorKind {
    ExpressionNotSupported,
    ConversionNotSupported,
    MethodNotSupported,
    TrimArgumentsNotSupported,
    ContainsRequiresArray,
    ArrayInitRequiresConstant,
    NewNotSupported,
    CollectionPropertyAbsent,
    /// A constant sub-tree was evaluated and the evaluation raised.
    Evaluation,
    /// A parameter was referenced outside the lambda that declares it.
    ParameterOutOfScope,
}

#[derive(Debug, Clone)]
pub struct LoweringError {
    kind: LoweringErrorKind,
    level: Level,
    message: String,
    issuer: String,
}

impl LoweringError {
    pub fn with(kind: LoweringErrorKind, level: Level, message: String, issuer: String) -> Self {
        LoweringError { kind, level, message, issuer }
    }

    fn error(kind: LoweringErrorKind, message: String, issuer: &str) -> Self {
        LoweringError::with(kind, Level::Error, message, issuer.to_string())
    }

    pub fn expression_not_supported(what: impl Display) -> Self {
        Self::error(
            LoweringErrorKind::ExpressionNotSupported,
            format!("The expression '{}' is not supported.", what),
            "criteria.lower",
        )
    }

    pub fn conversion_not_supported(from: &ExprType, to: &ExprType) -> Self {
        Self::error(
            LoweringErrorKind::ConversionNotSupported,
            format!("Conversion from '{}' to '{}' is not supported.", from, to),
            "criteria.lower.operator",
        )
    }

    pub fn method_not_supported(name: &str) -> Self {
        Self::error(
            LoweringErrorKind::MethodNotSupported,
            format!("The method '{}' is not supported.", name),
            "criteria.lower.call",
        )
    }

    pub fn trim_arguments_not_supported() -> Self {
        Self::error(
            LoweringErrorKind::TrimArgumentsNotSupported,
            "Only the parameterless Trim method is supported.".to_string(),
            "criteria.lower.call",
        )
    }

    pub fn contains_requires_array(source: impl Display) -> Self {
        Self::error(
            LoweringErrorKind::ContainsRequiresArray,
            format!("Contains requires an array of constants, got '{}'.", source),
            "criteria.lower.call",
        )
    }

    pub fn array_init_requires_constant(element: impl Display) -> Self {
        Self::error(
            LoweringErrorKind::ArrayInitRequiresConstant,
            format!("Array initializer requires constant elements, got '{}'.", element),
            "criteria.lower.objects",
        )
    }

    pub fn new_not_supported(what: impl Display) -> Self {
        Self::error(
            LoweringErrorKind::NewNotSupported,
            format!("The construction '{}' is not supported; arguments must be constants.", what),
            "criteria.lower.objects",
        )
    }

    pub fn collection_property_absent(collection: impl Display) -> Self {
        Self::error(
            LoweringErrorKind::CollectionPropertyAbsent,
            format!("'{}' is not a collection property.", collection),
            "criteria.lower.aggregate",
        )
    }

    pub fn evaluation(what: impl Display, source: &EvalError) -> Self {
        Self::error(
            LoweringErrorKind::Evaluation,
            format!("Evaluating '{}' failed: {}", what, source),
            "criteria.eval",
        )
    }

    pub fn parameter_out_of_scope(param: &Param) -> Self {
        Self::error(
            LoweringErrorKind::ParameterOutOfScope,
            format!("The parameter '{}' is not in scope.", param.name),
            "criteria.lower.scope",
        )
    }

    pub fn kind(&self) -> LoweringErrorKind {
        self.kind
    }
}

impl std::fmt::Display for LoweringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LoweringError {}

impl CriteriaErrorExt for LoweringError {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }
}
