//! file: core/src/criteria/op.rs
//! description: criteria operator tree produced by lowering.
//!
//! Node shapes follow the filtering library's operator model: property
//! references, constants, binary/unary operators, n-ary functions,
//! aggregates over collection properties and membership tests.
//!
use serde::{Deserialize, Serialize};

use crate::expr::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperatorType {
    And,
    Or,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperatorType {
    Not,
    BitwiseNot,
    Minus,
    Plus,
    IsNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aggregate {
    Exists,
    Count,
    Max,
    Min,
    Avg,
    Sum,
    Single,
}

/// Built-in function kinds understood by the filtering library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionOperatorType {
    Iif,
    IsNull,
    IsNullOrEmpty,
    // strings
    Trim,
    Len,
    Substring,
    Upper,
    Lower,
    Concat,
    Ascii,
    Char,
    ToStr,
    Replace,
    Reverse,
    Insert,
    CharIndex,
    Remove,
    PadLeft,
    PadRight,
    StartsWith,
    EndsWith,
    Contains,
    // math
    Abs,
    Sqr,
    Cos,
    Sin,
    Atn,
    Exp,
    Log,
    Rnd,
    Tan,
    Power,
    Sign,
    Round,
    Ceiling,
    Floor,
    Max,
    Min,
    Acos,
    Asin,
    Atn2,
    BigMul,
    Cosh,
    Log10,
    Sinh,
    Tanh,
    // conversions
    ToInt,
    ToLong,
    ToFloat,
    ToDouble,
    ToDecimal,
    // date parts
    GetDate,
    GetDay,
    GetDayOfWeek,
    GetDayOfYear,
    GetHour,
    GetMilliSecond,
    GetMinute,
    GetMonth,
    GetSecond,
    GetTimeOfDay,
    GetYear,
    // date arithmetic
    AddDays,
    AddHours,
    AddMilliSeconds,
    AddMinutes,
    AddMonths,
    AddSeconds,
    AddTicks,
    AddTimeSpan,
    AddYears,
    DateDiffDay,
    DateDiffHour,
    DateDiffMilliSecond,
    DateDiffMinute,
    DateDiffMonth,
    DateDiffSecond,
    DateDiffTick,
    DateDiffYear,
    Now,
    Today,
    UtcNow,
}

/// Function name slot: a built-in kind or a registered custom function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Builtin(FunctionOperatorType),
    Custom(String),
}

/// Reduction over a collection property, optionally filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateOperand {
    /// Collection property path, e.g. `Accounts` or `^.Orders`.
    pub collection: String,
    pub aggregate: Aggregate,
    pub expression: Option<Box<CriteriaOperator>>,
    pub condition: Option<Box<CriteriaOperator>>,
}

impl AggregateOperand {
    pub fn new(
        collection: impl Into<String>,
        aggregate: Aggregate,
        expression: Option<CriteriaOperator>,
        condition: Option<CriteriaOperator>,
    ) -> Self {
        AggregateOperand {
            collection: collection.into(),
            aggregate,
            expression: expression.map(Box::new),
            condition: condition.map(Box::new),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CriteriaOperator {
    Property { name: String },
    Value { value: Value },
    Binary { op: BinaryOperatorType, left: Box<CriteriaOperator>, right: Box<CriteriaOperator> },
    Unary { op: UnaryOperatorType, operand: Box<CriteriaOperator> },
    Function { function: FunctionKind, operands: Vec<CriteriaOperator> },
    Aggregate(AggregateOperand),
    In { probe: Box<CriteriaOperator>, values: Vec<CriteriaOperator> },
}

impl CriteriaOperator {
    pub fn property(name: impl Into<String>) -> Self {
        CriteriaOperator::Property { name: name.into() }
    }

    pub fn value(value: Value) -> Self {
        CriteriaOperator::Value { value }
    }

    pub fn binary(op: BinaryOperatorType, left: CriteriaOperator, right: CriteriaOperator) -> Self {
        CriteriaOperator::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn unary(op: UnaryOperatorType, operand: CriteriaOperator) -> Self {
        CriteriaOperator::Unary { op, operand: Box::new(operand) }
    }

    pub fn is_null(operand: CriteriaOperator) -> Self {
        CriteriaOperator::unary(UnaryOperatorType::IsNull, operand)
    }

    pub fn function(kind: FunctionOperatorType, operands: Vec<CriteriaOperator>) -> Self {
        CriteriaOperator::Function { function: FunctionKind::Builtin(kind), operands }
    }

    pub fn custom_function(name: impl Into<String>, operands: Vec<CriteriaOperator>) -> Self {
        CriteriaOperator::Function { function: FunctionKind::Custom(name.into()), operands }
    }

    pub fn in_values(probe: CriteriaOperator, values: Vec<CriteriaOperator>) -> Self {
        CriteriaOperator::In { probe: Box::new(probe), values }
    }

    pub fn as_property(&self) -> Option<&str> {
        match self {
            CriteriaOperator::Property { name } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            CriteriaOperator::Value { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&AggregateOperand> {
        match self {
            CriteriaOperator::Aggregate(agg) => Some(agg),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
