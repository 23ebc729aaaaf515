//! file: core/src/expr/kind.rs
//! description: source expression kinds, operators and static type tags.
//!
//! Defines `ExprKind` together with `BinaryKind`, `UnaryKind`, `ExprType`
//! and the method/member references used by call and member nodes.
//!
use std::fmt;

use super::node::{Expr, Param};
use super::value::Value;

/// Binary node kinds of the inspectable function-body tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    AndAlso,            // &&
    OrElse,             // ||
    Equal,              // ==
    NotEqual,           // !=
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    LessThan,           // <
    LessThanOrEqual,    // <=
    And,                // &
    Or,                 // |
    ExclusiveOr,        // ^
    Add,                // +
    Subtract,           // -
    Multiply,           // *
    Divide,             // /
    Modulo,             // %
    Coalesce,           // ??
    LeftShift,          // <<
    RightShift,         // >>
    Power,
    ArrayIndex,
}

impl BinaryKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryKind::AndAlso => "&&",
            BinaryKind::OrElse => "||",
            BinaryKind::Equal => "==",
            BinaryKind::NotEqual => "!=",
            BinaryKind::GreaterThan => ">",
            BinaryKind::GreaterThanOrEqual => ">=",
            BinaryKind::LessThan => "<",
            BinaryKind::LessThanOrEqual => "<=",
            BinaryKind::And => "&",
            BinaryKind::Or => "|",
            BinaryKind::ExclusiveOr => "^",
            BinaryKind::Add => "+",
            BinaryKind::Subtract => "-",
            BinaryKind::Multiply => "*",
            BinaryKind::Divide => "/",
            BinaryKind::Modulo => "%",
            BinaryKind::Coalesce => "??",
            BinaryKind::LeftShift => "<<",
            BinaryKind::RightShift => ">>",
            BinaryKind::Power => "**",
            BinaryKind::ArrayIndex => "[]",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryKind::Equal
                | BinaryKind::NotEqual
                | BinaryKind::GreaterThan
                | BinaryKind::GreaterThanOrEqual
                | BinaryKind::LessThan
                | BinaryKind::LessThanOrEqual
        )
    }
}

/// Unary node kinds. `Convert` carries its target type in the node's `ty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryKind {
    Not,
    Negate,
    UnaryPlus,
    Convert,
    /// Wraps a lambda passed to a queryable-style collection operation.
    Quote,
    ArrayLength,
    TypeAs,
}

impl fmt::Display for UnaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryKind::Not => "Not",
            UnaryKind::Negate => "Negate",
            UnaryKind::UnaryPlus => "UnaryPlus",
            UnaryKind::Convert => "Convert",
            UnaryKind::Quote => "Quote",
            UnaryKind::ArrayLength => "ArrayLength",
            UnaryKind::TypeAs => "TypeAs",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryKind::AndAlso => "AndAlso",
            BinaryKind::OrElse => "OrElse",
            BinaryKind::Equal => "Equal",
            BinaryKind::NotEqual => "NotEqual",
            BinaryKind::GreaterThan => "GreaterThan",
            BinaryKind::GreaterThanOrEqual => "GreaterThanOrEqual",
            BinaryKind::LessThan => "LessThan",
            BinaryKind::LessThanOrEqual => "LessThanOrEqual",
            BinaryKind::And => "And",
            BinaryKind::Or => "Or",
            BinaryKind::ExclusiveOr => "ExclusiveOr",
            BinaryKind::Add => "Add",
            BinaryKind::Subtract => "Subtract",
            BinaryKind::Multiply => "Multiply",
            BinaryKind::Divide => "Divide",
            BinaryKind::Modulo => "Modulo",
            BinaryKind::Coalesce => "Coalesce",
            BinaryKind::LeftShift => "LeftShift",
            BinaryKind::RightShift => "RightShift",
            BinaryKind::Power => "Power",
            BinaryKind::ArrayIndex => "ArrayIndex",
        };
        write!(f, "{}", s)
    }
}

/// Static type of a node as seen by the host type system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprType {
    Void,
    Bool,
    Char,
    Byte,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    String,
    DateTime,
    TimeSpan,
    /// Any record/class type, by name.
    Object(String),
    /// An enumerable of the element type.
    Sequence(Box<ExprType>),
    /// `Nullable<T>`.
    Nullable(Box<ExprType>),
}

impl ExprType {
    pub fn object(name: impl Into<String>) -> Self {
        ExprType::Object(name.into())
    }

    pub fn sequence(element: ExprType) -> Self {
        ExprType::Sequence(Box::new(element))
    }

    pub fn nullable(inner: ExprType) -> Self {
        ExprType::Nullable(Box::new(inner))
    }

    /// Strips one level of `Nullable<T>`.
    pub fn underlying(&self) -> &ExprType {
        match self {
            ExprType::Nullable(inner) => inner.as_ref(),
            other => other,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.underlying(), ExprType::Bool)
    }

    pub fn element_type(&self) -> Option<&ExprType> {
        match self {
            ExprType::Sequence(elem) => Some(elem.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprType::Void => write!(f, "Void"),
            ExprType::Bool => write!(f, "Boolean"),
            ExprType::Char => write!(f, "Char"),
            ExprType::Byte => write!(f, "Byte"),
            ExprType::Int32 => write!(f, "Int32"),
            ExprType::Int64 => write!(f, "Int64"),
            ExprType::Single => write!(f, "Single"),
            ExprType::Double => write!(f, "Double"),
            ExprType::Decimal => write!(f, "Decimal"),
            ExprType::String => write!(f, "String"),
            ExprType::DateTime => write!(f, "DateTime"),
            ExprType::TimeSpan => write!(f, "TimeSpan"),
            ExprType::Object(name) => write!(f, "{}", name),
            ExprType::Sequence(elem) => write!(f, "IEnumerable`1[{}]", elem),
            ExprType::Nullable(inner) => write!(f, "Nullable`1[{}]", inner),
        }
    }
}

/// Where a called method is declared, as far as lowering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaringCategory {
    /// Extension methods over in-memory sequences.
    Enumerable,
    /// Extension methods over queryable sequences.
    Queryable,
    /// Any other type: string, math, date/time or user helpers.
    Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodRef {
    pub declaring_type: String,
    pub name: String,
    pub category: DeclaringCategory,
}

impl MethodRef {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        MethodRef {
            declaring_type: declaring_type.into(),
            name: name.into(),
            category: DeclaringCategory::Scalar,
        }
    }

    pub fn enumerable(name: impl Into<String>) -> Self {
        MethodRef {
            declaring_type: "Enumerable".to_string(),
            name: name.into(),
            category: DeclaringCategory::Enumerable,
        }
    }

    pub fn queryable(name: impl Into<String>) -> Self {
        MethodRef {
            declaring_type: "Queryable".to_string(),
            name: name.into(),
            category: DeclaringCategory::Queryable,
        }
    }

    pub fn is_collection_operation(&self) -> bool {
        matches!(self.category, DeclaringCategory::Enumerable | DeclaringCategory::Queryable)
    }
}

/// Owner of a member access: an instance expression or a type (static read).
#[derive(Debug, Clone, PartialEq)]
pub enum MemberTarget {
    Instance(Box<Expr>),
    Static(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Parameter { param: Param },
    Member { target: MemberTarget, member: String },
    Constant { value: Value },
    Binary { op: BinaryKind, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryKind, operand: Box<Expr> },
    Call { receiver: Option<Box<Expr>>, method: MethodRef, args: Vec<Expr> },
    Conditional { test: Box<Expr>, if_true: Box<Expr>, if_false: Box<Expr> },
    New { args: Vec<Expr> },
    NewArray { elements: Vec<Expr> },
    Lambda { params: Vec<Param>, body: Box<Expr> },
    /// Node kinds the lowering pass has no rule for (invocation, index, ...).
    Other { name: String, operands: Vec<Expr> },
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKind::Parameter { .. } => write!(f, "Parameter"),
            ExprKind::Member { .. } => write!(f, "MemberAccess"),
            ExprKind::Constant { .. } => write!(f, "Constant"),
            ExprKind::Binary { op, .. } => write!(f, "{}", op),
            ExprKind::Unary { op, .. } => write!(f, "{}", op),
            ExprKind::Call { .. } => write!(f, "Call"),
            ExprKind::Conditional { .. } => write!(f, "Conditional"),
            ExprKind::New { .. } => write!(f, "New"),
            ExprKind::NewArray { .. } => write!(f, "NewArrayInit"),
            ExprKind::Lambda { .. } => write!(f, "Lambda"),
            ExprKind::Other { name, .. } => write!(f, "{}", name),
        }
    }
}
