//! file: core/src/expr/mod.rs
//! description: the inspectable function-body tree that lowering consumes.
//!
//! Trees are built by the host (or by tests through the builder helpers on
//! `Expr`) and are never mutated by the lowering pass.
//!
pub mod kind;
pub mod node;
pub mod value;

pub use kind::{BinaryKind, DeclaringCategory, ExprKind, ExprType, MemberTarget, MethodRef, UnaryKind};
pub use node::{type_of_value, Expr, Param};
pub use value::{TimeSpan, Value};
