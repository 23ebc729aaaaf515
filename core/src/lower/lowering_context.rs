//! file: core/src/lower/lowering_context.rs
//! description: per-invocation state used while lowering one tree.
//!
//! `LoweringContext` owns the scope stack of lambda parameters and borrows
//! the collaborators (custom function registry, constant evaluator) chosen
//! by the `CriteriaBuilder`. A fresh context is created for every top-level
//! build and dropped when it returns.

use crate::eval::{self, Evaluator};
use crate::expr::{Expr, Param, Value};
use crate::registry::CustomFunctionRegistry;

use super::err::LoweringError;

/// Path prefix that escapes one level of collection nesting.
pub const PARENT_MARKER: &str = "^.";

/// Lambda parameters currently in scope, innermost last.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<Param>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { frames: Vec::new() }
    }

    pub fn enter(&mut self, param: Param) {
        self.frames.push(param);
    }

    pub fn exit(&mut self) -> Option<Param> {
        self.frames.pop()
    }

    pub fn current(&self) -> Option<&Param> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn contains(&self, param: &Param) -> bool {
        self.frames.iter().any(|p| p == param)
    }

    /// One parent marker per frame above the one owning `param`; empty for
    /// the current frame, `None` when `param` is not in scope at all.
    pub fn chain_prefix(&self, param: &Param) -> Option<String> {
        let owner = self.frames.iter().rposition(|p| p == param)?;
        let hops = self.frames.len() - 1 - owner;
        Some(PARENT_MARKER.repeat(hops))
    }
}

pub struct LoweringContext<'a> {
    pub scopes: ScopeStack,
    registry: &'a CustomFunctionRegistry,
    evaluator: &'a dyn Evaluator,
}

impl<'a> LoweringContext<'a> {
    pub fn new(registry: &'a CustomFunctionRegistry, evaluator: &'a dyn Evaluator) -> Self {
        LoweringContext { scopes: ScopeStack::new(), registry, evaluator }
    }

    pub fn registry(&self) -> &CustomFunctionRegistry {
        self.registry
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator
    }

    /// Run `f` with `param` pushed as the current scope. The frame is popped
    /// whether or not `f` succeeds.
    pub fn with_scope<T>(
        &mut self,
        param: &Param,
        f: impl FnOnce(&mut Self) -> Result<T, LoweringError>,
    ) -> Result<T, LoweringError> {
        self.scopes.enter(param.clone());
        let result = f(self);
        self.scopes.exit();
        result
    }

    /// Constant-fold `expr`; an evaluator failure becomes a lowering error.
    pub fn try_fold(&self, expr: &Expr) -> Result<Option<Value>, LoweringError> {
        eval::fold(expr, self.evaluator).map_err(|e| LoweringError::evaluation(expr, &e))
    }
}
