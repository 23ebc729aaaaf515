//! file: core/src/lower/mod.rs
//! description: expression tree to criteria lowering.
//!
//! `CriteriaBuilder` is the entry point. It owns the collaborators a build
//! needs (custom function registry, constant evaluator) and creates a fresh
//! `LoweringContext` per call, so a builder can be shared across threads.
//!
pub mod aggregate_builder;
pub mod declare_builtins;
pub mod err;
pub mod lower_call;
pub mod lower_expr;
pub mod lower_member;
pub mod lower_objects;
pub mod lower_operator;
pub mod lowering_context;

pub use aggregate_builder::AggregateBuilder;
pub use err::{LoweringError, LoweringErrorKind};
pub use lowering_context::{LoweringContext, ScopeStack, PARENT_MARKER};

use std::sync::Arc;

use lazy_static::lazy_static;
use log::debug;

use crate::criteria::CriteriaOperator;
use crate::eval::{Evaluator, HostEvaluator};
use crate::expr::Expr;
use crate::registry::CustomFunctionRegistry;

lazy_static! {
    static ref HOST: Arc<HostEvaluator> = Arc::new(HostEvaluator::new());
}

#[derive(Clone)]
enum RegistryHandle {
    Global,
    Shared(Arc<CustomFunctionRegistry>),
}

#[derive(Clone)]
pub struct CriteriaBuilder {
    registry: RegistryHandle,
    evaluator: Arc<dyn Evaluator>,
}

impl Default for CriteriaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CriteriaBuilder {
    /// Builder backed by the process-wide registry and the host evaluator.
    pub fn new() -> Self {
        let evaluator: Arc<dyn Evaluator> = HOST.clone();
        CriteriaBuilder { registry: RegistryHandle::Global, evaluator }
    }

    /// Resolve custom functions against `registry` instead of the global one.
    pub fn with_registry(mut self, registry: Arc<CustomFunctionRegistry>) -> Self {
        self.registry = RegistryHandle::Shared(registry);
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn registry(&self) -> &CustomFunctionRegistry {
        match &self.registry {
            RegistryHandle::Global => CustomFunctionRegistry::global(),
            RegistryHandle::Shared(registry) => registry,
        }
    }

    /// Lower `expr` into a criteria tree.
    pub fn build(&self, expr: &Expr) -> Result<CriteriaOperator, LoweringError> {
        debug!("building criteria for {}", expr);
        let mut ctx = LoweringContext::new(self.registry(), self.evaluator.as_ref());
        lower_expr::lower_expr(&mut ctx, expr)
    }
}
