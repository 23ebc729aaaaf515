//! file: core/src/registry.rs
//! description: custom criteria function trait & registry.
//!
//! Defines the `CustomFunction` trait for user functions usable inside
//! predicates, the `CustomFunctionRegistry` the lowering pass consults by
//! name, and `ScopedRegistration`, a guard that keeps a function registered
//! for the lifetime of a scope.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;
use log::{debug, warn};

use crate::eval::EvalError;
use crate::expr::{ExprType, Value};

pub trait CustomFunction: Send + Sync {
    /// Name the function is registered and emitted under.
    fn name(&self) -> &str;

    /// Result type for the given operand types.
    fn result_type(&self, operands: &[ExprType]) -> ExprType;

    /// Evaluate the function over literal operands.
    fn evaluate(&self, operands: &[Value]) -> Result<Value, EvalError>;

    fn description(&self) -> String {
        String::new()
    }
}

type Evaluate = dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync;

/// A `CustomFunction` built from a fixed result type and a closure.
pub struct FunctionDef {
    name: String,
    result: ExprType,
    evaluate: Box<Evaluate>,
}

impl FunctionDef {
    pub fn new<F>(name: impl Into<String>, result: ExprType, evaluate: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        FunctionDef { name: name.into(), result, evaluate: Box::new(evaluate) }
    }
}

impl CustomFunction for FunctionDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn result_type(&self, _operands: &[ExprType]) -> ExprType {
        self.result.clone()
    }

    fn evaluate(&self, operands: &[Value]) -> Result<Value, EvalError> {
        (self.evaluate)(operands)
    }
}

/// Pattern-match function the global registry starts out with.
pub const LIKE_FUNCTION: &str = "Like";

/// `Like(text, pattern)`: `%` matches any run of characters, `_` exactly one.
pub struct LikeFunction;

impl CustomFunction for LikeFunction {
    fn name(&self) -> &str {
        LIKE_FUNCTION
    }

    fn result_type(&self, _operands: &[ExprType]) -> ExprType {
        ExprType::Bool
    }

    fn evaluate(&self, operands: &[Value]) -> Result<Value, EvalError> {
        match operands {
            [Value::Null, _] | [_, Value::Null] => Ok(Value::Null),
            [Value::Str(text), Value::Str(pattern)] => {
                let text: Vec<char> = text.chars().collect();
                let pattern: Vec<char> = pattern.chars().collect();
                Ok(Value::Bool(like(&text, &pattern)))
            }
            _ => Err(EvalError::failed("Like expects two string operands.")),
        }
    }

    fn description(&self) -> String {
        "SQL-style pattern match".to_string()
    }
}

/// `prev[j]` holds whether the pattern read so far matches `text[..j]`.
fn like(text: &[char], pattern: &[char]) -> bool {
    let mut prev = vec![false; text.len() + 1];
    prev[0] = true;
    let mut next = vec![false; text.len() + 1];
    for &p in pattern {
        match p {
            '%' => {
                let mut seen = false;
                for (j, slot) in next.iter_mut().enumerate() {
                    seen |= prev[j];
                    *slot = seen;
                }
            }
            _ => {
                next[0] = false;
                for (j, &c) in text.iter().enumerate() {
                    next[j + 1] = prev[j] && (p == '_' || p == c);
                }
            }
        }
        std::mem::swap(&mut prev, &mut next);
    }
    prev[text.len()]
}

lazy_static! {
    static ref GLOBAL: CustomFunctionRegistry = {
        let registry = CustomFunctionRegistry::new();
        registry.register(Arc::new(LikeFunction));
        registry
    };
}

#[derive(Default)]
pub struct CustomFunctionRegistry {
    functions: RwLock<HashMap<String, Arc<dyn CustomFunction>>>,
}

impl CustomFunctionRegistry {
    pub fn new() -> Self {
        Self { functions: RwLock::new(HashMap::new()) }
    }

    /// Process-wide registry used by a default `CriteriaBuilder`.
    pub fn global() -> &'static CustomFunctionRegistry {
        &GLOBAL
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn CustomFunction>>> {
        self.functions.read().unwrap_or_else(|poisoned| {
            warn!("custom function registry lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn CustomFunction>>> {
        self.functions.write().unwrap_or_else(|poisoned| {
            warn!("custom function registry lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Register a function, returning the one previously bound to the name.
    pub fn register(&self, function: Arc<dyn CustomFunction>) -> Option<Arc<dyn CustomFunction>> {
        let name = function.name().to_string();
        debug!("registering custom function '{}'", name);
        self.write().insert(name, function)
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<dyn CustomFunction>> {
        debug!("unregistering custom function '{}'", name);
        self.write().remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn CustomFunction>> {
        self.read().get(name).cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Names of the registered functions, sorted.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Register `function` until the returned guard is dropped. A function
    /// it shadowed is put back on drop.
    pub fn scoped(&self, function: Arc<dyn CustomFunction>) -> ScopedRegistration<'_> {
        let name = function.name().to_string();
        let previous = self.register(function);
        ScopedRegistration { registry: self, name, previous }
    }
}

pub struct ScopedRegistration<'a> {
    registry: &'a CustomFunctionRegistry,
    name: String,
    previous: Option<Arc<dyn CustomFunction>>,
}

impl ScopedRegistration<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ScopedRegistration<'_> {
    fn drop(&mut self) {
        self.registry.unregister(&self.name);
        if let Some(previous) = self.previous.take() {
            self.registry.register(previous);
        }
    }
}
