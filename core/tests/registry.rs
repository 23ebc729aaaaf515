mod common;

use std::sync::Arc;

use common::*;
use criteria_core::registry::{LIKE_FUNCTION, LikeFunction};
use criteria_core::{
    CriteriaBuilder, CustomFunction, CustomFunctionRegistry, Expr, ExprType, FunctionDef, LoweringErrorKind, Value,
};

fn is_adult() -> Arc<dyn CustomFunction> {
    Arc::new(FunctionDef::new("IsAdult", ExprType::Bool, |args| {
        Ok(Value::Bool(args.first().and_then(Value::as_i64).is_some_and(|age| age >= 18)))
    }))
}

fn is_adult_call(c: &criteria_core::Param) -> Expr {
    Expr::static_call("Rules", "IsAdult", vec![age(c)], ExprType::Bool)
}

#[test]
fn register_lookup_unregister() {
    let registry = CustomFunctionRegistry::new();
    assert!(!registry.is_registered("IsAdult"));
    assert!(registry.register(is_adult()).is_none());
    assert!(registry.is_registered("IsAdult"));

    let function = registry.lookup("IsAdult").expect("registered");
    assert_eq!(function.result_type(&[ExprType::Int32]), ExprType::Bool);
    assert_eq!(function.evaluate(&[Value::Int(21)]).expect("evaluates"), Value::Bool(true));
    assert_eq!(function.evaluate(&[Value::Int(12)]).expect("evaluates"), Value::Bool(false));

    assert!(registry.unregister("IsAdult").is_some());
    assert!(registry.lookup("IsAdult").is_none());
}

#[test]
fn registered_names_are_sorted() {
    let registry = CustomFunctionRegistry::new();
    registry.register(is_adult());
    registry.register(Arc::new(LikeFunction));
    assert_eq!(registry.registered_names(), vec!["IsAdult".to_string(), "Like".to_string()]);
}

#[test]
fn scoped_registration_unregisters_on_drop() {
    let registry = Arc::new(CustomFunctionRegistry::new());
    let builder = CriteriaBuilder::new().with_registry(registry.clone());
    let c = ctx();
    {
        let guard = registry.scoped(is_adult());
        assert_eq!(guard.name(), "IsAdult");
        assert_eq!(build_with(&builder, &c, is_adult_call(&c)).expect("registered"), "IsAdult([Age])");
    }
    let err = build_with(&builder, &c, is_adult_call(&c)).expect_err("guard dropped");
    assert_eq!(err.kind(), LoweringErrorKind::MethodNotSupported);
}

#[test]
fn scoped_registration_restores_shadowed_function() {
    let registry = CustomFunctionRegistry::new();
    registry.register(is_adult());
    {
        let replacement = Arc::new(FunctionDef::new("IsAdult", ExprType::Bool, |_| Ok(Value::Bool(false))));
        let _guard = registry.scoped(replacement);
        let current = registry.lookup("IsAdult").expect("registered");
        assert_eq!(current.evaluate(&[Value::Int(40)]).expect("evaluates"), Value::Bool(false));
    }
    let restored = registry.lookup("IsAdult").expect("restored");
    assert_eq!(restored.evaluate(&[Value::Int(40)]).expect("evaluates"), Value::Bool(true));
}

#[test]
fn guard_released_when_lowering_fails() {
    let registry = Arc::new(CustomFunctionRegistry::new());
    let builder = CriteriaBuilder::new().with_registry(registry.clone());
    let c = ctx();
    let outcome = {
        let _guard = registry.scoped(is_adult());
        let trimmed = name(&c).call("Trim", vec![Expr::char('x')], ExprType::String);
        build_with(&builder, &c, is_adult_call(&c).and_also(trimmed.eq(Expr::string("x"))))
    };
    assert!(outcome.is_err());
    assert!(!registry.is_registered("IsAdult"));
}

#[test]
fn global_registry_gates_custom_calls() {
    let c = ctx();
    let call = Expr::static_call("Rules", "GlobalGateCheck", vec![name(&c)], ExprType::Bool);
    assert!(try_build(&c, call.clone()).is_err());
    {
        let function = Arc::new(FunctionDef::new("GlobalGateCheck", ExprType::Bool, |_| Ok(Value::Bool(true))));
        let _guard = CustomFunctionRegistry::global().scoped(function);
        assert_eq!(build(&c, call.clone()), "GlobalGateCheck([Name])");
    }
    let err = try_build(&c, call).expect_err("unregistered again");
    assert_eq!(err.kind(), LoweringErrorKind::MethodNotSupported);
}

#[test]
fn builtin_name_wins_over_custom() {
    let registry = Arc::new(CustomFunctionRegistry::new());
    registry.register(Arc::new(FunctionDef::new("Upper", ExprType::String, |_| Ok(Value::Null))));
    let builder = CriteriaBuilder::new().with_registry(registry);
    let c = ctx();
    let op = builder
        .build(&lambda(&c, name(&c).call("ToUpper", vec![], ExprType::String)))
        .expect("lowering failed");
    assert_eq!(
        op,
        criteria_core::CriteriaOperator::function(criteria_core::FunctionOperatorType::Upper, vec![
            criteria_core::CriteriaOperator::property("Name")
        ])
    );
}

#[test]
fn like_is_preregistered_globally() {
    assert!(CustomFunctionRegistry::global().is_registered(LIKE_FUNCTION));
}

#[test]
fn like_matches_wildcards() {
    let like = LikeFunction;
    let matches = |text: &str, pattern: &str| like.evaluate(&[Value::str(text), Value::str(pattern)]).expect("evaluates");
    assert_eq!(matches("john", "%jo%"), Value::Bool(true));
    assert_eq!(matches("bob", "%jo%"), Value::Bool(false));
    assert_eq!(matches("Bob", "B_b"), Value::Bool(true));
    assert_eq!(matches("Bob", "B_"), Value::Bool(false));
    assert_eq!(matches("", "%"), Value::Bool(true));
}

#[test]
fn like_handles_runs_of_wildcards() {
    let like = LikeFunction;
    let text = "a".repeat(64);
    let pattern = format!("{}x", "%".repeat(24));
    assert_eq!(like.evaluate(&[Value::str(&text), Value::str(&pattern)]).expect("evaluates"), Value::Bool(false));
    let pattern = format!("{}a", "%_".repeat(12));
    assert_eq!(like.evaluate(&[Value::str(&text), Value::str(&pattern)]).expect("evaluates"), Value::Bool(true));
}
