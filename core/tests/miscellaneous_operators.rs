mod common;

use std::sync::Arc;

use common::*;
use criteria_core::{CriteriaBuilder, EvalError, Expr, ExprType, HostEvaluator, LoweringErrorKind, Param, Value};

fn names() -> Value {
    Value::Array(vec![Value::str("John"), Value::str("Bob"), Value::str("Nick")])
}

fn string_seq() -> ExprType {
    ExprType::sequence(ExprType::String)
}

fn timespan(name: &str, arg: Expr) -> Expr {
    Expr::static_call("TimeSpan", name, vec![arg], ExprType::TimeSpan)
}

fn date_static(name: &str, arg: Expr) -> Expr {
    Expr::static_call("DateTime", name, vec![arg], ExprType::DateTime)
}

#[test]
fn property() {
    let c = ctx();
    assert_eq!(build(&c, name(&c)), "[Name]");
}

#[test]
fn nested_property() {
    let c = ctx();
    let reference = c.expr().member("MyReferenceObject", ExprType::object("ReferenceObject"));
    assert_eq!(
        build(&c, reference.member("ReferenceObjectName", ExprType::String)),
        "[MyReferenceObject.ReferenceObjectName]"
    );
}

#[test]
fn constant_body() {
    let c = ctx();
    assert_eq!(build(&c, Expr::string("test")), "'test'");
}

#[test]
fn in_over_array_literal() {
    let c = ctx();
    let array = Expr::new_array(
        ExprType::String,
        vec![Expr::string("John"), Expr::string("Bob"), Expr::string("Nick")],
    );
    let contains = Expr::enumerable_call("Contains", vec![array, name(&c)], ExprType::Bool);
    assert_eq!(build(&c, contains), "[Name] In ('John', 'Bob', 'Nick')");
}

#[test]
fn in_over_captured_array() {
    let c = ctx();
    let captured = Expr::captured("names", names());
    let contains = Expr::enumerable_call("Contains", vec![captured, name(&c)], ExprType::Bool);
    assert_eq!(build(&c, contains), "[Name] In ('John', 'Bob', 'Nick')");
}

#[test]
fn in_over_static_function_result() {
    let c = ctx();
    let host = HostEvaluator::new().with_function("TestContext", "GetNames", |_| Ok(names()));
    let builder = CriteriaBuilder::new().with_evaluator(Arc::new(host));
    let source = Expr::static_call("TestContext", "GetNames", vec![], string_seq());
    let contains = Expr::enumerable_call("Contains", vec![source, name(&c)], ExprType::Bool);
    assert_eq!(build_with(&builder, &c, contains).expect("lowering failed"), "[Name] In ('John', 'Bob', 'Nick')");
}

#[test]
fn contains_over_scalar_fails() {
    let c = ctx();
    let captured = Expr::captured("single", Value::str("John"));
    let contains = Expr::enumerable_call("Contains", vec![captured, name(&c)], ExprType::Bool);
    let err = try_build(&c, contains).expect_err("a string is not an array of constants");
    assert_eq!(err.kind(), LoweringErrorKind::ContainsRequiresArray);
}

#[test]
fn array_with_property_element_fails() {
    let c = ctx();
    let array = Expr::new_array(ExprType::String, vec![Expr::string("John"), name(&c)]);
    let contains = Expr::enumerable_call("Contains", vec![array, Expr::string("Bob")], ExprType::Bool);
    let err = try_build(&c, contains).expect_err("array elements must be constants");
    assert_eq!(err.kind(), LoweringErrorKind::ArrayInitRequiresConstant);
}

#[test]
fn date_difference_days_fails() {
    let c = ctx();
    let end = end_date(&c).member("Date", ExprType::DateTime);
    let start = start_date(&c).member("Date", ExprType::DateTime);
    let mut span = end.sub(start);
    span.ty = ExprType::TimeSpan;
    assert!(try_build(&c, span.member("Days", ExprType::Int32)).is_err());
}

#[test]
fn timespan_factories_fold() {
    let c = ctx();
    assert_eq!(build(&c, timespan("FromSeconds", Expr::double(1.0))), "#00:00:01#");
    assert_eq!(build(&c, timespan("FromDays", Expr::double(1.0))), "#1.00:00:00#");
    assert_eq!(build(&c, timespan("FromHours", Expr::double(1.0))), "#01:00:00#");
    assert_eq!(build(&c, timespan("FromMilliseconds", Expr::double(1.0))), "#00:00:00.0010000#");
    assert_eq!(build(&c, timespan("FromMinutes", Expr::double(1.0))), "#00:01:00#");
    assert_eq!(build(&c, timespan("FromTicks", Expr::long(1))), "#00:00:00.0000001#");
}

#[test]
fn timespan_statics_fold() {
    let c = ctx();
    let read = |member: &str| Expr::static_member("TimeSpan", member, ExprType::TimeSpan);
    assert_eq!(build(&c, read("MaxValue")), "#10675199.02:48:05.4775807#");
    assert_eq!(build(&c, read("MinValue")), "#-10675199.02:48:05.4775808#");
    assert_eq!(build(&c, read("Zero")), "#00:00:00#");
}

#[test]
fn timespan_from_property_fails() {
    let c = ctx();
    let from_days = timespan("FromDays", age(&c).convert(ExprType::Double));
    let err = try_build(&c, from_days).expect_err("FromDays over a property has no criteria form");
    assert_eq!(err.kind(), LoweringErrorKind::MethodNotSupported);
}

#[test]
fn new_date_folds() {
    let c = ctx();
    let date = Expr::new_object(ExprType::DateTime, vec![Expr::int(2017), Expr::int(9), Expr::int(3)]);
    assert_eq!(build(&c, date), "#2017-09-03#");
}

#[test]
fn new_date_over_property_fails() {
    let c = ctx();
    let date = Expr::new_object(ExprType::DateTime, vec![age(&c), Expr::int(1), Expr::int(1)]);
    let err = try_build(&c, date).expect_err("constructor arguments must be constants");
    assert_eq!(err.kind(), LoweringErrorKind::NewNotSupported);
}

#[test]
fn date_factories_fold() {
    let c = ctx();
    assert_eq!(build(&c, date_static("FromBinary", Expr::long(1))), "#0001-01-01 00:00:00#");
    assert_eq!(build(&c, date_static("FromFileTimeUtc", Expr::long(1))), "#1601-01-01 00:00:00#");
    assert_eq!(build(&c, date_static("FromOADate", Expr::double(1.0))), "#1899-12-31#");
}

#[test]
fn date_statics_fold() {
    let c = ctx();
    let read = |member: &str| Expr::static_member("DateTime", member, ExprType::DateTime);
    assert_eq!(build(&c, read("MaxValue")), "#9999-12-31 23:59:59.99999#");
    assert_eq!(build(&c, read("MinValue")), "#0001-01-01#");

    let today = build(&c, read("Today"));
    assert!(today.starts_with('#') && today.ends_with('#'));
    assert!(!today.contains(' '), "Today has no time part: {}", today);

    for member in ["Now", "UtcNow"] {
        let op = criteria_core::build_criteria(&lambda(&c, read(member))).expect("lowering failed");
        assert!(matches!(op.as_value(), Some(Value::DateTime(_))));
    }
}

#[test]
fn bare_parameter_fails() {
    let c = ctx();
    let err = try_build(&c, c.expr()).expect_err("a bare parameter has no criteria form");
    assert_eq!(err.kind(), LoweringErrorKind::ExpressionNotSupported);
}

#[test]
fn foreign_parameter_fails() {
    let c = ctx();
    let stranger = Param::new("x", context_type());
    let body = stranger.expr().member("Name", ExprType::String).eq(Expr::string("John"));
    let err = try_build(&c, body).expect_err("x is not in scope");
    assert_eq!(err.kind(), LoweringErrorKind::ParameterOutOfScope);
}

#[test]
fn two_parameter_lambda_fails() {
    let c = ctx();
    let d = ctx();
    let lambda = Expr::lambda(vec![c.clone(), d], name(&c));
    let err = criteria_core::build_criteria(&lambda).expect_err("only single-parameter lambdas lower");
    assert_eq!(err.kind(), LoweringErrorKind::ExpressionNotSupported);
}

#[test]
fn failing_evaluation_is_reported() {
    let c = ctx();
    let host = HostEvaluator::new().with_function("TestContext", "Explode", |_| Err(EvalError::failed("boom")));
    let builder = CriteriaBuilder::new().with_evaluator(Arc::new(host));
    let call = Expr::static_call("TestContext", "Explode", vec![], ExprType::Int32);
    let err = build_with(&builder, &c, age(&c).eq(call)).expect_err("the evaluator raised");
    assert_eq!(err.kind(), LoweringErrorKind::Evaluation);
    assert!(err.to_string().contains("boom"));
}
