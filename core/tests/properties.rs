mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use criteria_core::lower::AggregateBuilder;
use criteria_core::{
    Aggregate, CriteriaBuilder, CriteriaOperator, Expr, ExprType, FunctionKind,
    FunctionOperatorType, Level, Param, Value, build_criteria, generate_error_report,
};

fn line_type() -> ExprType {
    ExprType::object("OrderLine")
}

fn sample_predicate(c: &Param) -> Expr {
    let filtered = Expr::enumerable_call(
        "Where",
        vec![accounts(c), amount_over_ten()],
        ExprType::sequence(account_type()),
    );
    let sum = Expr::enumerable_call("Sum", vec![filtered, amount_selector()], ExprType::Decimal);
    sum.gt(Expr::decimal(150.0)).and_also(name(c).call("StartsWith", vec![Expr::string("J")], ExprType::Bool))
}

#[test]
fn lowering_is_deterministic() {
    let c = ctx();
    let expr = lambda(&c, sample_predicate(&c));
    let first = build_criteria(&expr).expect("lowering failed");
    let second = build_criteria(&expr).expect("lowering failed");
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn parent_prefix_matches_nesting_depth() {
    let c = ctx();
    let o = order();
    let l = Param::new("l", line_type());
    let lines = o.expr().member("Lines", ExprType::sequence(line_type()));
    let quantity = l.expr().member("Quantity", ExprType::Int32);
    let shipped = l.expr().member("Shipped", ExprType::DateTime);

    // k = 2 for c, k = 1 for o, k = 0 for l
    let inner = Expr::lambda(
        vec![l.clone()],
        age(&c).gt(quantity).and_also(order_date(&o).eq(shipped)),
    );
    let any_line = Expr::enumerable_call("Any", vec![lines, inner], ExprType::Bool);
    let outer = Expr::lambda(vec![o.clone()], any_line);
    let any_order = Expr::enumerable_call("Any", vec![orders(&c), outer], ExprType::Bool);

    assert_eq!(
        build(&c, any_order),
        "[Orders][[Lines][[^.^.Age] > [Quantity] And [^.Date] = [Shipped]]]"
    );
}

#[test]
fn own_scope_has_no_prefix() {
    let c = ctx();
    let o = order();
    let pred = Expr::lambda(vec![o.clone()], order_date(&o).gt(Expr::static_member("DateTime", "MinValue", ExprType::DateTime)));
    let any = Expr::enumerable_call("Any", vec![orders(&c), pred], ExprType::Bool);
    assert_eq!(build(&c, any), "[Orders][[Date] > #0001-01-01#]");
}

#[test]
fn fusion_matches_manual_attachment() {
    let c = ctx();
    let filtered = Expr::enumerable_call(
        "Where",
        vec![accounts(&c), amount_over_ten()],
        ExprType::sequence(account_type()),
    );
    let where_only = build_criteria(&lambda(&c, filtered.clone())).expect("lowering failed");
    let fused = build_criteria(&lambda(
        &c,
        Expr::enumerable_call("Sum", vec![filtered, amount_selector()], ExprType::Decimal),
    ))
    .expect("lowering failed");

    let CriteriaOperator::Aggregate(operand) = where_only else {
        panic!("Where should lower to an aggregate");
    };
    let manual = AggregateBuilder::resume(operand)
        .aggregate(Aggregate::Sum)
        .project(Some(CriteriaOperator::property("Amount")))
        .finish();
    assert_eq!(fused, manual);
}

#[test]
fn conditional_arity_is_two_n_plus_one() {
    let c = ctx();
    for branches in 1..=5 {
        let mut body = Expr::int(0);
        for i in (0..branches).rev() {
            body = Expr::conditional(age(&c).eq(Expr::int(i)), Expr::int(i + 100), body);
        }
        let op = build_criteria(&lambda(&c, body)).expect("lowering failed");
        match op {
            CriteriaOperator::Function { function, operands } => {
                assert_eq!(function, FunctionKind::Builtin(FunctionOperatorType::Iif));
                assert_eq!(operands.len(), 2 * branches as usize + 1);
            }
            other => panic!("expected Iif, got {:?}", other),
        }
    }
}

#[test]
fn constant_calls_fold_before_function_mapping() {
    let c = ctx();
    let abs = Expr::static_call("Math", "Abs", vec![Expr::int(-5)], ExprType::Int32);
    assert_eq!(build(&c, age(&c).gt(abs)), "[Age] > 5");

    let upper = Expr::string("john").call("ToUpper", vec![], ExprType::String);
    assert_eq!(build(&c, name(&c).eq(upper)), "[Name] = 'JOHN'");

    let captured = Expr::captured("prefix", Value::str("jo"));
    let concat = Expr::static_call("String", "Concat", vec![captured, Expr::string("hn")], ExprType::String);
    assert_eq!(build(&c, name(&c).eq(concat)), "[Name] = 'john'");
}

#[test]
fn json_round_trip() {
    let c = ctx();
    let op = build_criteria(&lambda(&c, sample_predicate(&c))).expect("lowering failed");
    let json = op.to_json().expect("serializes");
    let back = CriteriaOperator::from_json(&json).expect("deserializes");
    assert_eq!(op, back);
    assert_eq!(op.to_string(), back.to_string());
}

#[test]
fn error_report_format() {
    let c = ctx();
    let err = try_build(&c, name(&c).call("Trim", vec![Expr::char('x')], ExprType::String)).expect_err("fails");
    let report = generate_error_report(&err);
    assert!(report.starts_with(&format!("CRITERIA | {} | criteria.lower.call | ", Level::Error)));
}

#[test]
fn builder_is_shared_across_threads() {
    let builder = Arc::new(CriteriaBuilder::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let builder = Arc::clone(&builder);
            thread::spawn(move || {
                let c = ctx();
                let body = age(&c).gt(Expr::int(i));
                builder.build(&lambda(&c, body)).map(|op| op.to_string())
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let rendered = handle.join().expect("thread panicked").expect("lowering failed");
        assert_eq!(rendered, format!("[Age] > {}", i));
    }
}
