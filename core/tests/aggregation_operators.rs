mod common;

use common::*;
use criteria_core::{Aggregate, Expr, ExprType, LoweringErrorKind, build_criteria};

fn seq_of_accounts() -> ExprType {
    ExprType::sequence(account_type())
}

#[test]
fn average() {
    let c = ctx();
    let avg = Expr::enumerable_call("Average", vec![accounts(&c), amount_selector()], ExprType::Decimal);
    assert_eq!(build(&c, avg.eq(Expr::decimal(75.0))), "[Accounts][].Avg([Amount]) = 75.0m");
}

#[test]
fn count() {
    let c = ctx();
    let count = Expr::enumerable_call("Count", vec![accounts(&c)], ExprType::Int32);
    assert_eq!(build(&c, count.gt(Expr::int(1))), "[Accounts][].Count() > 1");
}

#[test]
fn exists() {
    let c = ctx();
    let any = Expr::enumerable_call("Any", vec![accounts(&c)], ExprType::Bool);
    assert_eq!(build(&c, any), "[Accounts][]");
}

#[test]
fn max_min_sum() {
    let c = ctx();
    let max = Expr::enumerable_call("Max", vec![accounts(&c), amount_selector()], ExprType::Decimal);
    assert_eq!(build(&c, max.gt(Expr::decimal(75.0))), "[Accounts][].Max([Amount]) > 75.0m");
    let min = Expr::enumerable_call("Min", vec![accounts(&c), amount_selector()], ExprType::Decimal);
    assert_eq!(build(&c, min.lt(Expr::decimal(10.0))), "[Accounts][].Min([Amount]) < 10.0m");
    let sum = Expr::enumerable_call("Sum", vec![accounts(&c), amount_selector()], ExprType::Decimal);
    assert_eq!(build(&c, sum.gt(Expr::decimal(150.0))), "[Accounts][].Sum([Amount]) > 150.0m");
}

#[test]
fn single_compared_with_null() {
    let c = ctx();
    let single = Expr::enumerable_call("SingleOrDefault", vec![accounts(&c)], account_type());
    assert_eq!(build(&c, single.ne(Expr::null(account_type()))), "[Accounts][].Single() <> null");
}

#[test]
fn single_with_condition() {
    let c = ctx();
    let single = Expr::enumerable_call("SingleOrDefault", vec![accounts(&c), amount_over_ten()], account_type());
    assert_eq!(build(&c, single), "[Accounts][[Amount] > 10.0m].Single()");
}

#[test]
fn member_of_single_becomes_projection() {
    let c = ctx();
    let single = Expr::enumerable_call("SingleOrDefault", vec![accounts(&c)], account_type());
    assert_eq!(build(&c, single.member("Amount", ExprType::Decimal)), "[Accounts][].Single([Amount])");
}

#[test]
fn where_then_sum_fuses() {
    let c = ctx();
    let filtered = Expr::enumerable_call("Where", vec![accounts(&c), amount_over_ten()], seq_of_accounts());
    let sum = Expr::enumerable_call("Sum", vec![filtered, amount_selector()], ExprType::Decimal);
    assert_eq!(build(&c, sum), "[Accounts][[Amount] > 10.0m].Sum([Amount])");
}

#[test]
fn where_then_sum_is_one_aggregate() {
    let c = ctx();
    let filtered = Expr::enumerable_call("Where", vec![accounts(&c), amount_over_ten()], seq_of_accounts());
    let sum = Expr::enumerable_call("Sum", vec![filtered, amount_selector()], ExprType::Decimal);
    let op = build_criteria(&lambda(&c, sum)).expect("lowering failed");
    let agg = op.as_aggregate().expect("aggregate at the root");
    assert_eq!(agg.collection, "Accounts");
    assert_eq!(agg.aggregate, Aggregate::Sum);
    assert_eq!(agg.expression.as_deref().map(ToString::to_string).as_deref(), Some("[Amount]"));
    assert_eq!(agg.condition.as_deref().map(ToString::to_string).as_deref(), Some("[Amount] > 10.0m"));
}

#[test]
fn where_alone_is_exists_with_condition() {
    let c = ctx();
    let filtered = Expr::enumerable_call("Where", vec![accounts(&c), amount_over_ten()], seq_of_accounts());
    assert_eq!(build(&c, filtered), "[Accounts][[Amount] > 10.0m]");
}

#[test]
fn where_then_count() {
    let c = ctx();
    let filtered = Expr::enumerable_call("Where", vec![accounts(&c), amount_over_ten()], seq_of_accounts());
    let count = Expr::enumerable_call("Count", vec![filtered], ExprType::Int32);
    assert_eq!(build(&c, count.gt(Expr::int(1))), "[Accounts][[Amount] > 10.0m].Count() > 1");
}

#[test]
fn chained_filters_are_combined() {
    let c = ctx();
    let a = account();
    let small = Expr::lambda(vec![a.clone()], amount(&a).lt(Expr::decimal(100.0)));
    let first = Expr::enumerable_call("Where", vec![accounts(&c), amount_over_ten()], seq_of_accounts());
    let second = Expr::enumerable_call("Count", vec![first, small], ExprType::Int32);
    assert_eq!(build(&c, second), "[Accounts][[Amount] > 10.0m And [Amount] < 100.0m].Count()");
}

#[test]
fn parent_reference_inside_predicate() {
    let c = ctx();
    let o = order();
    let pred = Expr::lambda(vec![o.clone()], registration_date(&c).eq(order_date(&o)));
    let any = Expr::enumerable_call("Any", vec![orders(&c), pred], ExprType::Bool);
    assert_eq!(build(&c, any), "[Orders][[^.RegistrationDate] = [Date]]");
}

#[test]
fn aggregate_over_non_collection_fails() {
    let c = ctx();
    let count = Expr::enumerable_call("Count", vec![name(&c).call("ToUpper", vec![], ExprType::String)], ExprType::Int32);
    let err = try_build(&c, count).expect_err("Upper([Name]) is not a collection");
    assert_eq!(err.kind(), LoweringErrorKind::CollectionPropertyAbsent);
}
