mod common;

use common::*;
use criteria_core::{Expr, ExprType, LoweringErrorKind};

#[test]
fn bitwise_not_on_integer() {
    let c = ctx();
    assert_eq!(build(&c, roles(&c).not().eq(Expr::int(251))), "~ [Roles] = 251");
}

#[test]
fn negate() {
    let c = ctx();
    assert_eq!(build(&c, age(&c).negate().eq(Expr::int(-20))), "- [Age] = -20");
}

#[test]
fn logical_not_wraps_group() {
    let c = ctx();
    let body = name(&c).eq(Expr::string("John")).or_else(age(&c).eq(Expr::int(30))).not();
    assert_eq!(build(&c, body), "Not ([Name] = 'John' Or [Age] = 30)");
}

#[test]
fn nullable_lift_is_transparent() {
    let c = ctx();
    let lifted = age(&c).convert(ExprType::nullable(ExprType::Int32));
    assert_eq!(build(&c, lifted.eq(Expr::null(ExprType::nullable(ExprType::Int32)))), "[Age] = null");
}

#[test]
fn boxing_is_transparent() {
    let c = ctx();
    assert_eq!(build(&c, age(&c).convert(ExprType::object("Object"))), "[Age]");
}

#[test]
fn numeric_convert_uses_conversion_function() {
    let c = ctx();
    assert_eq!(build(&c, age(&c).convert(ExprType::Char)), "Char([Age])");
    assert_eq!(build(&c, angle(&c).convert(ExprType::Int32)), "ToInt([Angle])");
    assert_eq!(build(&c, angle(&c).convert(ExprType::Int64)), "ToLong([Angle])");
    assert_eq!(build(&c, age(&c).convert(ExprType::Double)), "ToDouble([Age])");
}

#[test]
fn closed_convert_folds() {
    let c = ctx();
    assert_eq!(build(&c, age(&c).gt(Expr::int(20).convert(ExprType::Int64))), "[Age] > 20L");
}

#[test]
fn convert_to_record_type_fails() {
    let c = ctx();
    let err = try_build(&c, age(&c).convert(ExprType::DateTime)).expect_err("no Int32 to DateTime conversion");
    assert_eq!(err.kind(), LoweringErrorKind::ConversionNotSupported);
    assert!(err.to_string().contains("Int32"));
}

#[test]
fn quote_is_transparent() {
    let c = ctx();
    let filter = amount_over_ten().quote();
    let body = Expr::call_method(
        None,
        criteria_core::MethodRef::queryable("Where"),
        vec![accounts(&c), filter],
        ExprType::sequence(account_type()),
    );
    assert_eq!(build(&c, body), "[Accounts][[Amount] > 10.0m]");
}
