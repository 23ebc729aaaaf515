#![allow(dead_code)]

use criteria_core::{build_criteria, CriteriaBuilder, Expr, ExprType, LoweringError, Param};

pub fn context_type() -> ExprType {
    ExprType::object("TestContext")
}

pub fn account_type() -> ExprType {
    ExprType::object("Account")
}

pub fn order_type() -> ExprType {
    ExprType::object("Order")
}

/// The `c` in `c => ...`.
pub fn ctx() -> Param {
    Param::new("c", context_type())
}

pub fn account() -> Param {
    Param::new("a", account_type())
}

pub fn order() -> Param {
    Param::new("o", order_type())
}

pub fn name(c: &Param) -> Expr {
    c.expr().member("Name", ExprType::String)
}

pub fn roles(c: &Param) -> Expr {
    c.expr().member("Roles", ExprType::Int32)
}

pub fn age(c: &Param) -> Expr {
    c.expr().member("Age", ExprType::Int32)
}

pub fn zip_code(c: &Param) -> Expr {
    c.expr().member("ZipCode", ExprType::Int32)
}

pub fn angle(c: &Param) -> Expr {
    c.expr().member("Angle", ExprType::Double)
}

pub fn registration_date(c: &Param) -> Expr {
    c.expr().member("RegistrationDate", ExprType::DateTime)
}

pub fn start_date(c: &Param) -> Expr {
    c.expr().member("StartDate", ExprType::DateTime)
}

pub fn end_date(c: &Param) -> Expr {
    c.expr().member("EndDate", ExprType::DateTime)
}

pub fn accounts(c: &Param) -> Expr {
    c.expr().member("Accounts", ExprType::sequence(account_type()))
}

pub fn orders(c: &Param) -> Expr {
    c.expr().member("Orders", ExprType::sequence(order_type()))
}

pub fn amount(a: &Param) -> Expr {
    a.expr().member("Amount", ExprType::Decimal)
}

pub fn order_date(o: &Param) -> Expr {
    o.expr().member("Date", ExprType::DateTime)
}

/// `a => a.Amount > 10`
pub fn amount_over_ten() -> Expr {
    let a = account();
    Expr::lambda(vec![a.clone()], amount(&a).gt(Expr::decimal(10.0)))
}

/// `a => a.Amount`
pub fn amount_selector() -> Expr {
    let a = account();
    Expr::lambda(vec![a.clone()], amount(&a))
}

pub fn lambda(c: &Param, body: Expr) -> Expr {
    Expr::lambda(vec![c.clone()], body)
}

/// Lower `c => body` with the default builder.
pub fn try_build(c: &Param, body: Expr) -> Result<String, LoweringError> {
    build_criteria(&lambda(c, body)).map(|op| op.to_string())
}

pub fn build(c: &Param, body: Expr) -> String {
    try_build(c, body).expect("lowering failed")
}

pub fn build_with(builder: &CriteriaBuilder, c: &Param, body: Expr) -> Result<String, LoweringError> {
    builder.build(&lambda(c, body)).map(|op| op.to_string())
}
