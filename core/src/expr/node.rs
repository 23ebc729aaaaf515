use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::kind::{BinaryKind, ExprKind, ExprType, MemberTarget, MethodRef, UnaryKind};
use super::value::Value;

fn create_id() -> usize {
    static COUNTER: AtomicUsize = AtomicUsize::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A lambda parameter. Identity is the id, not the name: clones refer to the
/// same parameter, two `Param::new("x", ..)` calls do not.
#[derive(Debug, Clone)]
pub struct Param {
    id: usize,
    pub name: String,
    pub ty: ExprType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ExprType) -> Self {
        Param { id: create_id(), name: name.into(), ty }
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    /// A `Parameter` node referring to this parameter.
    pub fn expr(&self) -> Expr {
        Expr::new(ExprKind::Parameter { param: self.clone() }, self.ty.clone())
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Param {}

#[derive(Debug, Clone)]
pub struct Expr {
    id: usize,
    pub kind: ExprKind,
    pub ty: ExprType,
}

/// Structural equality; node ids are ignored.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.ty == other.ty
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: ExprType) -> Self {
        Expr { id: create_id(), kind, ty }
    }

    pub fn get_id(&self) -> usize {
        self.id
    }
    pub fn get_kind(&self) -> &ExprKind {
        &self.kind
    }
    pub fn get_type(&self) -> &ExprType {
        &self.ty
    }

    // ------- Leaves -------

    pub fn constant(value: Value, ty: ExprType) -> Self {
        Expr::new(ExprKind::Constant { value }, ty)
    }

    /// Constant whose static type is inferred from the value.
    pub fn value(value: Value) -> Self {
        let ty = type_of_value(&value);
        Expr::constant(value, ty)
    }

    pub fn int(v: i32) -> Self {
        Expr::value(Value::Int(v))
    }
    pub fn long(v: i64) -> Self {
        Expr::value(Value::Long(v))
    }
    pub fn double(v: f64) -> Self {
        Expr::value(Value::Double(v))
    }
    pub fn decimal(v: f64) -> Self {
        Expr::value(Value::Decimal(v))
    }
    pub fn string(v: impl Into<String>) -> Self {
        Expr::value(Value::Str(v.into()))
    }
    pub fn bool(v: bool) -> Self {
        Expr::value(Value::Bool(v))
    }
    pub fn char(v: char) -> Self {
        Expr::value(Value::Char(v))
    }
    pub fn null(ty: ExprType) -> Self {
        Expr::constant(Value::Null, ty)
    }

    /// Read of a captured local: a field of a constant holder object.
    pub fn captured(name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        let ty = type_of_value(&value);
        let mut fields = BTreeMap::new();
        fields.insert(name.clone(), value);
        Expr::closure(fields, name, ty)
    }

    /// Read of `field` off a holder carrying several captured locals.
    pub fn closure(holder: BTreeMap<String, Value>, field: impl Into<String>, ty: ExprType) -> Self {
        let holder = Expr::constant(Value::Object(holder), ExprType::object("<>c__DisplayClass"));
        holder.member(field, ty)
    }

    pub fn static_member(owner: impl Into<String>, member: impl Into<String>, ty: ExprType) -> Self {
        Expr::new(
            ExprKind::Member { target: MemberTarget::Static(owner.into()), member: member.into() },
            ty,
        )
    }

    // ------- Composite nodes -------

    pub fn member(self, member: impl Into<String>, ty: ExprType) -> Self {
        Expr::new(
            ExprKind::Member { target: MemberTarget::Instance(Box::new(self)), member: member.into() },
            ty,
        )
    }

    pub fn binary(op: BinaryKind, left: Expr, right: Expr) -> Self {
        let ty = match op {
            _ if op.is_comparison() => ExprType::Bool,
            BinaryKind::AndAlso | BinaryKind::OrElse => ExprType::Bool,
            BinaryKind::Coalesce => right.ty.clone(),
            BinaryKind::ArrayIndex => left.ty.element_type().cloned().unwrap_or(ExprType::object("Object")),
            _ => left.ty.clone(),
        };
        Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, ty)
    }

    pub fn eq(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::Equal, self, rhs)
    }
    pub fn ne(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::NotEqual, self, rhs)
    }
    pub fn gt(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::GreaterThan, self, rhs)
    }
    pub fn ge(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::GreaterThanOrEqual, self, rhs)
    }
    pub fn lt(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::LessThan, self, rhs)
    }
    pub fn le(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::LessThanOrEqual, self, rhs)
    }
    pub fn and_also(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::AndAlso, self, rhs)
    }
    pub fn or_else(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::OrElse, self, rhs)
    }
    pub fn add(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::Add, self, rhs)
    }
    pub fn sub(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::Subtract, self, rhs)
    }
    pub fn mul(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::Multiply, self, rhs)
    }
    pub fn div(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::Divide, self, rhs)
    }
    pub fn rem(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::Modulo, self, rhs)
    }
    pub fn bit_and(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::And, self, rhs)
    }
    pub fn bit_or(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::Or, self, rhs)
    }
    pub fn xor(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::ExclusiveOr, self, rhs)
    }
    pub fn coalesce(self, rhs: Expr) -> Self {
        Expr::binary(BinaryKind::Coalesce, self, rhs)
    }

    pub fn unary(op: UnaryKind, operand: Expr, ty: ExprType) -> Self {
        Expr::new(ExprKind::Unary { op, operand: Box::new(operand) }, ty)
    }

    /// Logical negation for boolean operands, bitwise complement otherwise.
    pub fn not(self) -> Self {
        let ty = self.ty.clone();
        Expr::unary(UnaryKind::Not, self, ty)
    }
    pub fn negate(self) -> Self {
        let ty = self.ty.clone();
        Expr::unary(UnaryKind::Negate, self, ty)
    }
    pub fn convert(self, ty: ExprType) -> Self {
        Expr::unary(UnaryKind::Convert, self, ty)
    }
    pub fn quote(self) -> Self {
        let ty = self.ty.clone();
        Expr::unary(UnaryKind::Quote, self, ty)
    }

    /// Instance method call; the declaring type is the receiver's type.
    pub fn call(self, name: impl Into<String>, args: Vec<Expr>, ty: ExprType) -> Self {
        let method = MethodRef::new(self.ty.underlying().to_string(), name);
        Expr::call_method(Some(self), method, args, ty)
    }

    pub fn static_call(owner: impl Into<String>, name: impl Into<String>, args: Vec<Expr>, ty: ExprType) -> Self {
        Expr::call_method(None, MethodRef::new(owner, name), args, ty)
    }

    /// Sequence extension method; the source sequence is `args[0]`.
    pub fn enumerable_call(name: impl Into<String>, args: Vec<Expr>, ty: ExprType) -> Self {
        Expr::call_method(None, MethodRef::enumerable(name), args, ty)
    }

    pub fn call_method(receiver: Option<Expr>, method: MethodRef, args: Vec<Expr>, ty: ExprType) -> Self {
        Expr::new(ExprKind::Call { receiver: receiver.map(Box::new), method, args }, ty)
    }

    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        let ty = if_true.ty.clone();
        Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            ty,
        )
    }

    pub fn new_object(ty: ExprType, args: Vec<Expr>) -> Self {
        Expr::new(ExprKind::New { args }, ty)
    }

    pub fn new_array(element: ExprType, elements: Vec<Expr>) -> Self {
        Expr::new(ExprKind::NewArray { elements }, ExprType::sequence(element))
    }

    /// A lambda node; its static type is taken from the body.
    pub fn lambda(params: Vec<Param>, body: Expr) -> Self {
        let ty = body.ty.clone();
        Expr::new(ExprKind::Lambda { params, body: Box::new(body) }, ty)
    }

    pub fn other(name: impl Into<String>, operands: Vec<Expr>, ty: ExprType) -> Self {
        Expr::new(ExprKind::Other { name: name.into(), operands }, ty)
    }

    /// True when no `Parameter` node occurs anywhere below this node.
    pub fn is_closed(&self) -> bool {
        match &self.kind {
            ExprKind::Parameter { .. } => false,
            ExprKind::Constant { .. } => true,
            ExprKind::Member { target, .. } => match target {
                MemberTarget::Instance(obj) => obj.is_closed(),
                MemberTarget::Static(_) => true,
            },
            ExprKind::Binary { left, right, .. } => left.is_closed() && right.is_closed(),
            ExprKind::Unary { operand, .. } => operand.is_closed(),
            ExprKind::Call { receiver, args, .. } => {
                receiver.as_ref().is_none_or(|r| r.is_closed()) && args.iter().all(Expr::is_closed)
            }
            ExprKind::Conditional { test, if_true, if_false } => {
                test.is_closed() && if_true.is_closed() && if_false.is_closed()
            }
            ExprKind::New { args } => args.iter().all(Expr::is_closed),
            ExprKind::NewArray { elements } => elements.iter().all(Expr::is_closed),
            ExprKind::Lambda { .. } => false,
            ExprKind::Other { operands, .. } => operands.iter().all(Expr::is_closed),
        }
    }
}

/// Static type a literal gets when no explicit type is supplied.
pub fn type_of_value(value: &Value) -> ExprType {
    match value {
        Value::Null => ExprType::object("Object"),
        Value::Bool(_) => ExprType::Bool,
        Value::Char(_) => ExprType::Char,
        Value::Int(_) => ExprType::Int32,
        Value::Long(_) => ExprType::Int64,
        Value::Float(_) => ExprType::Single,
        Value::Double(_) => ExprType::Double,
        Value::Decimal(_) => ExprType::Decimal,
        Value::Str(_) => ExprType::String,
        Value::DateTime(_) => ExprType::DateTime,
        Value::TimeSpan(_) => ExprType::TimeSpan,
        Value::Array(items) => ExprType::sequence(
            items.first().map(type_of_value).unwrap_or(ExprType::object("Object")),
        ),
        Value::Object(_) => ExprType::object("Object"),
    }
}

fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Source-like rendering, e.g. `c => (c.Age > 20)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Parameter { param } => write!(f, "{}", param.name),
            ExprKind::Member { target, member } => match target {
                MemberTarget::Instance(obj) => write!(f, "{}.{}", obj, member),
                MemberTarget::Static(owner) => write!(f, "{}.{}", owner, member),
            },
            ExprKind::Constant { value } => write!(f, "{}", value),
            ExprKind::Binary { op: BinaryKind::ArrayIndex, left, right } => write!(f, "{}[{}]", left, right),
            ExprKind::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            ExprKind::Unary { op, operand } => match op {
                UnaryKind::Not => write!(f, "Not({})", operand),
                UnaryKind::Negate => write!(f, "-{}", operand),
                UnaryKind::UnaryPlus => write!(f, "+{}", operand),
                UnaryKind::Convert => write!(f, "Convert({}, {})", operand, self.ty),
                UnaryKind::Quote => write!(f, "{}", operand),
                UnaryKind::ArrayLength => write!(f, "ArrayLength({})", operand),
                UnaryKind::TypeAs => write!(f, "({} As {})", operand, self.ty),
            },
            ExprKind::Call { receiver, method, args } => {
                if let Some(recv) = receiver {
                    write!(f, "{}.{}(", recv, method.name)?;
                    fmt_list(f, args)?;
                } else if method.is_collection_operation() && !args.is_empty() {
                    write!(f, "{}.{}(", args[0], method.name)?;
                    fmt_list(f, &args[1..])?;
                } else {
                    write!(f, "{}.{}(", method.declaring_type, method.name)?;
                    fmt_list(f, args)?;
                }
                write!(f, ")")
            }
            ExprKind::Conditional { test, if_true, if_false } => {
                write!(f, "IIF({}, {}, {})", test, if_true, if_false)
            }
            ExprKind::New { args } => {
                write!(f, "new {}(", self.ty)?;
                fmt_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::NewArray { elements } => {
                write!(f, "new [] {{")?;
                fmt_list(f, elements)?;
                write!(f, "}}")
            }
            ExprKind::Lambda { params, body } => {
                if params.len() == 1 {
                    write!(f, "{} => {}", params[0].name, body)
                } else {
                    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                    write!(f, "({}) => {}", names.join(", "), body)
                }
            }
            ExprKind::Other { name, operands } => {
                write!(f, "{}(", name)?;
                fmt_list(f, operands)?;
                write!(f, ")")
            }
        }
    }
}
