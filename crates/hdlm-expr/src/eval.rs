//! Tree-walking interpreter with integer-preserving arithmetic.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::{Error, Result, Value};

/// Evaluates parsed expressions against a variable context.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    context: &'a BTreeMap<String, Value>,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a BTreeMap<String, Value>) -> Self {
        Self { context }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => self
                .context
                .get(name)
                .cloned()
                .ok_or_else(|| Error::UnknownVariable { name: name.clone() }),
            Expr::Unary { op, operand } => unary(*op, self.eval(operand)?),
            Expr::Binary { op, left, right } => binary(*op, self.eval(left)?, self.eval(right)?),
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call { function, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>>>()?;
                function.call(&args)
            }
        }
    }
}

/// Numeric operand: booleans collapse to integers.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Real(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Int(i64::from(*b))),
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Real(r) => Some(Self::Real(*r)),
            Value::Str(_) => None,
        }
    }

    fn real(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Real(r) => r,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Real(_) => "float",
        Value::Str(_) => "str",
    }
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value> {
    let symbol = match op {
        UnaryOp::Neg => "unary -",
        UnaryOp::Pos => "unary +",
        UnaryOp::Invert => "unary ~",
    };
    let bad = || Error::UnaryOperandType {
        op: symbol,
        operand: type_name(&operand),
    };
    let num = Num::of(&operand).ok_or_else(bad)?;

    match (op, num) {
        (UnaryOp::Neg, Num::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or(Error::Overflow { op: symbol }),
        (UnaryOp::Neg, Num::Real(r)) => Ok(Value::Real(-r)),
        (UnaryOp::Pos, Num::Int(i)) => Ok(Value::Int(i)),
        (UnaryOp::Pos, Num::Real(r)) => Ok(Value::Real(r)),
        (UnaryOp::Invert, Num::Int(i)) => Ok(Value::Int(!i)),
        (UnaryOp::Invert, Num::Real(_)) => Err(bad()),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    if op.is_comparison() {
        return compare(op, &left, &right).map(Value::Bool);
    }

    if let (BinaryOp::Add, Value::Str(a), Value::Str(b)) = (op, &left, &right) {
        return Ok(Value::Str(format!("{a}{b}")));
    }

    let mismatch = || Error::OperandTypes {
        op: op.symbol(),
        left: type_name(&left),
        right: type_name(&right),
    };
    let (Some(a), Some(b)) = (Num::of(&left), Num::of(&right)) else {
        return Err(mismatch());
    };

    match op {
        BinaryOp::Add => arith(op, a, b, i64::checked_add, |x, y| x + y),
        BinaryOp::Sub => arith(op, a, b, i64::checked_sub, |x, y| x - y),
        BinaryOp::Mul => arith(op, a, b, i64::checked_mul, |x, y| x * y),
        BinaryOp::Div => {
            let divisor = b.real();
            if divisor == 0.0 {
                return Err(Error::DivisionByZero);
            }
            Ok(Value::Real(a.real() / divisor))
        }
        BinaryOp::FloorDiv => match (a, b) {
            (_, Num::Int(0)) => Err(Error::DivisionByZero),
            (Num::Int(x), Num::Int(y)) => floor_div(x, y).map(Value::Int),
            _ if b.real() == 0.0 => Err(Error::DivisionByZero),
            _ => Ok(Value::Real((a.real() / b.real()).floor())),
        },
        BinaryOp::Mod => match (a, b) {
            (_, Num::Int(0)) => Err(Error::DivisionByZero),
            (Num::Int(x), Num::Int(y)) => {
                let r = x.checked_rem(y).ok_or(Error::Overflow { op: "%" })?;
                Ok(Value::Int(if r != 0 && (r < 0) != (y < 0) { r + y } else { r }))
            }
            _ if b.real() == 0.0 => Err(Error::DivisionByZero),
            _ => {
                let (x, y) = (a.real(), b.real());
                let r = x % y;
                Ok(Value::Real(if r != 0.0 && (r < 0.0) != (y < 0.0) { r + y } else { r }))
            }
        },
        BinaryOp::Pow => power(a, b),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
            let (Num::Int(x), Num::Int(y)) = (a, b) else {
                return Err(mismatch());
            };
            bitwise(op, x, y).map(Value::Int)
        }
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::Eq
        | BinaryOp::Ne => compare(op, &left, &right).map(Value::Bool),
    }
}

fn arith(
    op: BinaryOp,
    a: Num,
    b: Num,
    int_op: fn(i64, i64) -> Option<i64>,
    real_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => int_op(x, y)
            .map(Value::Int)
            .ok_or(Error::Overflow { op: op.symbol() }),
        _ => Ok(Value::Real(real_op(a.real(), b.real()))),
    }
}

fn floor_div(x: i64, y: i64) -> Result<i64> {
    let q = x.checked_div(y).ok_or(Error::Overflow { op: "//" })?;
    if x % y != 0 && (x < 0) != (y < 0) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn power(base: Num, exp: Num) -> Result<Value> {
    match (base, exp) {
        (Num::Int(b), Num::Int(e)) if e >= 0 => {
            let overflow = Error::Overflow { op: "**" };
            match b {
                0 | 1 => Ok(Value::Int(if e == 0 { 1 } else { b })),
                -1 => Ok(Value::Int(if e % 2 == 0 { 1 } else { -1 })),
                _ => {
                    let e = u32::try_from(e).map_err(|_| overflow.clone())?;
                    b.checked_pow(e).map(Value::Int).ok_or(overflow)
                }
            }
        }
        _ => {
            let (b, e) = (base.real(), exp.real());
            if b == 0.0 && e < 0.0 {
                return Err(Error::DivisionByZero);
            }
            let result = b.powf(e);
            if result.is_nan() && !b.is_nan() && !e.is_nan() {
                return Err(Error::Domain { function: "**" });
            }
            Ok(Value::Real(result))
        }
    }
}

fn bitwise(op: BinaryOp, x: i64, y: i64) -> Result<i64> {
    match op {
        BinaryOp::BitAnd => Ok(x & y),
        BinaryOp::BitOr => Ok(x | y),
        BinaryOp::BitXor => Ok(x ^ y),
        BinaryOp::Shl | BinaryOp::Shr if y < 0 => Err(Error::InvalidArgument {
            function: op.symbol(),
            message: "negative shift count".into(),
        }),
        BinaryOp::Shl => {
            if x == 0 {
                return Ok(0);
            }
            let overflow = Error::Overflow { op: "<<" };
            let shift = u32::try_from(y).map_err(|_| overflow.clone())?;
            if shift >= 63 {
                return Err(overflow);
            }
            let shifted = x << shift;
            if shifted >> shift == x {
                Ok(shifted)
            } else {
                Err(overflow)
            }
        }
        _ => Ok(if y >= 64 {
            if x < 0 { -1 } else { 0 }
        } else {
            x >> y
        }),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool> {
    let ordering = match compare_values(left, right, op.symbol()) {
        Ok(ordering) => ordering,
        // Mixed string/number equality is simply false.
        Err(_) if matches!(op, BinaryOp::Eq) => return Ok(false),
        Err(_) if matches!(op, BinaryOp::Ne) => return Ok(true),
        Err(e) => return Err(e),
    };
    // Unordered (NaN) operands: only `!=` holds.
    let Some(ordering) = ordering else {
        return Ok(matches!(op, BinaryOp::Ne));
    };
    Ok(match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        BinaryOp::Eq => ordering == Ordering::Equal,
        _ => ordering != Ordering::Equal,
    })
}

/// Order two values: numbers numerically (exactly when both are integral),
/// strings lexically. `None` when a NaN makes the pair unordered.
pub(crate) fn compare_values(
    left: &Value,
    right: &Value,
    op: &'static str,
) -> Result<Option<Ordering>> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        _ => match (Num::of(left), Num::of(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => Ok(Some(a.cmp(&b))),
            (Some(a), Some(b)) => Ok(a.real().partial_cmp(&b.real())),
            _ => Err(Error::OperandTypes {
                op,
                left: type_name(left),
                right: type_name(right),
            }),
        },
    }
}
