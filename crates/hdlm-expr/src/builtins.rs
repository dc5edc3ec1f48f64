//! The closed table of functions callable from expressions.

use std::cmp::Ordering;

use crate::eval::compare_values;
use crate::value::real_to_int;
use crate::{Error, Result, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Log2,
    Log10,
    Log,
    Sqrt,
    Ceil,
    Floor,
    Min,
    Max,
    Abs,
    Int,
    Float,
    Round,
}

const TABLE: &[(&str, Builtin)] = &[
    ("log2", Builtin::Log2),
    ("log10", Builtin::Log10),
    ("log", Builtin::Log),
    ("sqrt", Builtin::Sqrt),
    ("ceil", Builtin::Ceil),
    ("floor", Builtin::Floor),
    ("min", Builtin::Min),
    ("max", Builtin::Max),
    ("abs", Builtin::Abs),
    ("int", Builtin::Int),
    ("float", Builtin::Float),
    ("round", Builtin::Round),
];

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        TABLE.iter().find(|(n, _)| *n == name).map(|(_, b)| *b)
    }

    pub fn name(&self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, b)| b == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    /// Names of every allowed function.
    pub fn names() -> impl Iterator<Item = &'static str> {
        TABLE.iter().map(|(n, _)| *n)
    }

    pub(crate) fn call(self, args: &[Value]) -> Result<Value> {
        let name = self.name();
        match self {
            Self::Log2 => {
                let x = positive(name, one_number(name, args)?)?;
                real_to_int(x.log2().trunc())
                    .map(Value::Int)
                    .ok_or(Error::Domain { function: name })
            }
            Self::Log10 => Ok(Value::Real(positive(name, one_number(name, args)?)?.log10())),
            Self::Log => match args {
                [x] => Ok(Value::Real(positive(name, number(name, x)?)?.ln())),
                [x, base] => {
                    let x = positive(name, number(name, x)?)?;
                    let base = positive(name, number(name, base)?)?;
                    if base == 1.0 {
                        return Err(Error::DivisionByZero);
                    }
                    Ok(Value::Real(x.ln() / base.ln()))
                }
                _ => Err(arity(name, "1 or 2", args.len())),
            },
            Self::Sqrt => {
                let x = one_number(name, args)?;
                if x < 0.0 {
                    return Err(Error::Domain { function: name });
                }
                Ok(Value::Real(x.sqrt()))
            }
            Self::Ceil | Self::Floor => match one_arg(name, args)? {
                Value::Int(i) => Ok(Value::Int(*i)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                other => {
                    let x = number(name, other)?;
                    let rounded = if self == Self::Ceil { x.ceil() } else { x.floor() };
                    to_int(name, rounded)
                }
            },
            Self::Min | Self::Max => {
                if args.len() < 2 {
                    return Err(arity(name, "at least 2", args.len()));
                }
                let wanted = if self == Self::Min { Ordering::Less } else { Ordering::Greater };
                let mut best = &args[0];
                for candidate in &args[1..] {
                    if compare_values(candidate, best, name)? == Some(wanted) {
                        best = candidate;
                    }
                }
                Ok(best.clone())
            }
            Self::Abs => match one_arg(name, args)? {
                Value::Int(i) => i
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or(Error::Overflow { op: "abs" }),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Real(r) => Ok(Value::Real(r.abs())),
                Value::Str(_) => Err(Error::UnaryOperandType {
                    op: "abs()",
                    operand: "string",
                }),
            },
            Self::Int => match one_arg(name, args)? {
                Value::Int(i) => Ok(Value::Int(*i)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Real(r) => to_int(name, r.trunc()),
                Value::Str(s) => s.trim().replace('_', "").parse::<i64>().map(Value::Int).map_err(|_| {
                    Error::InvalidArgument {
                        function: name,
                        message: format!("invalid literal '{s}'"),
                    }
                }),
            },
            Self::Float => match one_arg(name, args)? {
                Value::Str(s) => s.trim().parse::<f64>().map(Value::Real).map_err(|_| {
                    Error::InvalidArgument {
                        function: name,
                        message: format!("could not convert '{s}'"),
                    }
                }),
                other => Ok(Value::Real(number(name, other)?)),
            },
            Self::Round => round(args),
        }
    }
}

fn round(args: &[Value]) -> Result<Value> {
    let name = "round";
    match args {
        [Value::Int(i)] => Ok(Value::Int(*i)),
        [x] => to_int(name, number(name, x)?.round_ties_even()),
        [x, digits] => {
            let digits = match digits {
                Value::Int(d) => *d,
                Value::Bool(b) => i64::from(*b),
                _ => {
                    return Err(Error::InvalidArgument {
                        function: name,
                        message: "ndigits must be an integer".into(),
                    });
                }
            };
            let scale = 10f64.powi(digits.clamp(-308, 308) as i32);
            match x {
                Value::Int(i) if digits >= 0 => Ok(Value::Int(*i)),
                Value::Int(i) => to_int(name, (*i as f64 / scale).round_ties_even() * scale),
                other => {
                    let x = number(name, other)?;
                    Ok(Value::Real((x * scale).round_ties_even() / scale))
                }
            }
        }
        _ => Err(arity(name, "1 or 2", args.len())),
    }
}

fn arity(function: &'static str, expected: &'static str, got: usize) -> Error {
    Error::Arity {
        function,
        expected,
        got,
    }
}

fn one_arg<'a>(function: &'static str, args: &'a [Value]) -> Result<&'a Value> {
    match args {
        [x] => Ok(x),
        _ => Err(arity(function, "exactly 1", args.len())),
    }
}

fn one_number(function: &'static str, args: &[Value]) -> Result<f64> {
    number(function, one_arg(function, args)?)
}

fn number(function: &'static str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or(Error::InvalidArgument {
        function,
        message: "expected a number, got a string".into(),
    })
}

fn positive(function: &'static str, x: f64) -> Result<f64> {
    if x > 0.0 {
        Ok(x)
    } else {
        Err(Error::Domain { function })
    }
}

fn to_int(function: &'static str, x: f64) -> Result<Value> {
    if x.is_nan() {
        return Err(Error::InvalidArgument {
            function,
            message: "cannot convert NaN to integer".into(),
        });
    }
    real_to_int(x)
        .map(Value::Int)
        .ok_or(Error::Overflow { op: function })
}
