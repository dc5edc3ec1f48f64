//! Scalar values shared by descriptions, overrides and expressions

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar parameter or define value.
///
/// Deserializes from any TOML/JSON scalar; booleans are tried before
/// integers so `true` never becomes `1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "float")]
    Real,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "str")]
    String,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Boolean,
            Self::Int(_) => ValueKind::Integer,
            Self::Real(_) => ValueKind::Real,
            Self::Str(_) => ValueKind::String,
        }
    }

    /// Zero, an empty string and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Real(r) => *r != 0.0,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric view; booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            Self::Str(_) => None,
        }
    }

    /// Convert to `kind`, or `None` when the value has no sensible
    /// representation of that type.
    ///
    /// - integer: integers, booleans (0/1), reals truncated toward zero,
    ///   numeric strings
    /// - real: integers, booleans, reals, numeric strings
    /// - boolean: booleans, `0`/`1`, `true`/`false`/`True`/`False`
    /// - string: any scalar, rendered as text
    pub fn coerce(&self, kind: ValueKind) -> Option<Value> {
        match kind {
            ValueKind::Integer => match self {
                Self::Int(i) => Some(Self::Int(*i)),
                Self::Bool(b) => Some(Self::Int(i64::from(*b))),
                Self::Real(r) => real_to_int(r.trunc()).map(Self::Int),
                Self::Str(s) => parse_int(s.trim()).map(Self::Int),
            },
            ValueKind::Real => match self {
                Self::Str(s) => s.trim().parse::<f64>().ok().map(Self::Real),
                other => other.as_f64().map(Self::Real),
            },
            ValueKind::Boolean => match self {
                Self::Bool(b) => Some(Self::Bool(*b)),
                Self::Int(0) => Some(Self::Bool(false)),
                Self::Int(1) => Some(Self::Bool(true)),
                Self::Str(s) => match s.as_str() {
                    "true" | "True" => Some(Self::Bool(true)),
                    "false" | "False" => Some(Self::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ValueKind::String => Some(Self::Str(self.to_string())),
        }
    }

    /// Render as an expression literal: strings quoted, negatives
    /// parenthesized, booleans as `0`/`1`.
    pub fn to_literal(&self) -> String {
        match self {
            Self::Bool(b) => i64::from(*b).to_string(),
            Self::Int(i) if *i < 0 => format!("({i})"),
            Self::Int(i) => i.to_string(),
            Self::Real(r) if r.is_nan() => "float('nan')".to_string(),
            Self::Real(r) if r.is_infinite() && *r < 0.0 => "(float('-inf'))".to_string(),
            Self::Real(r) if r.is_infinite() => "float('inf')".to_string(),
            Self::Real(r) if r.is_sign_negative() && *r != 0.0 => format!("({r:?})"),
            Self::Real(r) => format!("{r:?}"),
            Self::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        }
    }
}

pub(crate) fn real_to_int(r: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    if r.is_finite() && r >= i64::MIN as f64 && r < i64::MAX as f64 {
        Some(r as i64)
    } else {
        None
    }
}

fn parse_int(s: &str) -> Option<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let r = s.parse::<f64>().ok()?;
    if r.fract() == 0.0 { real_to_int(r) } else { None }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r:?}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Int(3), ValueKind::Integer, Some(Value::Int(3)))]
    #[case(Value::Bool(true), ValueKind::Integer, Some(Value::Int(1)))]
    #[case(Value::Real(-2.9), ValueKind::Integer, Some(Value::Int(-2)))]
    #[case(Value::from(" 42 "), ValueKind::Integer, Some(Value::Int(42)))]
    #[case(Value::from("4.5"), ValueKind::Integer, None)]
    #[case(Value::from("wide"), ValueKind::Integer, None)]
    #[case(Value::Int(2), ValueKind::Real, Some(Value::Real(2.0)))]
    #[case(Value::from("1e3"), ValueKind::Real, Some(Value::Real(1000.0)))]
    #[case(Value::Int(1), ValueKind::Boolean, Some(Value::Bool(true)))]
    #[case(Value::Int(2), ValueKind::Boolean, None)]
    #[case(Value::from("False"), ValueKind::Boolean, Some(Value::Bool(false)))]
    #[case(Value::from("yes"), ValueKind::Boolean, None)]
    #[case(Value::Real(1.5), ValueKind::String, Some(Value::from("1.5")))]
    #[case(Value::Int(8), ValueKind::String, Some(Value::from("8")))]
    fn coercion(#[case] value: Value, #[case] kind: ValueKind, #[case] expected: Option<Value>) {
        assert_eq!(value.coerce(kind), expected);
    }

    #[rstest]
    #[case(Value::Int(-4), "(-4)")]
    #[case(Value::Bool(true), "1")]
    #[case(Value::from("it's"), r"'it\'s'")]
    #[case(Value::Real(2.0), "2.0")]
    #[case(Value::Real(-0.5), "(-0.5)")]
    fn literals(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_literal(), expected);
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::Real(0.0).is_truthy());
        assert!(Value::from("0").is_truthy());
    }
}
