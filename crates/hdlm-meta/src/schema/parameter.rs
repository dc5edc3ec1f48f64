//! Parameter and define definitions with inline configuration overlays.

use std::collections::BTreeMap;

use hdlm_expr::{Value, ValueKind};
use serde::Deserialize;

use super::scalar;

/// A named, typed tunable of the module.
///
/// Any field beyond the recognized ones is an inline configuration value:
/// `WIDTH = { default = 8, wide = 16 }` sets `WIDTH = 16` in configuration
/// `wide`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub default: Option<Value>,
    pub kind: ValueKind,
    pub description: Option<String>,
    /// Inclusive `[min, max]`.
    pub range: Option<(f64, f64)>,
    pub values: Option<Vec<Value>>,
    pub expr: Option<String>,
    pub env: Option<String>,
    pub overlays: BTreeMap<String, Value>,
}

/// A preprocessor define. Same shape as [`Parameter`] without constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Define {
    pub default: Option<Value>,
    pub kind: ValueKind,
    pub description: Option<String>,
    pub overlays: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    default: Option<toml::Value>,
    #[serde(rename = "type")]
    kind: Option<ValueKind>,
    description: Option<String>,
    range: Option<Vec<toml::Value>>,
    values: Option<Vec<toml::Value>>,
    expr: Option<String>,
    env: Option<String>,
    #[serde(flatten)]
    overlays: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawDefine {
    default: Option<toml::Value>,
    #[serde(rename = "type")]
    kind: Option<ValueKind>,
    description: Option<String>,
    #[serde(flatten)]
    overlays: BTreeMap<String, toml::Value>,
}

impl Parameter {
    /// Decode a `[parameters]` entry. A bare scalar is `{ default = <scalar> }`.
    pub fn from_toml(raw: &toml::Value) -> Result<Self, String> {
        let raw = match raw {
            toml::Value::Table(_) => raw
                .clone()
                .try_into::<RawParameter>()
                .map_err(|e| e.message().to_string())?,
            scalar_value => {
                return Ok(Self::with_default(scalar(scalar_value)?));
            }
        };

        let overlays = decode_overlays(&raw.overlays, raw.kind)?;
        let default = raw.default.as_ref().map(scalar).transpose()?;
        let kind = resolve_kind(raw.kind, default.as_ref(), &overlays);

        let default = match (raw.kind, default) {
            (Some(kind), Some(value)) => Some(coerce(&value, kind, "default")?),
            (_, default) => default,
        };

        let values = match raw.values {
            Some(list) => {
                let decoded = list.iter().map(scalar).collect::<Result<Vec<_>, _>>()?;
                Some(match raw.kind {
                    Some(kind) => decoded
                        .iter()
                        .map(|v| coerce(v, kind, "values"))
                        .collect::<Result<Vec<_>, _>>()?,
                    None => decoded,
                })
            }
            None => None,
        };

        let range = raw.range.as_deref().map(decode_range).transpose()?;

        Ok(Self {
            default,
            kind,
            description: raw.description,
            range,
            values,
            expr: raw.expr,
            env: raw.env,
            overlays,
        })
    }

    /// Parameter with only a default; the type follows the value.
    pub fn with_default(default: Value) -> Self {
        Self {
            kind: default.kind(),
            default: Some(default),
            description: None,
            range: None,
            values: None,
            expr: None,
            env: None,
            overlays: BTreeMap::new(),
        }
    }
}

impl Define {
    /// Decode a `[defines]` entry. A bare scalar is `{ default = <scalar> }`.
    pub fn from_toml(raw: &toml::Value) -> Result<Self, String> {
        let raw = match raw {
            toml::Value::Table(_) => raw
                .clone()
                .try_into::<RawDefine>()
                .map_err(|e| e.message().to_string())?,
            scalar_value => {
                let default = scalar(scalar_value)?;
                return Ok(Self {
                    kind: default.kind(),
                    default: Some(default),
                    description: None,
                    overlays: BTreeMap::new(),
                });
            }
        };

        let overlays = decode_overlays(&raw.overlays, raw.kind)?;
        let default = raw.default.as_ref().map(scalar).transpose()?;
        let kind = resolve_kind(raw.kind, default.as_ref(), &overlays);
        let default = match (raw.kind, default) {
            (Some(kind), Some(value)) => Some(coerce(&value, kind, "default")?),
            (_, default) => default,
        };

        Ok(Self {
            default,
            kind,
            description: raw.description,
            overlays,
        })
    }
}

/// Explicit type, else the default's type, else the first overlay's, else string.
fn resolve_kind(
    explicit: Option<ValueKind>,
    default: Option<&Value>,
    overlays: &BTreeMap<String, Value>,
) -> ValueKind {
    explicit
        .or_else(|| default.map(Value::kind))
        .or_else(|| overlays.values().next().map(Value::kind))
        .unwrap_or(ValueKind::String)
}

/// Overlay values follow the declared type exactly like the default does.
fn decode_overlays(
    raw: &BTreeMap<String, toml::Value>,
    kind: Option<ValueKind>,
) -> Result<BTreeMap<String, Value>, String> {
    raw.iter()
        .map(|(name, value)| {
            let value = scalar(value).and_then(|v| match kind {
                Some(kind) => coerce(&v, kind, "value"),
                None => Ok(v),
            });
            value
                .map(|v| (name.clone(), v))
                .map_err(|e| format!("inline configuration '{name}': {e}"))
        })
        .collect()
}

fn coerce(value: &Value, kind: ValueKind, field: &str) -> Result<Value, String> {
    value
        .coerce(kind)
        .ok_or_else(|| format!("{field} {value} is not a valid {kind}"))
}

fn decode_range(bounds: &[toml::Value]) -> Result<(f64, f64), String> {
    let numeric = |raw: &toml::Value| {
        scalar(raw)?
            .as_f64()
            .ok_or_else(|| "range bounds must be numbers".to_string())
    };
    match bounds {
        [min, max] => {
            let (min, max) = (numeric(min)?, numeric(max)?);
            if min > max {
                return Err(format!("range minimum {min} exceeds maximum {max}"));
            }
            Ok((min, max))
        }
        _ => Err(format!("range must be [min, max], found {} element(s)", bounds.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn param(src: &str) -> Result<Parameter, String> {
        let table: toml::Table = toml::from_str(&format!("p = {src}")).unwrap();
        Parameter::from_toml(&table["p"])
    }

    #[test]
    fn bare_scalar_is_a_default() {
        let p = param("8").unwrap();
        assert_eq!(p.default, Some(Value::Int(8)));
        assert_eq!(p.kind, ValueKind::Integer);
        assert!(p.overlays.is_empty());
    }

    #[test]
    fn extra_fields_become_overlays() {
        let p = param("{ default = 8, wide = 16, narrow = 4, description = \"bus\" }").unwrap();
        assert_eq!(
            p.overlays,
            BTreeMap::from([
                ("narrow".to_string(), Value::Int(4)),
                ("wide".to_string(), Value::Int(16)),
            ])
        );
        assert_eq!(p.description.as_deref(), Some("bus"));
    }

    #[test]
    fn explicit_type_coerces_default_and_values() {
        let p = param("{ type = \"real\", default = 1, values = [1, 2.5] }").unwrap();
        assert_eq!(p.default, Some(Value::Real(1.0)));
        assert_eq!(p.values, Some(vec![Value::Real(1.0), Value::Real(2.5)]));
    }

    #[test]
    fn explicit_type_coerces_overlays() {
        let p = param("{ type = \"integer\", default = 8, wide = \"16\", fast = true }").unwrap();
        assert_eq!(p.overlays["wide"], Value::Int(16));
        assert_eq!(p.overlays["fast"], Value::Int(1));

        let err = param("{ type = \"integer\", wide = \"sixteen\" }").unwrap_err();
        assert!(err.contains("inline configuration 'wide'"), "{err}");
        assert!(err.contains("not a valid integer"), "{err}");
    }

    #[test]
    fn define_overlays_follow_declared_type() {
        let table: toml::Table = toml::from_str("d = { type = \"string\", debug = 1 }").unwrap();
        let d = Define::from_toml(&table["d"]).unwrap();
        assert_eq!(d.overlays["debug"], Value::from("1"));
    }

    #[test]
    fn uncoercible_default_is_rejected() {
        let err = param("{ type = \"integer\", default = \"wide\" }").unwrap_err();
        assert!(err.contains("not a valid integer"), "{err}");
    }

    #[test]
    fn type_inferred_from_overlay_without_default() {
        let p = param("{ fast = true }").unwrap();
        assert_eq!(p.default, None);
        assert_eq!(p.kind, ValueKind::Boolean);
        assert_eq!(param("{ description = \"x\" }").unwrap().kind, ValueKind::String);
    }

    #[test]
    fn range_must_have_two_ordered_bounds() {
        assert_eq!(param("{ default = 4, range = [1, 64] }").unwrap().range, Some((1.0, 64.0)));
        assert!(param("{ default = 4, range = [1] }").is_err());
        assert!(param("{ default = 4, range = [9, 1] }").is_err());
    }

    #[test]
    fn non_scalar_overlay_is_rejected() {
        let err = param("{ default = 1, wide = [1, 2] }").unwrap_err();
        assert!(err.contains("inline configuration 'wide'"), "{err}");
    }
}
