//! Parameter validation and description-file shape checks

use std::collections::BTreeMap;
use std::fmt;

use hdlm_expr::{Value, ValueKind};
use serde::Serialize;

use crate::schema::{ModuleConfig, Parameter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Type,
    Range,
    Values,
}

/// One value that does not satisfy its parameter definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Configuration the value came from, when checking declarations.
    pub configuration: Option<String>,
    pub parameter: String,
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.configuration {
            Some(cfg) => write!(f, "In configuration '{cfg}': {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Checks parameter values against type, range and allow-list constraints.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParameterValidator;

impl ParameterValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `values` against `definitions`. Values without a definition
    /// are not checked; a type failure skips the remaining checks for that
    /// parameter.
    pub fn validate(
        &self,
        values: &BTreeMap<String, Value>,
        definitions: &BTreeMap<String, Parameter>,
    ) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for (name, value) in values {
            let Some(definition) = definitions.get(name) else {
                continue;
            };

            if let Some(message) = type_error(name, value, definition.kind) {
                issues.push(issue(name, IssueKind::Type, message));
                continue;
            }

            if let Some((min, max)) = definition.range
                && let Some(x) = value.coerce(ValueKind::Real).as_ref().and_then(Value::as_f64)
                && (x < min || x > max)
            {
                issues.push(issue(
                    name,
                    IssueKind::Range,
                    format!("Parameter '{name}' value {value} is outside range [{min}, {max}]"),
                ));
            }

            if let Some(allowed) = &definition.values
                && !allowed.is_empty()
                && !allowed.iter().any(|a| loosely_equal(a, value))
            {
                issues.push(issue(
                    name,
                    IssueKind::Values,
                    format!(
                        "Parameter '{name}' value {value} not in allowed values: {}",
                        describe_allowed(allowed)
                    ),
                ));
            }
        }

        issues
    }
}

fn issue(name: &str, kind: IssueKind, message: String) -> ValidationIssue {
    ValidationIssue {
        configuration: None,
        parameter: name.to_string(),
        kind,
        message,
    }
}

fn type_error(name: &str, value: &Value, kind: ValueKind) -> Option<String> {
    let ok = match kind {
        ValueKind::String => matches!(value, Value::Str(_)),
        other => value.coerce(other).is_some(),
    };
    (!ok).then(|| format!("Parameter '{name}' must be {} {kind}, got {value}", article(kind)))
}

fn article(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Integer => "an",
        _ => "a",
    }
}

/// Equality with numeric cross-type comparison (`1 == 1.0 == true`).
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Str(_), _) | (_, Value::Str(_)) => false,
        _ => a.as_f64() == b.as_f64(),
    }
}

fn describe_allowed(allowed: &[Value]) -> String {
    if allowed.len() <= 5 {
        allowed.iter().map(Value::to_string).collect::<Vec<_>>().join(", ")
    } else {
        let head = allowed[..3].iter().map(Value::to_string).collect::<Vec<_>>().join(", ");
        format!("{head}, ... ({} values)", allowed.len())
    }
}

/// Check every configuration's declared parameter values against the
/// module's definitions.
pub fn check_module(config: &ModuleConfig) -> Vec<ValidationIssue> {
    let validator = ParameterValidator::new();
    let mut issues = Vec::new();

    for (name, cfg) in &config.configurations {
        for mut found in validator.validate(&cfg.parameters, &config.parameters) {
            found.configuration = Some(name.clone());
            issues.push(found);
        }
    }

    issues
}

/// Missing required fields of a raw description document.
pub(crate) fn missing_fields(doc: &toml::Table) -> Vec<String> {
    let Some(module) = doc.get("module").and_then(toml::Value::as_table) else {
        return vec!["[module]".to_string()];
    };

    let mut missing = Vec::new();
    for field in ["name", "top"] {
        let present = module
            .get(field)
            .and_then(toml::Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            missing.push(format!("module.{field}"));
        }
    }

    let has_sources = module
        .get("sources")
        .and_then(toml::Value::as_table)
        .is_some_and(|sources| {
            ["packages", "modules", "includes", "resources", "descriptions"]
                .iter()
                .any(|list| {
                    sources
                        .get(*list)
                        .and_then(toml::Value::as_array)
                        .is_some_and(|a| !a.is_empty())
                })
        });
    if !has_sources {
        missing.push("module.sources (at least one non-empty source list)".to_string());
    }

    missing
}

const TOP_LEVEL: &[&str] = &["module", "parameters", "defines", "configurations", "tools", "hdlm"];
const MODULE_KEYS: &[&str] = &[
    "name",
    "top",
    "type",
    "description",
    "default_configuration",
    "sources",
    "dependencies",
];
const SOURCE_KEYS: &[&str] = &["packages", "modules", "includes", "resources", "descriptions"];
const TOOL_KEYS: &[&str] = &["simulation", "lint", "synthesis"];

/// Common misspellings and their canonical section.
const ALIASES: &[(&str, &str)] = &[
    ("params", "parameters"),
    ("param", "parameters"),
    ("parameter", "parameters"),
    ("define", "defines"),
    ("configs", "configurations"),
    ("config", "configurations"),
    ("configuration", "configurations"),
    ("tool", "tools"),
    ("src", "sources"),
    ("srcs", "sources"),
    ("source", "sources"),
    ("files", "modules"),
    ("sim", "simulation"),
    ("synth", "synthesis"),
    ("deps", "dependencies"),
    ("dependency", "dependencies"),
];

/// Match `key` against `known` by case, singular/plural or alias.
fn suggest(key: &str, known: &[&'static str]) -> Option<&'static str> {
    let lower = key.to_lowercase();
    known
        .iter()
        .copied()
        .find(|k| {
            *k == lower
                || k.strip_suffix('s') == Some(lower.as_str())
                || lower.strip_suffix('s') == Some(*k)
        })
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == lower)
                .map(|(_, target)| *target)
                .filter(|target| known.contains(target))
        })
}

/// Heuristic hints about sections that look misnamed or misplaced.
pub(crate) fn schema_hints(doc: &toml::Table) -> Vec<String> {
    let mut hints = Vec::new();

    for key in doc.keys().filter(|k| !TOP_LEVEL.contains(&k.as_str())) {
        if MODULE_KEYS.contains(&key.as_str()) {
            hints.push(format!("'{key}' belongs under [module]"));
        } else if let Some(target) = suggest(key, TOP_LEVEL) {
            hints.push(format!("found [{key}], did you mean [{target}]?"));
        } else if let Some(target) = suggest(key, MODULE_KEYS) {
            hints.push(format!("found [{key}], did you mean [module.{target}]?"));
        }
    }

    let Some(module) = doc.get("module").and_then(toml::Value::as_table) else {
        return hints;
    };
    for key in module.keys().filter(|k| !MODULE_KEYS.contains(&k.as_str())) {
        if let Some(target) = suggest(key, MODULE_KEYS) {
            hints.push(format!("found module.{key}, did you mean module.{target}?"));
        } else if SOURCE_KEYS.contains(&key.as_str()) {
            hints.push(format!("'{key}' belongs under [module.sources]"));
        } else if TOP_LEVEL.contains(&key.as_str()) {
            hints.push(format!("[module.{key}] should be a top-level [{key}] table"));
        }
    }

    if let Some(sources) = module.get("sources").and_then(toml::Value::as_table) {
        for key in sources.keys().filter(|k| !SOURCE_KEYS.contains(&k.as_str())) {
            if let Some(target) = suggest(key, SOURCE_KEYS) {
                hints.push(format!("found module.sources.{key}, did you mean module.sources.{target}?"));
            }
        }
    }

    if let Some(tools) = doc.get("tools").and_then(toml::Value::as_table) {
        for key in tools.keys().filter(|k| !TOOL_KEYS.contains(&k.as_str())) {
            if let Some(target) = suggest(key, TOOL_KEYS) {
                hints.push(format!("found tools.{key}, did you mean tools.{target}?"));
            }
        }
    }

    hints
}
