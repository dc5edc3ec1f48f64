//! Layered composition of parameter and define values.
//!
//! Layers, later wins per key:
//!
//! 1. module-level defaults
//! 2. the configuration's inheritance chain, root-most first
//! 3. the tool section's overrides
//! 4. environment bindings (`env = "VAR"`)
//! 5. caller overrides
//! 6. `expr` parameters, evaluated in dependency order
//!
//! The result is then validated against the parameter definitions.

use std::collections::BTreeMap;

use hdlm_expr::Value;
use hdlm_graph::DependencyGraph;
use hdlm_meta::{ModuleConfig, Parameter, ParameterValidator, Tool, ValidationIssue};
use serde::Serialize;

use crate::{Error, Result};

/// What to do with validation issues found after composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Log the issues and return them with the result.
    #[default]
    Warn,
    /// Fail composition if there are any issues.
    Strict,
}

/// Caller-supplied parameter and define values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub parameters: BTreeMap<String, Value>,
    pub defines: BTreeMap<String, Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn define(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defines.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.defines.is_empty()
    }

    /// Split `NAME=VALUE`, inferring the value's kind.
    pub fn parse_assignment(assignment: &str) -> Option<(String, Value)> {
        let (name, raw) = assignment.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), infer_value(raw.trim())))
    }
}

/// Integer, then real, then boolean, else the text itself.
fn infer_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(r) = raw.parse::<f64>()
        && r.is_finite()
    {
        return Value::Real(r);
    }
    match raw {
        "true" | "True" => Value::Bool(true),
        "false" | "False" => Value::Bool(false),
        _ => Value::Str(raw.to_string()),
    }
}

/// Final values for one (tool, configuration) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedConfig {
    pub configuration: String,
    pub tool: Tool,
    pub parameters: BTreeMap<String, Value>,
    pub defines: BTreeMap<String, Value>,
    /// Tool extras, with `tool` filled in from the tool's default program.
    pub tool_config: toml::Table,
    pub issues: Vec<ValidationIssue>,
}

type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

pub struct ConfigComposer<'a> {
    policy: ValidationPolicy,
    env: EnvLookup<'a>,
}

impl Default for ConfigComposer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigComposer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigComposer")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<'a> ConfigComposer<'a> {
    /// Composer reading environment bindings from the process environment.
    pub fn new() -> Self {
        Self {
            policy: ValidationPolicy::default(),
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the environment lookup used for `env` bindings.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        self.env = Box::new(lookup);
        self
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Compose values for `tool` under `configuration` (or the module's
    /// default configuration).
    pub fn compose(
        &self,
        config: &ModuleConfig,
        tool: Tool,
        configuration: Option<&str>,
        overrides: &Overrides,
    ) -> Result<ComposedConfig> {
        let name = config.effective_configuration(configuration).to_string();
        tracing::debug!(module = %config.name, %tool, configuration = %name, "composing");

        let mut parameters: BTreeMap<String, Value> = config
            .parameters
            .iter()
            .filter_map(|(k, p)| p.default.clone().map(|v| (k.clone(), v)))
            .collect();
        let mut defines: BTreeMap<String, Value> = config
            .defines
            .iter()
            .filter_map(|(k, d)| d.default.clone().map(|v| (k.clone(), v)))
            .collect();

        for layer in config.inheritance_chain(&name)? {
            parameters.extend(layer.parameters.clone());
            defines.extend(layer.defines.clone());
        }

        let section = config.tool_section(tool);
        if let Some(section) = section {
            parameters.extend(section.parameters.clone());
            defines.extend(section.defines.clone());
        }

        self.apply_env(&config.parameters, &mut parameters);

        parameters.extend(overrides.parameters.clone());
        defines.extend(overrides.defines.clone());

        evaluate_expressions(&config.parameters, &mut parameters);

        let mut issues = ParameterValidator::new().validate(&parameters, &config.parameters);
        for issue in &mut issues {
            issue.configuration = Some(name.clone());
        }
        if !issues.is_empty() {
            match self.policy {
                ValidationPolicy::Strict => {
                    return Err(Error::Validation {
                        configuration: name,
                        issues,
                    });
                }
                ValidationPolicy::Warn => {
                    for issue in &issues {
                        tracing::warn!(module = %config.name, %tool, "{issue}");
                    }
                }
            }
        }

        let mut tool_config = section.map(|s| s.extras.clone()).unwrap_or_default();
        if let Some(program) = section.map_or(tool.default_program(), |s| s.program(tool))
            && !tool_config.contains_key("tool")
        {
            tool_config.insert("tool".to_string(), toml::Value::String(program.to_string()));
        }

        Ok(ComposedConfig {
            configuration: name,
            tool,
            parameters,
            defines,
            tool_config,
            issues,
        })
    }

    fn apply_env(
        &self,
        definitions: &BTreeMap<String, Parameter>,
        parameters: &mut BTreeMap<String, Value>,
    ) {
        for (name, definition) in definitions {
            let Some(var) = &definition.env else {
                continue;
            };
            let Some(raw) = (self.env)(var) else {
                continue;
            };
            match Value::Str(raw.clone()).coerce(definition.kind) {
                Some(value) => {
                    tracing::debug!(parameter = %name, variable = %var, "parameter bound from environment");
                    parameters.insert(name.clone(), value);
                }
                None => tracing::warn!(
                    parameter = %name,
                    variable = %var,
                    value = %raw,
                    expected = %definition.kind,
                    "ignoring environment value that does not match the parameter type"
                ),
            }
        }
    }
}

/// Evaluate every `expr` parameter, dependencies first.
///
/// Expressions on a reference cycle are skipped; a failed evaluation keeps
/// the prior value.
fn evaluate_expressions(
    definitions: &BTreeMap<String, Parameter>,
    parameters: &mut BTreeMap<String, Value>,
) {
    let expressions: BTreeMap<&String, &str> = definitions
        .iter()
        .filter_map(|(name, p)| p.expr.as_deref().map(|e| (name, e)))
        .collect();
    if expressions.is_empty() {
        return;
    }

    let mut graph = DependencyGraph::new();
    for (name, expr) in &expressions {
        graph.add_node(name.as_str());
        let Ok(referenced) = hdlm_expr::identifiers(expr) else {
            continue;
        };
        for dependency in referenced.iter().filter(|r| expressions.contains_key(r)) {
            graph.add_edge(name, dependency);
        }
    }

    let (order, cycles) = graph.order_skipping_cycles();
    for cycle in &cycles {
        tracing::warn!(%cycle, "skipping parameter expressions that reference each other");
    }

    for name in order {
        let Some(expr) = expressions.get(&name) else {
            continue;
        };
        match hdlm_expr::evaluate(expr, parameters) {
            Ok(value) => {
                tracing::debug!(parameter = %name, expr = %expr, %value, "evaluated expression");
                parameters.insert(name, value);
            }
            Err(e) => tracing::warn!(parameter = %name, expr = %expr, error = %e, "failed to evaluate expression"),
        }
    }
}
