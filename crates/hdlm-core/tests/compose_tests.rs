//! Composition layering, expressions and validation policy.

use std::collections::BTreeMap;
use std::sync::Arc;

use hdlm_core::{ConfigComposer, Error, Overrides, ValidationPolicy};
use hdlm_expr::Value;
use hdlm_meta::{DescriptionLoader, ModuleConfig, Tool};
use hdlm_test_utils::{TestWorkspace, description};
use pretty_assertions::assert_eq;

fn load(extra: &str) -> (TestWorkspace, Arc<ModuleConfig>) {
    let ws = TestWorkspace::new();
    ws.write("core.toml", &description("core", "core", extra));
    let config = DescriptionLoader::for_workspace(ws.layout())
        .load("core.toml")
        .unwrap();
    (ws, config)
}

fn no_env() -> ConfigComposer<'static> {
    ConfigComposer::new().with_env(|_| None)
}

const CHAIN: &str = r#"
[parameters]
A = 1
B = 1
C = 1
D = 1

[configurations.p2]
parameters = { A = 2, B = 2 }

[configurations.p1]
inherit = "p2"
parameters = { B = 3, C = 3 }

[configurations.c]
inherit = "p1"
parameters = { C = 4 }
"#;

#[test]
fn test_inheritance_chain_nearest_override_wins() {
    let (_ws, config) = load(CHAIN);
    let composed = no_env()
        .compose(&config, Tool::Simulation, Some("c"), &Overrides::new())
        .unwrap();

    let expected: BTreeMap<String, Value> = [("A", 2), ("B", 3), ("C", 4), ("D", 1)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::Int(v)))
        .collect();
    assert_eq!(composed.parameters, expected);
    assert_eq!(composed.configuration, "c");
}

#[test]
fn test_no_configuration_uses_default_alias() {
    let (_ws, config) = load(
        r#"
[parameters]
WIDTH = 8

[configurations.wide]
parameters = { WIDTH = 64 }
"#,
    );
    let composed = no_env()
        .compose(&config, Tool::Lint, None, &Overrides::new())
        .unwrap();
    assert_eq!(composed.configuration, "default");
    assert_eq!(composed.parameters["WIDTH"], Value::Int(8));

    let ws = TestWorkspace::new();
    ws.write(
        "aliased.toml",
        "[module]\nname = \"a\"\ntop = \"a\"\ndefault_configuration = \"wide\"\nsources = { modules = [\"a.sv\"] }\n\n[parameters]\nWIDTH = 8\n\n[configurations.wide]\nparameters = { WIDTH = 64 }\n",
    );
    let aliased = DescriptionLoader::for_workspace(ws.layout()).load("aliased.toml").unwrap();
    let composed = no_env()
        .compose(&aliased, Tool::Lint, None, &Overrides::new())
        .unwrap();
    assert_eq!(composed.configuration, "wide");
    assert_eq!(composed.parameters["WIDTH"], Value::Int(64));
}

#[test]
fn test_unknown_configuration_lists_available() {
    let (_ws, config) = load(CHAIN);
    let err = no_env()
        .compose(&config, Tool::Simulation, Some("turbo"), &Overrides::new())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration 'turbo' not found. Available: c, default, p1, p2"
    );
}

#[test]
fn test_layers_apply_in_order() {
    let (_ws, config) = load(
        r#"
[parameters]
WIDTH = 8
DEPTH = 16
SEED = { default = 1, env = "HDLM_TEST_SEED" }

[defines]
TRACE = false

[configurations.big]
parameters = { WIDTH = 32, DEPTH = 64 }

[tools.synthesis]
parameters = { DEPTH = 128 }
defines = { TRACE = true }
strategy = "area"
"#,
    );
    let composer = ConfigComposer::new().with_env(|var| (var == "HDLM_TEST_SEED").then(|| "42".to_string()));
    let overrides = Overrides::new().parameter("WIDTH", 48_i64);

    let composed = composer
        .compose(&config, Tool::Synthesis, Some("big"), &overrides)
        .unwrap();

    assert_eq!(composed.parameters["WIDTH"], Value::Int(48));
    assert_eq!(composed.parameters["DEPTH"], Value::Int(128));
    assert_eq!(composed.parameters["SEED"], Value::Int(42));
    assert_eq!(composed.defines["TRACE"], Value::Bool(true));
    assert_eq!(composed.tool_config["strategy"].as_str(), Some("area"));
    assert_eq!(composed.tool_config["tool"].as_str(), Some("vivado"));
}

#[test]
fn test_env_value_of_wrong_type_is_ignored() {
    let (_ws, config) = load("[parameters]\nSEED = { default = 1, env = \"SEED\" }\n");
    let composer = ConfigComposer::new().with_env(|_| Some("not-a-number".to_string()));
    let composed = composer
        .compose(&config, Tool::Simulation, None, &Overrides::new())
        .unwrap();
    assert_eq!(composed.parameters["SEED"], Value::Int(1));
}

#[test]
fn test_expressions_follow_dependencies() {
    let (_ws, config) = load(
        r#"
[parameters]
DEPTH = 256
# declared before the parameter it depends on
ADDR_PLUS_ONE = { default = 0, expr = "ADDR_BITS + 1" }
ADDR_BITS = { default = 0, expr = "log2(DEPTH)" }
"#,
    );
    let composed = no_env()
        .compose(&config, Tool::Simulation, None, &Overrides::new().parameter("DEPTH", 1024_i64))
        .unwrap();
    assert_eq!(composed.parameters["ADDR_BITS"], Value::Int(10));
    assert_eq!(composed.parameters["ADDR_PLUS_ONE"], Value::Int(11));
}

#[test]
fn test_expression_cycles_and_failures_keep_prior_values() {
    let (_ws, config) = load(
        r#"
[parameters]
X = { default = 1, expr = "Y + 1" }
Y = { default = 2, expr = "X + 1" }
Z = { default = 3, expr = "missing * 2" }
W = { default = 0, expr = "Z + 1" }
"#,
    );
    let composed = no_env()
        .compose(&config, Tool::Simulation, None, &Overrides::new())
        .unwrap();
    assert_eq!(composed.parameters["X"], Value::Int(1));
    assert_eq!(composed.parameters["Y"], Value::Int(2));
    assert_eq!(composed.parameters["Z"], Value::Int(3));
    assert_eq!(composed.parameters["W"], Value::Int(4));
}

#[test]
fn test_expressions_inside_a_reference_cycle_are_all_skipped() {
    // A <-> B, and C sits on A -> C -> B -> A without being on the first cycle found.
    let (_ws, config) = load(
        r#"
[parameters]
A = { default = 1, expr = "B + C" }
B = { default = 2, expr = "A" }
C = { default = 3, expr = "B * 10" }
D = { default = 0, expr = "C + 1" }
"#,
    );
    let composed = no_env()
        .compose(&config, Tool::Simulation, None, &Overrides::new())
        .unwrap();

    let values: Vec<(&str, &Value)> = ["A", "B", "C", "D"]
        .iter()
        .map(|name| (*name, &composed.parameters[*name]))
        .collect();
    assert_eq!(
        values,
        vec![
            ("A", &Value::Int(1)),
            ("B", &Value::Int(2)),
            ("C", &Value::Int(3)),
            ("D", &Value::Int(4)),
        ]
    );
}

#[test]
fn test_inline_overlay_takes_declared_type() {
    let (_ws, config) = load(
        r#"
[parameters]
WIDTH = { type = "integer", default = 8, wide = "16" }
"#,
    );
    let composed = no_env()
        .compose(&config, Tool::Simulation, Some("wide"), &Overrides::new())
        .unwrap();
    assert_eq!(composed.parameters["WIDTH"], Value::Int(16));
}

const RANGED: &str = r#"
[parameters]
WIDTH = { default = 8, range = [1, 64] }
MODE = { default = "fifo", values = ["fifo", "lifo"] }
"#;

#[test]
fn test_warn_policy_returns_issues() {
    let (_ws, config) = load(RANGED);
    let overrides = Overrides::new().parameter("WIDTH", 128_i64).parameter("MODE", "ring");
    let composed = no_env()
        .compose(&config, Tool::Simulation, None, &overrides)
        .unwrap();

    assert_eq!(composed.issues.len(), 2);
    assert!(composed.issues.iter().all(|i| i.configuration.as_deref() == Some("default")));
    assert_eq!(composed.parameters["WIDTH"], Value::Int(128));
}

#[test]
fn test_strict_policy_fails_with_every_issue() {
    let (_ws, config) = load(RANGED);
    let overrides = Overrides::new().parameter("WIDTH", 0_i64).parameter("MODE", "ring");
    let err = no_env()
        .with_policy(ValidationPolicy::Strict)
        .compose(&config, Tool::Simulation, None, &overrides)
        .unwrap_err();

    match err {
        Error::Validation { configuration, issues } => {
            assert_eq!(configuration, "default");
            assert_eq!(issues.len(), 2);
        }
        other => panic!("expected validation failure, got {other}"),
    }
}

#[test]
fn test_tool_without_section_uses_default_program() {
    let (_ws, config) = load("");
    let lint = no_env()
        .compose(&config, Tool::Lint, None, &Overrides::new())
        .unwrap();
    assert_eq!(lint.tool_config["tool"].as_str(), Some("verilator"));

    let sim = no_env()
        .compose(&config, Tool::Simulation, None, &Overrides::new())
        .unwrap();
    assert!(sim.tool_config.is_empty());
}
