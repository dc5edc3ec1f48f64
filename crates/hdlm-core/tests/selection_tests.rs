//! Tool allow-lists and "all" expansion.

use std::sync::Arc;

use hdlm_core::{Error, expand_configurations, validate_tool_configuration};
use hdlm_meta::{DescriptionLoader, ModuleConfig, Tool};
use hdlm_test_utils::{TestWorkspace, description};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn module(configurations: &[&str], allowed: &str) -> (TestWorkspace, Arc<ModuleConfig>) {
    let mut extra = String::new();
    for name in configurations {
        extra.push_str(&format!("[configurations.{name}]\n"));
    }
    extra.push_str(&format!("\n[tools.simulation]\nconfigurations = {allowed}\n"));

    let ws = TestWorkspace::new();
    ws.write("m.toml", &description("m", "m", &extra));
    let config = DescriptionLoader::for_workspace(ws.layout()).load("m.toml").unwrap();
    (ws, config)
}

#[test]
fn test_all_with_only_allowed_configurations_succeeds() {
    let (_ws, config) = module(&["fast", "slow"], r#"["fast", "slow"]"#);
    validate_tool_configuration(&config, "all", config.simulation.as_ref(), Tool::Simulation).unwrap();
}

#[test]
fn test_all_with_undeclared_extra_configuration_fails() {
    let (_ws, config) = module(&["fast", "slow", "debug"], r#"["fast", "slow"]"#);
    let err = validate_tool_configuration(&config, "all", config.simulation.as_ref(), Tool::Simulation)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedConfiguration { ref name, .. } if name == "debug"));
    assert_eq!(
        err.to_string(),
        "Configuration 'debug' not supported by simulation tool. Tool supports: fast, slow"
    );
}

#[rstest]
#[case("fast", true)]
#[case("debug", false)]
fn test_single_name_against_allow_list(#[case] name: &str, #[case] ok: bool) {
    let (_ws, config) = module(&["fast", "slow", "debug"], r#"["fast", "slow"]"#);
    let result = validate_tool_configuration(&config, name, config.simulation.as_ref(), Tool::Simulation);
    assert_eq!(result.is_ok(), ok);
}

#[test]
fn test_unknown_name_is_not_found() {
    let (_ws, config) = module(&["fast"], r#"["all"]"#);
    let err = validate_tool_configuration(&config, "nope", config.simulation.as_ref(), Tool::Simulation)
        .unwrap_err();
    assert!(err.to_string().starts_with("Configuration 'nope' not found. Available:"));
}

#[test]
fn test_unrestricted_section_allows_everything() {
    let (_ws, config) = module(&["fast", "debug"], r#"["all"]"#);
    for name in ["fast", "debug", "default", "all"] {
        validate_tool_configuration(&config, name, config.simulation.as_ref(), Tool::Simulation).unwrap();
    }
    validate_tool_configuration(&config, "debug", None, Tool::Lint).unwrap();
}

#[test]
fn test_expand_all_uses_allow_list_when_restricted() {
    let (_ws, config) = module(&["fast", "slow"], r#"["slow", "fast"]"#);
    let expanded = expand_configurations(&config, &["all".to_string()], Tool::Simulation).unwrap();
    assert_eq!(expanded, vec!["slow", "fast"]);
}

#[test]
fn test_expand_all_unrestricted_lists_every_configuration() {
    let (_ws, config) = module(&["fast", "slow"], "[]");
    let names = ["fast".to_string(), "all".to_string()];
    let expanded = expand_configurations(&config, &names, Tool::Simulation).unwrap();
    assert_eq!(expanded, vec!["fast", "default", "slow"]);
}

#[test]
fn test_expand_nothing_means_default() {
    let (_ws, config) = module(&["fast"], "[]");
    let expanded = expand_configurations(&config, &[], Tool::Simulation).unwrap();
    assert_eq!(expanded, vec!["default"]);
}
