//! End-to-end workflows across crates: libraries are declared and fetched,
//! a description referencing them is loaded, and build plans are composed.

use std::collections::BTreeMap;
use std::path::Path;

use hdlm_core::{ConfigComposer, Overrides, Planner, SourceResolver, ValidationPolicy};
use hdlm_expr::Value;
use hdlm_libs::{
    DependencyResolver, LibraryManager, LibrarySpec, ManifestEditor, ResolveMode, VersionSelector,
};
use hdlm_meta::{DescriptionLoader, Tool};
use hdlm_test_utils::{FixtureRepo, TestWorkspace};
use pretty_assertions::assert_eq;

const SOC: &str = r#"
[module]
name = "soc"
top = "soc_top"
default_configuration = "fast"

[module.sources]
packages = ["@axi/rtl/axi_pkg.sv"]
modules = ["rtl/soc_top.sv", "@axi/rtl/axi_xbar.sv"]
includes = ["rtl/include/soc_defs.svh"]
descriptions = ["periph/uart.toml"]

[parameters]
CLK_MHZ = { default = 100, fast = 250, range = [1, 500], env = "SOC_CLK_MHZ" }
MASTERS = 2
ID_BITS = { default = 0, expr = "log2(MASTERS) + 1" }

[defines]
TRACE = { default = false, debug = true }

[configurations.fast]
description = "High clock"

[configurations.debug]
inherit = "fast"
parameters = { MASTERS = 4 }

[tools.lint]
tool = "verible"
configurations = ["fast", "debug"]

[tools.synthesis]
part = "xc7a100t"
configurations = ["fast"]
"#;

const UART: &str = r#"
[module]
name = "uart"
top = "uart_top"

[module.sources]
modules = ["uart.sv"]
"#;

/// A library remote at `path` with `files`, optionally carrying a nested
/// manifest for its own dependencies, tagged `v1`.
fn remote(path: &Path, files: &[&str], deps: &[(&str, &FixtureRepo)]) -> FixtureRepo {
    let repo = FixtureRepo::with_commit(path);
    for file in files {
        repo.commit_file(file, "// library source\n", file);
    }
    if !deps.is_empty() {
        let manifest = path.join(".hdlm/libraries.toml");
        let mut editor = ManifestEditor::open(&manifest).unwrap();
        for (name, dep) in deps {
            editor
                .add(name, &LibrarySpec::new(dep.url(), VersionSelector::Tag("v1".into())))
                .unwrap();
        }
        repo.commit_file(".hdlm/libraries.toml", &editor.to_toml_string(), "deps");
    }
    repo.tag("v1");
    repo
}

/// Workspace with `axi` declared; `axi` itself depends on `common`.
fn soc_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    let common = remote(&ws.scratch("common"), &["include/common_defs.svh"], &[]);
    let axi = remote(
        &ws.scratch("axi"),
        &["rtl/axi_pkg.sv", "rtl/axi_xbar.sv", "include/axi_defs.svh"],
        &[("common", &common)],
    );

    LibraryManager::new(ws.layout().clone())
        .add(&axi.url(), VersionSelector::Tag("v1".into()), None)
        .unwrap();

    ws.touch(&["rtl/soc_top.sv", "rtl/include/soc_defs.svh", "periph/uart.sv"]);
    ws.write("periph/uart.toml", UART);
    ws.write("soc.toml", SOC);
    ws
}

fn planner(ws: &TestWorkspace, policy: ValidationPolicy) -> Planner<'static> {
    Planner::new(
        ConfigComposer::new().with_policy(policy).with_env(|_| None),
        SourceResolver::for_workspace(ws.layout()),
    )
}

fn names(values: &[impl AsRef<str>]) -> Vec<String> {
    values.iter().map(|v| v.as_ref().to_string()).collect()
}

#[test]
fn test_resolve_fetches_transitive_libraries() {
    let ws = soc_workspace();
    let manager = LibraryManager::new(ws.layout().clone());

    let resolved = DependencyResolver::new(&manager)
        .with_mode(ResolveMode::FetchMissing)
        .resolve_all()
        .unwrap();

    let order: Vec<&str> = resolved.iter().map(|l| l.name()).collect();
    assert_eq!(order, vec!["common", "axi"]);
    assert!(resolved.iter().all(|l| l.is_installed()));
    ws.assert_file_exists(".hdlm/libs/common/include/common_defs.svh");
    ws.assert_file_exists(".hdlm/libs/axi/rtl/axi_xbar.sv");
}

#[test]
fn test_plan_before_install_reports_missing_library_sources() {
    let ws = soc_workspace();
    let config = DescriptionLoader::for_workspace(ws.layout()).load("soc.toml").unwrap();

    let plans = planner(&ws, ValidationPolicy::Warn)
        .plan(&config, Tool::Lint, &[], &Overrides::new())
        .unwrap();

    assert_eq!(plans.len(), 1);
    assert_eq!(
        plans[0].missing_sources,
        names(&["@axi/rtl/axi_pkg.sv", "@axi/rtl/axi_xbar.sv"])
    );
    assert_eq!(plans[0].sources.len(), 2);
}

#[test]
fn test_plan_after_install_orders_sources_and_include_dirs() {
    let ws = soc_workspace();
    let manager = LibraryManager::new(ws.layout().clone());
    assert!(manager.install_all().unwrap().is_success());

    let config = DescriptionLoader::for_workspace(ws.layout()).load("soc.toml").unwrap();
    let plans = planner(&ws, ValidationPolicy::Warn)
        .plan(&config, Tool::Lint, &names(&["debug"]), &Overrides::new())
        .unwrap();
    let plan = &plans[0];

    let libs = ws.layout().libs_dir();
    let root = ws.root();
    assert_eq!(
        plan.sources,
        vec![
            root.join("periph/uart.sv"),
            libs.join("axi/rtl/axi_pkg.sv"),
            root.join("rtl/soc_top.sv"),
            libs.join("axi/rtl/axi_xbar.sv"),
        ]
    );
    assert!(plan.missing_sources.is_empty());
    assert!(plan.include_dirs.contains(&root.join("rtl/include")));
    assert!(plan.include_dirs.contains(&libs.join("axi/include")));
    assert!(plan.include_dirs.contains(&libs.join("axi/rtl")));
}

#[test]
fn test_plan_composes_configuration_layers() {
    let ws = soc_workspace();
    let config = DescriptionLoader::for_workspace(ws.layout()).load("soc.toml").unwrap();

    let plans = planner(&ws, ValidationPolicy::Warn)
        .plan(&config, Tool::Lint, &names(&["all"]), &Overrides::new().parameter("MASTERS", 8_i64))
        .unwrap();

    let summary: Vec<(String, BTreeMap<String, Value>)> = plans
        .iter()
        .map(|p| (p.configuration.clone(), p.parameters.clone()))
        .collect();
    let expected_params = BTreeMap::from([
        ("CLK_MHZ".to_string(), Value::Int(250)),
        ("ID_BITS".to_string(), Value::Int(4)),
        ("MASTERS".to_string(), Value::Int(8)),
    ]);
    assert_eq!(
        summary,
        vec![
            ("fast".to_string(), expected_params.clone()),
            ("debug".to_string(), expected_params),
        ]
    );
    assert_eq!(plans[1].defines["TRACE"], Value::Bool(true));
    assert_eq!(plans[0].defines["TRACE"], Value::Bool(false));
    assert_eq!(plans[0].tool_config["tool"].as_str(), Some("verible"));
}

#[test]
fn test_environment_layer_and_strict_validation() {
    let ws = soc_workspace();
    let config = DescriptionLoader::for_workspace(ws.layout()).load("soc.toml").unwrap();
    let env = |name: &str| (name == "SOC_CLK_MHZ").then(|| "900".to_string());

    let lenient = Planner::new(
        ConfigComposer::new().with_env(env),
        SourceResolver::for_workspace(ws.layout()),
    );
    let plans = lenient
        .plan(&config, Tool::Synthesis, &[], &Overrides::new())
        .unwrap();
    assert_eq!(plans[0].parameters["CLK_MHZ"], Value::Int(900));
    assert_eq!(plans[0].issues.len(), 1);
    assert_eq!(plans[0].tool_config["part"].as_str(), Some("xc7a100t"));
    assert_eq!(plans[0].tool_config["tool"].as_str(), Some("vivado"));

    let strict = Planner::new(
        ConfigComposer::new()
            .with_policy(ValidationPolicy::Strict)
            .with_env(env),
        SourceResolver::for_workspace(ws.layout()),
    );
    let err = strict
        .plan(&config, Tool::Synthesis, &[], &Overrides::new())
        .unwrap_err();
    assert!(err.to_string().contains("configuration 'fast'"), "{err}");
}

#[test]
fn test_synthesis_rejects_debug() {
    let ws = soc_workspace();
    let config = DescriptionLoader::for_workspace(ws.layout()).load("soc.toml").unwrap();

    let err = planner(&ws, ValidationPolicy::Warn)
        .plan(&config, Tool::Synthesis, &names(&["debug"]), &Overrides::new())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration 'debug' not supported by synthesis tool. Tool supports: fast"
    );
}

#[test]
fn test_plans_serialize_for_tool_wrappers() {
    let ws = soc_workspace();
    let config = DescriptionLoader::for_workspace(ws.layout()).load("soc.toml").unwrap();
    let plans = planner(&ws, ValidationPolicy::Warn)
        .plan(&config, Tool::Lint, &[], &Overrides::new().define("TRACE", true))
        .unwrap();

    let json = serde_json::to_value(&plans).unwrap();
    assert_eq!(json[0]["tool"], "lint");
    assert_eq!(json[0]["configuration"], "fast");
    assert_eq!(json[0]["defines"]["TRACE"], true);
    assert_eq!(json[0]["parameters"]["ID_BITS"], 2);
}
