//! Plan command

use std::path::PathBuf;

use colored::Colorize;
use hdlm_core::{BuildPlan, ConfigComposer, Overrides, Planner, ValidationPolicy};
use hdlm_expr::Value;
use hdlm_meta::Tool;

use super::Context;
use super::check::{load_description, source_resolver};
use crate::error::Result;

/// Arguments of `hdlm plan`.
#[derive(Debug, Clone)]
pub struct PlanArgs {
    pub file: PathBuf,
    pub tool: Tool,
    pub configurations: Vec<String>,
    pub parameters: Vec<(String, Value)>,
    pub defines: Vec<(String, Value)>,
    pub strict: bool,
    pub json: bool,
}

impl PlanArgs {
    fn overrides(&self) -> Overrides {
        let with_params = self
            .parameters
            .iter()
            .fold(Overrides::new(), |acc, (k, v)| acc.parameter(k, v.clone()));
        self.defines
            .iter()
            .fold(with_params, |acc, (k, v)| acc.define(k, v.clone()))
    }
}

/// Compose one build plan per requested configuration.
pub fn run_plan(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let config = load_description(ctx, &args.file)?;

    let policy = if args.strict {
        ValidationPolicy::Strict
    } else {
        ValidationPolicy::Warn
    };
    let planner = Planner::new(
        ConfigComposer::new().with_policy(policy),
        source_resolver(ctx),
    );
    let plans = planner.plan(&config, args.tool, &args.configurations, &args.overrides())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
    } else {
        for plan in &plans {
            print_plan(plan);
        }
    }
    Ok(())
}

fn print_plan(plan: &BuildPlan) {
    println!(
        "{} {} [{}] for {}",
        "Plan:".bold(),
        plan.module.green(),
        plan.configuration.cyan(),
        plan.tool
    );
    println!("  top: {}", plan.top);
    if let Some(toml::Value::String(program)) = plan.tool_config.get("tool") {
        println!("  program: {program}");
    }

    section("parameters", plan.parameters.iter().map(|(k, v)| format!("{k} = {v}")));
    section("defines", plan.defines.iter().map(|(k, v)| format!("{k} = {v}")));
    section("sources", plan.sources.iter().map(|p| p.display().to_string()));
    section("include dirs", plan.include_dirs.iter().map(|p| p.display().to_string()));

    for missing in &plan.missing_sources {
        println!("  {} source not found: {}", "warning:".yellow().bold(), missing);
    }
    for issue in &plan.issues {
        println!("  {} {}", "warning:".yellow().bold(), issue);
    }
    println!();
}

fn section(label: &str, lines: impl Iterator<Item = String>) {
    let lines: Vec<_> = lines.collect();
    if lines.is_empty() {
        return;
    }
    println!("  {}:", label.dimmed());
    for line in lines {
        println!("    {line}");
    }
}
