//! Check and info commands

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use hdlm_core::SourceResolver;
use hdlm_expr::{Value, ValueKind};
use hdlm_meta::{DescriptionLoader, ModuleConfig, ModuleSources, ModuleType, Tool, check_module};
use serde::Serialize;

use super::Context;
use crate::cli::Format;
use crate::error::{CliError, Result};

/// Load a description file named on the command line.
pub(crate) fn load_description(ctx: &Context, file: &Path) -> Result<Arc<ModuleConfig>> {
    let mut loader = DescriptionLoader::new(ctx.cwd());
    Ok(loader.load(ctx.absolute(file))?)
}

pub(crate) fn source_resolver(ctx: &Context) -> SourceResolver {
    ctx.optional_workspace()
        .map(|layout| SourceResolver::for_workspace(&layout))
        .unwrap_or_default()
}

/// Load and validate a description. Schema and inheritance errors fail the
/// load itself; declared values are then checked per configuration.
pub fn run_check(ctx: &Context, file: &Path) -> Result<()> {
    let config = load_description(ctx, file)?;

    let sources = source_resolver(ctx).resolve(&config);
    for missing in &sources.missing {
        println!("{} source not found: {}", "warning:".yellow().bold(), missing);
    }

    let issues = check_module(&config);
    if issues.is_empty() {
        println!(
            "{} {} ({} configurations, {} sources)",
            "OK".green().bold(),
            config.name,
            config.configuration_names().len(),
            sources.files.len()
        );
        return Ok(());
    }

    for issue in &issues {
        println!("  {} {}", "x".red(), issue);
    }
    Err(CliError::user(format!(
        "{} validation issue(s) in {}",
        issues.len(),
        config.path.display()
    )))
}

#[derive(Debug, Serialize)]
struct ModuleInfo {
    name: String,
    top: String,
    kind: ModuleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    default_configuration: String,
    configurations: Vec<ConfigurationInfo>,
    parameters: BTreeMap<String, ParameterInfo>,
    defines: BTreeMap<String, Option<Value>>,
    sources: ModuleSources,
    /// Configurations each tool accepts; `["all"]` when unrestricted.
    tools: BTreeMap<Tool, Vec<String>>,
    dependencies: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ConfigurationInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    inherit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct ParameterInfo {
    #[serde(rename = "type")]
    kind: ValueKind,
    default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl From<&ModuleConfig> for ModuleInfo {
    fn from(config: &ModuleConfig) -> Self {
        let configurations = config
            .configurations
            .values()
            .map(|c| ConfigurationInfo {
                name: c.name.clone(),
                inherit: c.inherit.clone(),
                description: c.description.clone(),
            })
            .collect();

        let parameters = config
            .parameters
            .iter()
            .map(|(name, p)| {
                let info = ParameterInfo {
                    kind: p.kind,
                    default: p.default.clone(),
                    expr: p.expr.clone(),
                    description: p.description.clone(),
                };
                (name.clone(), info)
            })
            .collect();

        let tools = Tool::ALL
            .iter()
            .filter_map(|&tool| {
                let section = config.tool_section(tool)?;
                let allowed = section
                    .restricted_to()
                    .map(<[String]>::to_vec)
                    .unwrap_or_else(|| vec![hdlm_meta::ALL_CONFIGURATIONS.to_string()]);
                Some((tool, allowed))
            })
            .collect();

        Self {
            name: config.name.clone(),
            top: config.top.clone(),
            kind: config.kind,
            description: config.description.clone(),
            default_configuration: config.effective_configuration(None).to_string(),
            configurations,
            parameters,
            defines: config
                .defines
                .iter()
                .map(|(name, d)| (name.clone(), d.default.clone()))
                .collect(),
            sources: config.sources.clone(),
            tools,
            dependencies: config.dependencies.keys().cloned().collect(),
        }
    }
}

/// Summarize a description file.
pub fn run_info(ctx: &Context, file: &Path, format: Format) -> Result<()> {
    let config = load_description(ctx, file)?;
    let info = ModuleInfo::from(config.as_ref());

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        Format::Yaml => print!("{}", serde_yaml::to_string(&info)?),
        Format::Text => print_info(&info),
    }
    Ok(())
}

fn print_info(info: &ModuleInfo) {
    println!("{} {} (top: {})", "Module:".bold(), info.name.green(), info.top);
    if let Some(description) = &info.description {
        println!("  {}", description.dimmed());
    }
    println!();

    println!("{}", "Configurations:".cyan().bold());
    for cfg in &info.configurations {
        let marker = if cfg.name == info.default_configuration {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        match &cfg.inherit {
            Some(parent) => println!("  {} {:<16} inherits {}", marker, cfg.name, parent),
            None => println!("  {} {}", marker, cfg.name),
        }
    }
    println!();

    if !info.parameters.is_empty() {
        println!("{}", "Parameters:".cyan().bold());
        for (name, p) in &info.parameters {
            let default = p
                .default
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string());
            match &p.expr {
                Some(expr) => println!("  {:<16} {:<8} {} = {}", name, p.kind.as_str(), default, expr.dimmed()),
                None => println!("  {:<16} {:<8} {}", name, p.kind.as_str(), default),
            }
        }
        println!();
    }

    if !info.tools.is_empty() {
        println!("{}", "Tools:".cyan().bold());
        for (tool, allowed) in &info.tools {
            println!("  {:<12} {}", tool.to_string(), allowed.join(", "));
        }
        println!();
    }

    if !info.dependencies.is_empty() {
        println!("{} {}", "Dependencies:".cyan().bold(), info.dependencies.join(", "));
    }
}
