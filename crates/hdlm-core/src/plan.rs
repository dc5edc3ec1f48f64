//! Build plans: composition plus resolved sources, one per configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use hdlm_expr::Value;
use hdlm_meta::{ModuleConfig, Tool, ValidationIssue};
use serde::Serialize;

use crate::{
    ConfigComposer, Overrides, Result, SourceResolver, SourceSet, expand_configurations,
};

/// Everything a tool wrapper needs to run one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPlan {
    pub module: String,
    pub top: String,
    pub tool: Tool,
    pub configuration: String,
    pub sources: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub parameters: BTreeMap<String, Value>,
    pub defines: BTreeMap<String, Value>,
    pub tool_config: toml::Table,
    pub issues: Vec<ValidationIssue>,
    pub missing_sources: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Planner<'a> {
    composer: ConfigComposer<'a>,
    sources: SourceResolver,
}

impl<'a> Planner<'a> {
    pub fn new(composer: ConfigComposer<'a>, sources: SourceResolver) -> Self {
        Self { composer, sources }
    }

    /// One plan per configuration named in `names` (after `"all"`
    /// expansion), in request order.
    pub fn plan(
        &self,
        config: &ModuleConfig,
        tool: Tool,
        names: &[String],
        overrides: &Overrides,
    ) -> Result<Vec<BuildPlan>> {
        let configurations = expand_configurations(config, names, tool)?;
        let SourceSet {
            files,
            include_dirs,
            missing,
            ..
        } = self.sources.resolve(config);

        configurations
            .iter()
            .map(|name| {
                let composed = self.composer.compose(config, tool, Some(name), overrides)?;
                Ok(BuildPlan {
                    module: config.name.clone(),
                    top: config.top.clone(),
                    tool,
                    configuration: composed.configuration,
                    sources: files.clone(),
                    include_dirs: include_dirs.clone(),
                    parameters: composed.parameters,
                    defines: composed.defines,
                    tool_config: composed.tool_config,
                    issues: composed.issues,
                    missing_sources: missing.clone(),
                })
            })
            .collect()
    }
}
