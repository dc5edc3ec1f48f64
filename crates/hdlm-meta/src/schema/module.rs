//! The assembled module description.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Configuration, DEFAULT_CONFIGURATION, Define, Parameter, Tool, ToolSection};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    #[default]
    Rtl,
    Testbench,
    Ip,
    Primitive,
}

/// Source lists of a module. Entries are paths relative to the description
/// file, or `@lib/path` references into an installed library.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSources {
    pub packages: Vec<String>,
    pub modules: Vec<String>,
    pub includes: Vec<String>,
    pub resources: Vec<String>,
    /// Other description files whose sources this module composes.
    pub descriptions: Vec<String>,
}

impl ModuleSources {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
            && self.modules.is_empty()
            && self.includes.is_empty()
            && self.resources.is_empty()
            && self.descriptions.is_empty()
    }

    /// Every referenced source, packages before modules.
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.packages
            .iter()
            .chain(&self.modules)
            .chain(&self.includes)
            .chain(&self.resources)
    }
}

/// A module-level dependency declaration. A bare string in the file is a
/// `path`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dependency {
    pub path: Option<String>,
    pub git: Option<String>,
    pub tag: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
}

/// A fully loaded description file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleConfig {
    pub name: String,
    pub top: String,
    pub kind: ModuleType,
    pub description: Option<String>,
    /// Configuration used when none is requested.
    pub default_configuration: Option<String>,
    pub sources: ModuleSources,
    pub parameters: BTreeMap<String, Parameter>,
    pub defines: BTreeMap<String, Define>,
    pub configurations: BTreeMap<String, Configuration>,
    pub dependencies: BTreeMap<String, Dependency>,
    pub simulation: Option<ToolSection>,
    pub lint: Option<ToolSection>,
    pub synthesis: Option<ToolSection>,
    /// Absolute path of the description file.
    pub path: PathBuf,
    /// Directory relative sources resolve against.
    pub base_dir: PathBuf,
    /// Loaded `sources.descriptions`, in declaration order.
    pub composed: Vec<Arc<ModuleConfig>>,
}

impl ModuleConfig {
    pub fn tool_section(&self, tool: Tool) -> Option<&ToolSection> {
        match tool {
            Tool::Simulation => self.simulation.as_ref(),
            Tool::Lint => self.lint.as_ref(),
            Tool::Synthesis => self.synthesis.as_ref(),
        }
    }

    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.get(name)
    }

    pub fn configuration_names(&self) -> Vec<String> {
        self.configurations.keys().cloned().collect()
    }

    /// Name used when the caller does not request one: the
    /// `default_configuration` alias, else `default`.
    pub fn effective_configuration<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_configuration.as_deref())
            .unwrap_or(DEFAULT_CONFIGURATION)
    }

    /// The inheritance chain of `name`, root-most first and `name` last.
    pub fn inheritance_chain(&self, name: &str) -> Result<Vec<&Configuration>> {
        if !self.configurations.contains_key(name) {
            return Err(Error::UnknownConfiguration {
                name: name.to_string(),
                available: self.configuration_names(),
            });
        }

        let order = hdlm_graph::walk([name], |current| {
            Ok::<_, Infallible>(
                self.configurations
                    .get(current)
                    .and_then(|c| c.inherit.clone())
                    .filter(|parent| self.configurations.contains_key(parent))
                    .into_iter()
                    .collect(),
            )
        })
        .map_err(|e| match e {
            hdlm_graph::WalkError::Cycle(cycle) => Error::CircularInheritance {
                path: self.path.clone(),
                cycle,
            },
            hdlm_graph::WalkError::Expand(never) => match never {},
        })?;

        Ok(order
            .iter()
            .filter_map(|n| self.configurations.get(n))
            .collect())
    }
}
