//! Loader for description files
//!
//! Each load runs one pipeline:
//!
//! 1. shape check (`[module]` with `name`, `top` and at least one source list)
//! 2. sources, recursively loading `sources.descriptions`
//! 3. parameter and define definitions
//! 4. inline configurations extracted from extra parameter/define fields
//! 5. explicit `[configurations]`, merged over the inline ones
//! 6. the implicit `default` configuration
//! 7. inheritance references and acyclicity
//! 8. `default_configuration` alias
//! 9. dependencies and tool sections

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hdlm_fs::WorkspaceLayout;

use crate::schema::{
    ALL_CONFIGURATIONS, Configuration, DEFAULT_CONFIGURATION, Define, Dependency, ModuleConfig,
    ModuleSources, ModuleType, Parameter, Tool, ToolSection,
};
use crate::validation::{missing_fields, schema_hints};
use crate::{Error, Result};

/// Loads description files, caching by canonical path.
///
/// A loader owns its cache and its load-in-progress stack; use one loader
/// per thread.
#[derive(Debug)]
pub struct DescriptionLoader {
    base_dir: PathBuf,
    cache: HashMap<PathBuf, Arc<ModuleConfig>>,
    stack: Vec<PathBuf>,
}

impl DescriptionLoader {
    /// Loader resolving relative paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Loader resolving relative paths against the workspace root.
    pub fn for_workspace(layout: &WorkspaceLayout) -> Self {
        Self::new(layout.root())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of distinct files loaded so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Load a description file. Repeated loads of the same file return the
    /// same shared handle.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<ModuleConfig>> {
        let path = path.as_ref();
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        let canonical = dunce::canonicalize(&resolved).map_err(|_| Error::NotFound {
            path: resolved.clone(),
        })?;

        if let Some(config) = self.cache.get(&canonical) {
            tracing::debug!(path = %canonical.display(), "description cache hit");
            return Ok(Arc::clone(config));
        }

        if let Some(start) = self.stack.iter().position(|p| *p == canonical) {
            let cycle = self.stack[start..]
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(Error::CircularComposition { cycle });
        }

        self.stack.push(canonical.clone());
        let result = self.load_uncached(&canonical);
        self.stack.pop();

        let config = Arc::new(result?);
        self.cache.insert(canonical, Arc::clone(&config));
        Ok(config)
    }

    fn load_uncached(&mut self, path: &Path) -> Result<ModuleConfig> {
        tracing::debug!(path = %path.display(), "loading description");
        // Descriptions are TOML whatever their extension.
        let doc: toml::Table = hdlm_fs::load_toml(path)?;

        let missing = missing_fields(&doc);
        if !missing.is_empty() {
            return Err(Error::Schema {
                path: path.to_path_buf(),
                missing,
                hints: schema_hints(&doc),
            });
        }
        let hints = schema_hints(&doc);
        if !hints.is_empty() {
            tracing::warn!(path = %path.display(), ?hints, "description has unrecognized sections");
        }

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_dir.clone());
        let module = doc
            .get("module")
            .and_then(toml::Value::as_table)
            .cloned()
            .unwrap_or_default();

        let sources: ModuleSources = decode_field(path, &module, "sources")?.unwrap_or_default();
        let mut composed = Vec::with_capacity(sources.descriptions.len());
        for description in &sources.descriptions {
            composed.push(self.load(base_dir.join(description))?);
        }

        let parameters = decode_entries(path, &doc, "parameters", |_, raw| Parameter::from_toml(raw))?;
        let defines = decode_entries(path, &doc, "defines", |_, raw| Define::from_toml(raw))?;

        let inline = extract_inline(&parameters, &defines);
        let explicit = decode_entries(path, &doc, "configurations", Configuration::from_toml)?;
        let mut configurations = merge_configurations(inline, explicit);
        configurations
            .entry(DEFAULT_CONFIGURATION.to_string())
            .or_insert_with(Configuration::implicit_default);

        check_inheritance(path, &configurations)?;

        let default_configuration = module
            .get("default_configuration")
            .and_then(toml::Value::as_str)
            .map(str::to_string);
        if let Some(name) = &default_configuration
            && !configurations.contains_key(name)
        {
            return Err(Error::UnknownDefaultConfiguration {
                path: path.to_path_buf(),
                name: name.clone(),
                available: configurations.keys().cloned().collect(),
            });
        }

        let dependencies = decode_dependencies(path, &module)?;

        let mut tools: BTreeMap<Tool, ToolSection> = BTreeMap::new();
        let tool_tables = doc.get("tools").and_then(toml::Value::as_table);
        for tool in Tool::ALL {
            let Some(table) = tool_tables
                .and_then(|t| t.get(tool.as_str()))
                .and_then(toml::Value::as_table)
                .filter(|t| !t.is_empty())
            else {
                continue;
            };
            let section = ToolSection::from_toml(tool, table)
                .map_err(|msg| Error::invalid_field(path, format!("tools.{tool}"), msg))?;
            check_allow_list(path, tool, &section, &configurations)?;
            tools.insert(tool, section);
        }

        let kind: ModuleType = decode_field(path, &module, "type")?.unwrap_or_default();

        Ok(ModuleConfig {
            name: string_field(&module, "name"),
            top: string_field(&module, "top"),
            kind,
            description: module
                .get("description")
                .and_then(toml::Value::as_str)
                .map(str::to_string),
            default_configuration,
            sources,
            parameters,
            defines,
            configurations,
            dependencies,
            simulation: tools.remove(&Tool::Simulation),
            lint: tools.remove(&Tool::Lint),
            synthesis: tools.remove(&Tool::Synthesis),
            path: path.to_path_buf(),
            base_dir,
            composed,
        })
    }
}

fn string_field(table: &toml::Table, key: &str) -> String {
    table
        .get(key)
        .and_then(toml::Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn decode_field<T: serde::de::DeserializeOwned>(
    path: &Path,
    table: &toml::Table,
    key: &str,
) -> Result<Option<T>> {
    table
        .get(key)
        .map(|raw| {
            raw.clone()
                .try_into::<T>()
                .map_err(|e| Error::invalid_field(path, format!("module.{key}"), e.message()))
        })
        .transpose()
}

/// Decode every entry of a top-level table with `decode(name, raw)`.
fn decode_entries<T>(
    path: &Path,
    doc: &toml::Table,
    section: &str,
    decode: impl Fn(&str, &toml::Value) -> std::result::Result<T, String>,
) -> Result<BTreeMap<String, T>> {
    let Some(raw) = doc.get(section) else {
        return Ok(BTreeMap::new());
    };
    let table = raw
        .as_table()
        .ok_or_else(|| Error::invalid_field(path, section, "expected a table"))?;

    table
        .iter()
        .map(|(name, raw)| {
            decode(name, raw)
                .map(|value| (name.clone(), value))
                .map_err(|msg| Error::invalid_field(path, format!("{section}.{name}"), msg))
        })
        .collect()
}

/// Configurations implied by extra fields on parameters and defines.
fn extract_inline(
    parameters: &BTreeMap<String, Parameter>,
    defines: &BTreeMap<String, Define>,
) -> BTreeMap<String, Configuration> {
    let mut configurations: BTreeMap<String, Configuration> = BTreeMap::new();

    for (param, definition) in parameters {
        for (cfg, value) in &definition.overlays {
            configurations
                .entry(cfg.clone())
                .or_insert_with(|| inline_configuration(cfg))
                .parameters
                .insert(param.clone(), value.clone());
        }
    }
    for (define, definition) in defines {
        for (cfg, value) in &definition.overlays {
            configurations
                .entry(cfg.clone())
                .or_insert_with(|| inline_configuration(cfg))
                .defines
                .insert(define.clone(), value.clone());
        }
    }

    configurations
}

fn inline_configuration(name: &str) -> Configuration {
    Configuration {
        description: Some("Generated from inline definitions".to_string()),
        ..Configuration::new(name)
    }
}

fn merge_configurations(
    inline: BTreeMap<String, Configuration>,
    explicit: BTreeMap<String, Configuration>,
) -> BTreeMap<String, Configuration> {
    let mut merged = inline;
    for (name, explicit) in explicit {
        let combined = match merged.remove(&name) {
            Some(inline) => inline.merged_with_explicit(explicit),
            None => explicit,
        };
        merged.insert(name, combined);
    }
    merged
}

fn check_inheritance(path: &Path, configurations: &BTreeMap<String, Configuration>) -> Result<()> {
    for (name, cfg) in configurations {
        if let Some(parent) = &cfg.inherit
            && !configurations.contains_key(parent)
        {
            return Err(Error::UnknownInherit {
                path: path.to_path_buf(),
                configuration: name.clone(),
                parent: parent.clone(),
                available: configurations.keys().cloned().collect(),
            });
        }
    }

    hdlm_graph::walk(configurations.keys(), |name| {
        Ok::<_, Infallible>(
            configurations
                .get(name)
                .and_then(|c| c.inherit.clone())
                .into_iter()
                .collect(),
        )
    })
    .map_err(|e| match e {
        hdlm_graph::WalkError::Cycle(cycle) => Error::CircularInheritance {
            path: path.to_path_buf(),
            cycle,
        },
        hdlm_graph::WalkError::Expand(never) => match never {},
    })?;

    Ok(())
}

fn check_allow_list(
    path: &Path,
    tool: Tool,
    section: &ToolSection,
    configurations: &BTreeMap<String, Configuration>,
) -> Result<()> {
    for name in section.configurations.iter().flatten() {
        if name != ALL_CONFIGURATIONS && !configurations.contains_key(name) {
            return Err(Error::UnknownToolConfiguration {
                path: path.to_path_buf(),
                tool: tool.to_string(),
                name: name.clone(),
                available: configurations.keys().cloned().collect(),
            });
        }
    }
    Ok(())
}

fn decode_dependencies(path: &Path, module: &toml::Table) -> Result<BTreeMap<String, Dependency>> {
    let Some(raw) = module.get("dependencies") else {
        return Ok(BTreeMap::new());
    };
    let table = raw
        .as_table()
        .ok_or_else(|| Error::invalid_field(path, "module.dependencies", "expected a table"))?;

    table
        .iter()
        .map(|(name, raw)| {
            let dependency = match raw {
                toml::Value::String(p) => Dependency {
                    path: Some(p.clone()),
                    ..Dependency::default()
                },
                other => other.clone().try_into::<Dependency>().map_err(|e| {
                    Error::invalid_field(path, format!("module.dependencies.{name}"), e.message())
                })?,
            };
            Ok((name.clone(), dependency))
        })
        .collect()
}
