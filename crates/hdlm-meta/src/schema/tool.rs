//! Per-tool sections: `[tools.simulation]`, `[tools.lint]`, `[tools.synthesis]`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use hdlm_expr::Value;
use serde::{Deserialize, Serialize};

use super::scalar_map;

/// Value in an allow-list that admits every configuration.
pub const ALL_CONFIGURATIONS: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Simulation,
    Lint,
    Synthesis,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Simulation, Tool::Lint, Tool::Synthesis];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulation => "simulation",
            Self::Lint => "lint",
            Self::Synthesis => "synthesis",
        }
    }

    /// Program used when the section does not name one.
    pub fn default_program(&self) -> Option<&'static str> {
        match self {
            Self::Simulation => None,
            Self::Lint => Some("verilator"),
            Self::Synthesis => Some("vivado"),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulation" | "sim" => Ok(Self::Simulation),
            "lint" => Ok(Self::Lint),
            "synthesis" | "synth" => Ok(Self::Synthesis),
            other => Err(format!(
                "unknown tool '{other}' (expected simulation, lint or synthesis)"
            )),
        }
    }
}

/// A simulation test entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    pub test_module: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_timeout() -> u64 {
    60
}

impl TestSpec {
    pub fn for_module(test_module: impl Into<String>) -> Self {
        Self {
            test_module: test_module.into(),
            timeout: default_timeout(),
            parameters: BTreeMap::new(),
            env: BTreeMap::new(),
        }
    }
}

/// One tool section of a description file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolSection {
    /// `None` or empty means every configuration is allowed.
    pub configurations: Option<Vec<String>>,
    pub parameters: BTreeMap<String, Value>,
    pub defines: BTreeMap<String, Value>,
    pub tests: BTreeMap<String, TestSpec>,
    /// Tool-specific keys kept verbatim (`tool`, `part`, `fix`, ...).
    pub extras: toml::Table,
}

impl ToolSection {
    /// Decode a tool table. `tests` is only meaningful for simulation.
    pub fn from_toml(tool: Tool, table: &toml::Table) -> Result<Self, String> {
        let mut section = Self::default();

        for (key, raw) in table {
            match key.as_str() {
                "configurations" => {
                    let names = raw
                        .clone()
                        .try_into::<Vec<String>>()
                        .map_err(|_| "configurations must be a list of names".to_string())?;
                    section.configurations = Some(names);
                }
                "parameters" | "defines" => {
                    let values = raw
                        .as_table()
                        .ok_or_else(|| format!("{key} must be a table"))
                        .and_then(|t| scalar_map(t).map_err(|e| format!("{key}.{e}")))?;
                    if key == "parameters" {
                        section.parameters = values;
                    } else {
                        section.defines = values;
                    }
                }
                "tests" if tool == Tool::Simulation => {
                    section.tests = decode_tests(raw)?;
                }
                _ => {
                    section.extras.insert(key.clone(), raw.clone());
                }
            }
        }

        Ok(section)
    }

    /// The allow-list, or `None` when every configuration is allowed.
    pub fn restricted_to(&self) -> Option<&[String]> {
        match self.configurations.as_deref() {
            None | Some([]) => None,
            Some(list) if list.iter().any(|n| n == ALL_CONFIGURATIONS) => None,
            Some(list) => Some(list),
        }
    }

    pub fn allows(&self, configuration: &str) -> bool {
        self.restricted_to()
            .is_none_or(|list| list.iter().any(|n| n == configuration))
    }

    /// Program named by the `tool` extra, or the tool's default.
    pub fn program(&self, tool: Tool) -> Option<&str> {
        self.extras
            .get("tool")
            .and_then(toml::Value::as_str)
            .or(tool.default_program())
    }
}

/// `tests` as `{name = {test_module = ...}}` or as a list of module paths
/// named by file stem.
fn decode_tests(raw: &toml::Value) -> Result<BTreeMap<String, TestSpec>, String> {
    match raw {
        toml::Value::Table(table) => table
            .iter()
            .map(|(name, spec)| {
                spec.clone()
                    .try_into::<TestSpec>()
                    .map(|s| (name.clone(), s))
                    .map_err(|e| format!("tests.{name}: {}", e.message()))
            })
            .collect(),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| {
                let module = item
                    .as_str()
                    .ok_or_else(|| "tests list entries must be paths".to_string())?;
                let name = Path::new(module)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| module.to_string());
                Ok((name, TestSpec::for_module(module)))
            })
            .collect(),
        _ => Err("tests must be a table or a list".to_string()),
    }
}
