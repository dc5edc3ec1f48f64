//! Named configuration overlays.

use std::collections::BTreeMap;

use hdlm_expr::Value;
use serde::Deserialize;

use super::scalar_map;

/// Name of the configuration that always exists.
pub const DEFAULT_CONFIGURATION: &str = "default";

/// A named overlay of parameter/define overrides, optionally inheriting
/// from another configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    pub name: String,
    pub parameters: BTreeMap<String, Value>,
    pub defines: BTreeMap<String, Value>,
    pub inherit: Option<String>,
    pub description: Option<String>,
    /// Synthesized rather than declared (only ever the `default` one).
    pub implicit: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfiguration {
    #[serde(default)]
    parameters: toml::Table,
    #[serde(default)]
    defines: toml::Table,
    inherit: Option<String>,
    description: Option<String>,
}

impl Configuration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The synthesized `default` configuration.
    pub fn implicit_default() -> Self {
        Self {
            name: DEFAULT_CONFIGURATION.to_string(),
            implicit: true,
            ..Self::default()
        }
    }

    /// Decode a `[configurations.<name>]` entry. Anything but a table is an
    /// empty configuration.
    pub fn from_toml(name: &str, raw: &toml::Value) -> Result<Self, String> {
        let raw = match raw {
            toml::Value::Table(_) => raw
                .clone()
                .try_into::<RawConfiguration>()
                .map_err(|e| e.message().to_string())?,
            _ => RawConfiguration::default(),
        };
        Ok(Self {
            name: name.to_string(),
            parameters: scalar_map(&raw.parameters).map_err(|e| format!("parameters.{e}"))?,
            defines: scalar_map(&raw.defines).map_err(|e| format!("defines.{e}"))?,
            inherit: raw.inherit,
            description: raw.description,
            implicit: false,
        })
    }

    /// Merge an explicitly declared configuration over an inline-derived one
    /// of the same name: explicit entries win, explicit `inherit` is
    /// authoritative, and the description falls back to the inline one.
    pub fn merged_with_explicit(self, explicit: Configuration) -> Configuration {
        let mut parameters = self.parameters;
        parameters.extend(explicit.parameters);
        let mut defines = self.defines;
        defines.extend(explicit.defines);
        Configuration {
            name: explicit.name,
            parameters,
            defines,
            inherit: explicit.inherit,
            description: explicit.description.or(self.description),
            implicit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_entries_win_on_merge() {
        let mut inline = Configuration::new("wide");
        inline.parameters.insert("WIDTH".into(), Value::Int(16));
        inline.parameters.insert("DEPTH".into(), Value::Int(8));
        inline.description = Some("from inline".into());

        let mut explicit = Configuration::new("wide");
        explicit.parameters.insert("WIDTH".into(), Value::Int(32));
        explicit.inherit = Some("base".into());

        let merged = inline.merged_with_explicit(explicit);
        assert_eq!(merged.parameters["WIDTH"], Value::Int(32));
        assert_eq!(merged.parameters["DEPTH"], Value::Int(8));
        assert_eq!(merged.inherit.as_deref(), Some("base"));
        assert_eq!(merged.description.as_deref(), Some("from inline"));
    }

    #[test]
    fn non_table_is_empty_configuration() {
        let cfg = Configuration::from_toml("quick", &toml::Value::Boolean(true)).unwrap();
        assert_eq!(cfg, Configuration::new("quick"));
    }
}
