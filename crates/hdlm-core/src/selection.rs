//! Which configurations a tool may build.

use hdlm_meta::{
    ALL_CONFIGURATIONS, DEFAULT_CONFIGURATION, ModuleConfig, Tool, ToolSection,
};

use crate::{Error, Result};

fn unknown(config: &ModuleConfig, name: &str) -> Error {
    hdlm_meta::Error::UnknownConfiguration {
        name: name.to_string(),
        available: config.configuration_names(),
    }
    .into()
}

/// Check that `requested` may be built by `tool`.
///
/// A name other than `"all"` must exist in the module and, when the section
/// restricts configurations, appear on its allow-list. `"all"` against a
/// restricted allow-list requires every declared configuration to be listed;
/// the implicit `default` is exempt.
pub fn validate_tool_configuration(
    config: &ModuleConfig,
    requested: &str,
    section: Option<&ToolSection>,
    tool: Tool,
) -> Result<()> {
    if requested != ALL_CONFIGURATIONS && !config.configurations.contains_key(requested) {
        return Err(unknown(config, requested));
    }

    let Some(allowed) = section.and_then(ToolSection::restricted_to) else {
        return Ok(());
    };
    let unsupported = |name: &str| Error::UnsupportedConfiguration {
        name: name.to_string(),
        tool,
        supported: allowed.to_vec(),
    };

    if requested == ALL_CONFIGURATIONS {
        let missing = config
            .configurations
            .values()
            .filter(|c| !(c.implicit && c.name == DEFAULT_CONFIGURATION))
            .find(|c| !allowed.contains(&c.name));
        return match missing {
            Some(c) => Err(unsupported(&c.name)),
            None => Ok(()),
        };
    }

    if allowed.iter().any(|n| n == requested) {
        Ok(())
    } else {
        Err(unsupported(requested))
    }
}

/// Expand requested names for `tool`, validating each and replacing `"all"`
/// by the allowed configurations. No names means the module's default
/// configuration. Duplicates are dropped, first occurrence wins.
pub fn expand_configurations(
    config: &ModuleConfig,
    names: &[String],
    tool: Tool,
) -> Result<Vec<String>> {
    let section = config.tool_section(tool);
    if names.is_empty() {
        let name = config.effective_configuration(None);
        validate_tool_configuration(config, name, section, tool)?;
        return Ok(vec![name.to_string()]);
    }

    let mut expanded: Vec<String> = Vec::new();
    for name in names {
        validate_tool_configuration(config, name, section, tool)?;
        let batch = if name == ALL_CONFIGURATIONS {
            match section.and_then(ToolSection::restricted_to) {
                Some(allowed) => allowed.to_vec(),
                None => config.configuration_names(),
            }
        } else {
            vec![name.clone()]
        };
        for name in batch {
            if !expanded.contains(&name) {
                expanded.push(name);
            }
        }
    }

    tracing::debug!(module = %config.name, %tool, configurations = ?expanded, "expanded configurations");
    Ok(expanded)
}
