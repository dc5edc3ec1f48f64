//! Typed model of a description file.
//!
//! # Example TOML
//!
//! ```toml
//! [module]
//! name = "fifo"
//! top = "fifo_top"
//! default_configuration = "small"
//!
//! [module.sources]
//! modules = ["rtl/fifo.sv"]
//! includes = ["rtl/fifo_defs.svh"]
//!
//! [parameters]
//! WIDTH = { default = 8, wide = 32, range = [1, 64] }
//! DEPTH = 16
//! ADDR_BITS = { default = 4, expr = "log2(DEPTH)" }
//!
//! [configurations.small]
//! parameters = { DEPTH = 4 }
//!
//! [tools.simulation]
//! configurations = ["all"]
//! ```

mod configuration;
mod module;
mod parameter;
mod tool;

pub use configuration::{Configuration, DEFAULT_CONFIGURATION};
pub use module::{Dependency, ModuleConfig, ModuleSources, ModuleType};
pub use parameter::{Define, Parameter};
pub use tool::{ALL_CONFIGURATIONS, TestSpec, Tool, ToolSection};

use std::collections::BTreeMap;

use hdlm_expr::Value;

/// Decode a TOML table of scalars into values, naming the first offender.
pub(crate) fn scalar_map(table: &toml::Table) -> std::result::Result<BTreeMap<String, Value>, String> {
    table
        .iter()
        .map(|(key, raw)| scalar(raw).map(|v| (key.clone(), v)).map_err(|e| format!("{key}: {e}")))
        .collect()
}

/// Decode one TOML scalar.
pub(crate) fn scalar(raw: &toml::Value) -> std::result::Result<Value, String> {
    match raw {
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Integer(i) => Ok(Value::Int(*i)),
        toml::Value::Float(f) => Ok(Value::Real(*f)),
        toml::Value::String(s) => Ok(Value::Str(s.clone())),
        other => Err(format!("expected a scalar, found {}", other.type_str())),
    }
}
