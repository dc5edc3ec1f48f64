//! Description files for hdlm.
//!
//! A description file is a TOML document declaring one hardware module: its
//! identity, sources, tunable parameters and defines, named configurations,
//! and per-tool sections. This crate turns those files into a typed
//! [`ModuleConfig`] and checks what can be checked without composing.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use loader::DescriptionLoader;
pub use schema::{
    ALL_CONFIGURATIONS, Configuration, DEFAULT_CONFIGURATION, Define, Dependency, ModuleConfig, ModuleSources,
    ModuleType, Parameter, TestSpec, Tool, ToolSection,
};
pub use validation::{IssueKind, ParameterValidator, ValidationIssue, check_module};
