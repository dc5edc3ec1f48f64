//! Composition and planning for hdlm
//!
//! Given a loaded [`ModuleConfig`](hdlm_meta::ModuleConfig), this crate
//! answers "which parameter and define values, which sources, for this tool
//! and this configuration":
//!
//! - [`compose`]: layered parameter/define resolution for one
//!   (tool, configuration) pair
//! - [`selection`]: tool allow-lists and `"all"` expansion
//! - [`sources`]: source files and include directories, including
//!   `@lib/path` references
//! - [`plan`]: all of the above combined into [`BuildPlan`]s

pub mod compose;
pub mod error;
pub mod plan;
pub mod selection;
pub mod sources;

pub use compose::{ComposedConfig, ConfigComposer, Overrides, ValidationPolicy};
pub use error::{Error, Result};
pub use plan::{BuildPlan, Planner};
pub use selection::{expand_configurations, validate_tool_configuration};
pub use sources::{SourceResolver, SourceSet};
