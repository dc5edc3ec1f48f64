//! Filesystem layer for hdlm
//!
//! Provides workspace root discovery, the on-disk layout of hdlm state
//! (`.hdlm/`, installed libraries, the library manifest), TOML
//! config loading, and atomic locked writes.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod layout;

pub use config::{load_toml, parse_toml};
pub use constants::HdlmPath;
pub use error::{Error, Result};
pub use layout::WorkspaceLayout;

/// Environment variable naming an explicit workspace root.
pub const ROOT_ENV_VAR: &str = "HDLM_ROOT";
