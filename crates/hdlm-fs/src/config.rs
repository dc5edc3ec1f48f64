//! TOML configuration loading

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result, io};

/// Read `path` and decode it as TOML, whatever its extension.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = io::read_text(path)?;
    parse_toml(path, &content)
}

/// Decode already-read TOML content; `path` is only used in errors.
pub fn parse_toml<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
