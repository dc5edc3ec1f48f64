//! Error types for hdlm-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] hdlm_fs::Error),

    #[error("Description file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid description file {path}: missing {}{}", .missing.join(", "), format_hints(.hints))]
    Schema {
        path: PathBuf,
        missing: Vec<String>,
        hints: Vec<String>,
    },

    #[error("Invalid value for '{field}' in {path}: {message}")]
    InvalidField {
        path: PathBuf,
        field: String,
        message: String,
    },

    #[error("Circular dependency: {cycle}")]
    CircularComposition { cycle: String },

    #[error("Circular configuration inheritance in {path}: {cycle}")]
    CircularInheritance {
        path: PathBuf,
        cycle: hdlm_graph::Cycle,
    },

    #[error(
        "Configuration '{configuration}' in {path} inherits from unknown configuration '{parent}'. Available: {}",
        .available.join(", ")
    )]
    UnknownInherit {
        path: PathBuf,
        configuration: String,
        parent: String,
        available: Vec<String>,
    },

    #[error(
        "default_configuration '{name}' in {path} does not name a configuration. Available: {}",
        .available.join(", ")
    )]
    UnknownDefaultConfiguration {
        path: PathBuf,
        name: String,
        available: Vec<String>,
    },

    #[error(
        "{tool} section in {path} references unknown configuration '{name}'. Available: {}",
        .available.join(", ")
    )]
    UnknownToolConfiguration {
        path: PathBuf,
        tool: String,
        name: String,
        available: Vec<String>,
    },

    #[error("Configuration '{name}' not found. Available: {}", .available.join(", "))]
    UnknownConfiguration { name: String, available: Vec<String> },
}

fn format_hints(hints: &[String]) -> String {
    if hints.is_empty() {
        String::new()
    } else {
        format!(" (hints: {})", hints.join("; "))
    }
}

impl Error {
    pub(crate) fn invalid_field(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            path: path.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
