//! Error types for hdlm-libs

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] hdlm_fs::Error),

    #[error("Invalid library specification: {message}")]
    InvalidSpec { message: String },

    #[error("Invalid library name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Failed to parse library manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("Library '{name}' already exists in manifest")]
    DuplicateLibrary { name: String },

    #[error("Library '{name}' not found in manifest. Available: {}", .available.join(", "))]
    UnknownLibrary { name: String, available: Vec<String> },

    #[error("Library '{name}' not found. Run 'hdlm lib install' to install libraries.")]
    NotInstalled { name: String },

    #[error("Invalid library path format: {path}")]
    InvalidLibraryPath { path: String },

    #[error("Git {operation} failed for {target}: {source}")]
    Git {
        operation: &'static str,
        target: String,
        #[source]
        source: git2::Error,
    },

    #[error("Circular library dependency: {0}")]
    CircularDependency(hdlm_graph::Cycle),
}

impl Error {
    pub(crate) fn git(operation: &'static str, target: impl Into<String>, source: git2::Error) -> Self {
        Self::Git {
            operation,
            target: target.into(),
            source,
        }
    }
}
