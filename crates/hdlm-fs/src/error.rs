//! Error types for hdlm-fs

use std::path::PathBuf;

/// Result type for hdlm-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hdlm-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error(
        "hdlm workspace not initialized: no {marker} marker found above {start}. \
         Run 'hdlm init' in your project root."
    )]
    RootNotFound { start: PathBuf, marker: String },

    #[error("Workspace root does not exist: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
