//! Error types for hdlm-core

use hdlm_meta::{Tool, ValidationIssue};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Meta(#[from] hdlm_meta::Error),

    #[error(transparent)]
    Libs(#[from] hdlm_libs::Error),

    #[error(transparent)]
    Fs(#[from] hdlm_fs::Error),

    #[error(
        "Configuration '{name}' not supported by {tool} tool. Tool supports: {}",
        .supported.join(", ")
    )]
    UnsupportedConfiguration {
        name: String,
        tool: Tool,
        supported: Vec<String>,
    },

    #[error(
        "Parameter validation failed for configuration '{configuration}':\n  - {}",
        .issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n  - ")
    )]
    Validation {
        configuration: String,
        issues: Vec<ValidationIssue>,
    },
}
