//! Well-known names inside an hdlm workspace.

use std::path::Path;

/// Standard hdlm filesystem markers and paths, relative to their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdlmPath {
    /// The `.hdlm-root` marker file at the workspace root
    RootMarker,
    /// The `.hdlm` state directory
    StateDir,
    /// The `libs` directory inside the state directory
    LibsDir,
    /// The `libraries.toml` manifest inside the state directory
    Manifest,
}

impl HdlmPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RootMarker => ".hdlm-root",
            Self::StateDir => ".hdlm",
            Self::LibsDir => "libs",
            Self::Manifest => "libraries.toml",
        }
    }
}

impl AsRef<Path> for HdlmPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for HdlmPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for HdlmPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
