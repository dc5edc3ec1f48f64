//! Workspace layout detection
//!
//! An hdlm workspace is a directory carrying a `.hdlm-root` marker. Its state
//! lives under `.hdlm/`: installed libraries in `.hdlm/libs/<name>` and the
//! library manifest in `.hdlm/libraries.toml`. Every installed library may
//! carry the same `.hdlm/libraries.toml` for its own dependencies.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, HdlmPath, ROOT_ENV_VAR, Result, io};

/// Resolved on-disk layout of an hdlm workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    /// Wrap an already-known root directory without checking for the marker.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover the workspace root.
    ///
    /// Order: `explicit`, then `env_root` (the value of `HDLM_ROOT`), then an
    /// upward search from `start` for the `.hdlm-root` marker.
    pub fn discover(explicit: Option<&Path>, env_root: Option<&Path>, start: &Path) -> Result<Self> {
        if let Some(path) = explicit.or(env_root) {
            if !path.is_dir() {
                return Err(Error::InvalidRoot {
                    path: path.to_path_buf(),
                });
            }
            let root = dunce::canonicalize(path).map_err(|e| Error::io(path, e))?;
            tracing::debug!(root = %root.display(), "using configured workspace root");
            return Ok(Self { root });
        }

        let root = Self::find_root(start)?;
        tracing::debug!(root = %root.display(), "discovered workspace root");
        Ok(Self { root })
    }

    /// Discover the workspace root reading `HDLM_ROOT` from the process environment.
    pub fn discover_from_env(explicit: Option<&Path>, start: &Path) -> Result<Self> {
        let env_root = std::env::var_os(ROOT_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::discover(explicit, env_root.as_deref(), start)
    }

    /// Walk upward from `start` to the nearest directory holding the root marker.
    pub fn find_root(start: &Path) -> Result<PathBuf> {
        let start = dunce::canonicalize(start).map_err(|e| Error::io(start, e))?;
        for dir in start.ancestors() {
            if dir.join(HdlmPath::RootMarker).is_file() {
                return Ok(dir.to_path_buf());
            }
        }
        Err(Error::RootNotFound {
            start,
            marker: HdlmPath::RootMarker.to_string(),
        })
    }

    /// Initialize a workspace at `root`: marker file, state and libs directories.
    ///
    /// Idempotent; an existing marker or state directory is left untouched.
    pub fn init(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).map_err(|e| Error::io(root, e))?;
        let root = dunce::canonicalize(root).map_err(|e| Error::io(root, e))?;
        let layout = Self { root };

        let marker = layout.root.join(HdlmPath::RootMarker);
        if !marker.exists() {
            io::write_text(&marker, "")?;
        }
        let libs = layout.libs_dir();
        fs::create_dir_all(&libs).map_err(|e| Error::io(&libs, e))?;

        tracing::info!(root = %layout.root.display(), "initialized hdlm workspace");
        Ok(layout)
    }

    /// Whether the root marker is present.
    pub fn is_initialized(&self) -> bool {
        self.root.join(HdlmPath::RootMarker).is_file()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `.hdlm/`
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(HdlmPath::StateDir)
    }

    /// `.hdlm/libs/`
    pub fn libs_dir(&self) -> PathBuf {
        self.state_dir().join(HdlmPath::LibsDir)
    }

    /// `.hdlm/libraries.toml`
    pub fn manifest_path(&self) -> PathBuf {
        self.state_dir().join(HdlmPath::Manifest)
    }

    /// Install directory of the named library.
    pub fn library_dir(&self, name: &str) -> PathBuf {
        self.libs_dir().join(name)
    }

    /// Manifest a library carries for its own dependencies.
    pub fn nested_manifest(library_dir: &Path) -> PathBuf {
        library_dir.join(HdlmPath::StateDir).join(HdlmPath::Manifest)
    }

    /// Resolve `path` against the workspace root unless it is already absolute.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_hang_off_the_state_dir() {
        let layout = WorkspaceLayout::new("/work");
        assert_eq!(layout.state_dir(), PathBuf::from("/work/.hdlm"));
        assert_eq!(layout.libs_dir(), PathBuf::from("/work/.hdlm/libs"));
        assert_eq!(layout.manifest_path(), PathBuf::from("/work/.hdlm/libraries.toml"));
        assert_eq!(layout.library_dir("uart"), PathBuf::from("/work/.hdlm/libs/uart"));
        assert_eq!(
            WorkspaceLayout::nested_manifest(Path::new("/work/.hdlm/libs/uart")),
            PathBuf::from("/work/.hdlm/libs/uart/.hdlm/libraries.toml")
        );
    }

    #[test]
    fn resolve_path_keeps_absolute_paths() {
        let layout = WorkspaceLayout::new("/work");
        assert_eq!(layout.resolve_path(Path::new("rtl/top.toml")), PathBuf::from("/work/rtl/top.toml"));
        assert_eq!(layout.resolve_path(Path::new("/abs/x.toml")), PathBuf::from("/abs/x.toml"));
    }

    #[test]
    fn init_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let first = WorkspaceLayout::init(temp.path()).unwrap();
        let second = WorkspaceLayout::init(temp.path()).unwrap();
        assert_eq!(first, second);
        assert!(first.is_initialized());
        assert!(first.libs_dir().is_dir());
    }
}
