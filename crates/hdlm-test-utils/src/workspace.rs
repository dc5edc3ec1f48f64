//! [`TestWorkspace`] builder for hdlm test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use hdlm_fs::WorkspaceLayout;
use tempfile::TempDir;

/// An initialised hdlm root in a temporary directory.
///
/// # Example
///
/// ```rust,no_run
/// use hdlm_test_utils::{TestWorkspace, description};
///
/// let ws = TestWorkspace::new();
/// ws.write("rtl/fifo.toml", &description("fifo", "fifo", ""));
/// ws.assert_file_exists(".hdlm-root");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
    layout: WorkspaceLayout,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("project");
        let layout = WorkspaceLayout::init(&root)
            .unwrap_or_else(|e| panic!("TestWorkspace::new: init failed: {e}"));
        Self { temp_dir, layout }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Scratch directory outside the workspace root, for fixture remotes.
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestWorkspace::write: {}: {e}", path.display()));
        path
    }

    /// Write empty placeholder sources.
    pub fn touch(&self, relatives: &[&str]) {
        for relative in relatives {
            self.write(relative, "");
        }
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }

    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    pub fn assert_file_not_exists(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(!path.exists(), "Expected file to NOT exist: {}", path.display());
    }
}

/// A minimal valid description file with one module source, followed by
/// `extra` verbatim.
pub fn description(name: &str, top: &str, extra: &str) -> String {
    format!(
        "[module]\nname = \"{name}\"\ntop = \"{top}\"\n\n[module.sources]\nmodules = [\"{top}.sv\"]\n\n{extra}"
    )
}
