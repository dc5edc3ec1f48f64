//! Command implementations for hdlm-cli

pub mod check;
pub mod init;
pub mod lib;
pub mod plan;

use std::path::{Path, PathBuf};

use hdlm_fs::WorkspaceLayout;
use hdlm_libs::LibraryManager;

use crate::error::Result;

pub use check::{run_check, run_info};
pub use init::run_init;
pub use lib::{
    run_lib_add, run_lib_install, run_lib_list, run_lib_remove, run_lib_resolve, run_lib_update,
};
pub use plan::{PlanArgs, run_plan};

/// Invocation context shared by all commands.
#[derive(Debug)]
pub struct Context {
    cwd: PathBuf,
    root: Option<PathBuf>,
}

impl Context {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            cwd: std::env::current_dir()?,
            root,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Absolute form of a path given on the command line.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// The enclosing workspace. `--root`/`HDLM_ROOT` take precedence over
    /// the marker search.
    pub fn workspace(&self) -> Result<WorkspaceLayout> {
        Ok(WorkspaceLayout::discover(self.root.as_deref(), None, &self.cwd)?)
    }

    /// The enclosing workspace, if any. Description commands work without one.
    pub fn optional_workspace(&self) -> Option<WorkspaceLayout> {
        match self.workspace() {
            Ok(layout) => Some(layout),
            Err(e) => {
                tracing::debug!(error = %e, "no workspace, library references will not resolve");
                None
            }
        }
    }

    pub fn library_manager(&self) -> Result<LibraryManager> {
        Ok(LibraryManager::new(self.workspace()?))
    }
}
