//! Init command

use std::path::Path;

use colored::Colorize;
use hdlm_fs::WorkspaceLayout;

use super::Context;
use crate::error::Result;

/// Create the root marker and `.hdlm/` state under `path`.
pub fn run_init(ctx: &Context, path: &Path) -> Result<()> {
    let target = ctx.absolute(path);
    let existed = WorkspaceLayout::new(target.clone()).is_initialized();
    let layout = WorkspaceLayout::init(&target)?;

    if existed {
        println!(
            "{} Workspace already initialized at {}",
            "=>".blue().bold(),
            layout.root().display()
        );
    } else {
        println!(
            "{} Initialized hdlm workspace at {}",
            "=>".green().bold(),
            layout.root().display()
        );
        println!(
            "   Add libraries with {}",
            "hdlm lib add <url> --tag <tag>".cyan()
        );
    }
    Ok(())
}
