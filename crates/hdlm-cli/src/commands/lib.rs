//! Library management commands

use colored::Colorize;
use hdlm_libs::{DependencyResolver, ResolveMode, VersionSelector};

use super::Context;
use crate::error::{CliError, Result};

pub fn run_lib_add(
    ctx: &Context,
    url: &str,
    tag: Option<String>,
    branch: Option<String>,
    commit: Option<String>,
    name: Option<&str>,
) -> Result<()> {
    let manager = ctx.library_manager()?;
    let selector = VersionSelector::from_fields(tag, branch, commit)?;
    let label = selector.to_string();
    let name = manager.add(url, selector, name)?;

    println!("{} Added library {} ({})", "=>".green().bold(), name.cyan(), label);
    println!("   Run {} to fetch it.", format!("hdlm lib install {name}").cyan());
    Ok(())
}

pub fn run_lib_remove(ctx: &Context, name: &str) -> Result<()> {
    let manager = ctx.library_manager()?;
    manager.remove(name)?;
    println!("{} Removed library {}", "=>".green().bold(), name.cyan());
    Ok(())
}

pub fn run_lib_list(ctx: &Context) -> Result<()> {
    let manager = ctx.library_manager()?;
    let libraries = manager.list()?;

    if libraries.is_empty() {
        println!("No libraries declared.");
        println!("Add one with {}", "hdlm lib add <url> --tag <tag>".cyan());
        return Ok(());
    }

    println!("{}", "Libraries".bold());
    for (name, spec) in &libraries {
        let status = if manager.is_installed(name) {
            "installed".green()
        } else {
            "missing".yellow()
        };
        println!(
            "  {:<16} {:<10} {} {}",
            name.cyan(),
            status,
            spec.selector(),
            spec.git().dimmed()
        );
    }
    Ok(())
}

/// Install one library, or every declared library. A failure of one entry
/// does not stop the others.
pub fn run_lib_install(ctx: &Context, name: Option<&str>) -> Result<()> {
    let manager = ctx.library_manager()?;

    if let Some(name) = name {
        let lib = manager.install(name)?;
        println!(
            "{} Installed {} at {}",
            "=>".green().bold(),
            lib.name().cyan(),
            lib.path().display()
        );
        return Ok(());
    }

    let report = manager.install_all()?;
    for lib in &report.installed {
        println!("  {} {}", "ok".green(), lib.name());
    }
    for (name, err) in &report.failed {
        println!("  {} {}: {}", "x".red(), name, err);
    }

    if report.is_success() {
        println!(
            "{} {} libraries installed",
            "=>".green().bold(),
            report.installed.len()
        );
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} of {} libraries failed to install",
            report.failed.len(),
            report.failed.len() + report.installed.len()
        )))
    }
}

pub fn run_lib_update(ctx: &Context, name: Option<&str>) -> Result<()> {
    let manager = ctx.library_manager()?;
    let updated = manager.update(name)?;

    if updated.is_empty() {
        println!("Nothing to update.");
    } else {
        println!("{} Updated {}", "=>".green().bold(), updated.join(", "));
    }
    Ok(())
}

/// Print libraries in dependency order, dependencies first.
pub fn run_lib_resolve(ctx: &Context, fetch: bool) -> Result<()> {
    let manager = ctx.library_manager()?;
    let mode = if fetch {
        ResolveMode::FetchMissing
    } else {
        ResolveMode::InstalledOnly
    };
    let resolved = DependencyResolver::new(&manager).with_mode(mode).resolve_all()?;

    for lib in &resolved {
        let marker = if lib.is_installed() {
            "ok".green()
        } else {
            "--".yellow()
        };
        println!("  {} {:<16} {}", marker, lib.name(), lib.spec().selector());
    }
    Ok(())
}
