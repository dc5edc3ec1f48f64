//! hdlm CLI
//!
//! Command-line front end: load description files, compose build plans and
//! manage library dependencies of a workspace.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands, LibAction};
use commands::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} HDL module manager", "hdlm".green().bold());
        println!();
        println!("Run {} for available commands.", "hdlm --help".cyan());
        return Ok(());
    };

    let ctx = Context::new(cli.root)?;
    execute_command(&ctx, command)
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{} tracing already initialized", "warning:".yellow().bold());
    }
    tracing::debug!("verbose mode enabled");
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init { path } => commands::run_init(ctx, &path),
        Commands::Check { file } => commands::run_check(ctx, &file),
        Commands::Info { file, format } => commands::run_info(ctx, &file, format),
        Commands::Plan {
            file,
            tool,
            configurations,
            parameters,
            defines,
            strict,
            json,
        } => commands::run_plan(
            ctx,
            &commands::PlanArgs {
                file,
                tool,
                configurations,
                parameters,
                defines,
                strict,
                json,
            },
        ),
        Commands::Lib { action } => match action {
            LibAction::Add {
                url,
                tag,
                branch,
                commit,
                name,
            } => commands::run_lib_add(ctx, &url, tag, branch, commit, name.as_deref()),
            LibAction::Remove { name } => commands::run_lib_remove(ctx, &name),
            LibAction::List => commands::run_lib_list(ctx),
            LibAction::Install { name } => commands::run_lib_install(ctx, name.as_deref()),
            LibAction::Update { name } => commands::run_lib_update(ctx, name.as_deref()),
            LibAction::Resolve { fetch } => commands::run_lib_resolve(ctx, fetch),
        },
    }
}
