//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use hdlm_core::Overrides;
use hdlm_expr::Value;
use hdlm_meta::Tool;

/// hdlm - resolve hardware module descriptions into build plans
#[derive(Parser, Debug)]
#[command(name = "hdlm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Workspace root (defaults to searching upward for .hdlm-root)
    #[arg(long, global = true, env = "HDLM_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Initialize a workspace (.hdlm-root marker and .hdlm/ state)
    Init {
        /// Directory to initialize
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Load a description file and validate every configuration
    Check {
        file: PathBuf,
    },

    /// Show what a description file declares
    Info {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Compose build plans for a tool
    ///
    /// Examples:
    ///   hdlm plan fifo.toml --tool simulation
    ///   hdlm plan fifo.toml -t lint -c fast -c slow
    ///   hdlm plan fifo.toml -t synthesis -c all -P WIDTH=32 -D USE_RAM=1
    Plan {
        file: PathBuf,

        /// simulation, lint or synthesis
        #[arg(short, long, value_parser = parse_tool)]
        tool: Tool,

        /// Configuration to plan (repeatable, "all" for every allowed one)
        #[arg(short = 'c', long = "config")]
        configurations: Vec<String>,

        /// Parameter override NAME=VALUE
        #[arg(short = 'P', long = "param", value_parser = parse_assignment)]
        parameters: Vec<(String, Value)>,

        /// Define override NAME=VALUE
        #[arg(short = 'D', long = "define", value_parser = parse_assignment)]
        defines: Vec<(String, Value)>,

        /// Fail on parameter validation issues
        #[arg(long)]
        strict: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage library dependencies
    Lib {
        #[command(subcommand)]
        action: LibAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LibAction {
    /// Add a library to the manifest
    #[command(group(ArgGroup::new("selector").required(true).args(["tag", "branch", "commit"])))]
    Add {
        /// Git URL
        url: String,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        branch: Option<String>,

        #[arg(long)]
        commit: Option<String>,

        /// Library name (derived from the URL if omitted)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a library from the manifest and disk
    Remove { name: String },

    /// List libraries in the manifest
    List,

    /// Install one library, or all of them
    Install { name: Option<String> },

    /// Re-fetch installed libraries
    Update { name: Option<String> },

    /// Print libraries in dependency order
    Resolve {
        /// Install missing libraries to discover their dependencies
        #[arg(long)]
        fetch: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Yaml,
}

fn parse_tool(s: &str) -> Result<Tool, String> {
    s.parse()
}

fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    Overrides::parse_assignment(s).ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))
}
