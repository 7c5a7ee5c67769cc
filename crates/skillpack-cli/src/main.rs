//! # skillpack
//!
//! Browse a repository of skills, resolve their dependencies and build the
//! download archives that ship them.
//!
//! This is the entry point: it parses arguments, sets up logging and the
//! panic hook, and dispatches to the command handlers.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use skillpack_core::error::{SkillError, SkillResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod hub;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Skill catalog, dependency resolver and archive packer
#[derive(Parser)]
#[command(name = "skillpack", version, about = "Resolve and package skills with their dependencies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Skill repository directory (overrides [repository] dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<Utf8PathBuf>,

    /// Configuration file to use instead of the nearest skillpack.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List skills, optionally filtered by a keyword
    List { keyword: Option<String> },
    /// Show a skill, its dependencies and how to install it
    Info { id: String },
    /// Print the full dependency tree of a skill
    Tree { id: String },
    /// Print the flattened dependency list of a skill
    Deps { id: String },
    /// Build (or reuse) the archive for a key: <id>, <id>-with-deps or all
    Pack {
        key: String,
        /// Copy the archive here as well
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Extract an archive, keeping files that already exist
    Unpack {
        archive: PathBuf,
        dest: PathBuf,
        /// Replace existing files
        #[arg(long)]
        overwrite: bool,
    },
    /// Report dependency cycles and references to unknown skills
    Check,
    /// Clone or pull the skill repository and rescan it
    Sync,
    /// Remove every cached archive
    Clean,
    /// Refresh periodically until interrupted
    Watch {
        /// Seconds between refreshes (overrides [refresh] interval_secs)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
        /// Stop after this many refreshes
        #[arg(long, value_name = "N")]
        runs: Option<usize>,
    },
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.global.verbose);
    setup_panic_handler();

    debug!("Starting skillpack v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&e));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> SkillResult<()> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| SkillError::Io {
        message: "Failed to create async runtime".to_string(),
        source: e,
    })?;

    rt.block_on(async {
        let ctx = CommandContext::new(&cli.global).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "skillpack={level},skillpack_core={level},skillpack_config={level},\
             skillpack_catalog={level},skillpack_resolver={level},skillpack_cache={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("skillpack encountered an unexpected error: {}", panic_info);
        eprintln!("skillpack crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/skillpack/skillpack/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
