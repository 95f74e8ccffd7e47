//! CLI module for covercrew
//!
//! Provides the lifecycle commands:
//! - `install`: Prepare the runtime, models and virtual environment
//! - `run`: Launch the application against the local runtime
//! - `doctor`: Read-only diagnostics

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod context;
pub mod doctor;
pub mod install;
pub mod run;

/// Local launcher for the cover-letter crew
#[derive(Parser, Debug)]
#[command(name = "covercrew")]
#[command(about = "Install and run the local cover-letter crew")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Project directory containing main.py (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Required model; repeat to require several (replaces the configured list)
    #[arg(long = "model", global = true, value_name = "NAME")]
    pub models: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install Ollama, pull models and create the virtual environment
    Install {
        /// Run the Ollama installer even if it is already on PATH
        #[arg(long)]
        reinstall: bool,
    },
    /// Start the application (arguments after `--` are passed to it)
    Run {
        #[arg(last = true, value_name = "ARGS")]
        args: Vec<String>,
    },
    /// Run system diagnostics
    Doctor,
}

/// Run the CLI command, returning the process exit code
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let ctx = context::Context::load(&cli.global)?;

    match cli.command {
        Commands::Install { reinstall } => install::run(&ctx, reinstall).await,
        Commands::Run { args } => run::run(&ctx, args).await,
        Commands::Doctor => doctor::run(&ctx).await,
    }
}
