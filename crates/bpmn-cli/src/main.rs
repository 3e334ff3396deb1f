//! # bpmn CLI entry point
//!
//! Parses command-line arguments, loads the tool configuration, and
//! dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bpmn_cli::check::{run_check, CheckArgs};
use bpmn_cli::combine::{run_combine, CombineArgs};
use bpmn_cli::config::ToolConfig;

/// BPMN workflow schema tooling.
///
/// Combines the modular BPMN-JSON schemas into one self-contained schema
/// and checks sample workflows against it or against the structural rules.
#[derive(Parser, Debug)]
#[command(name = "bpmn", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML file overriding the default schema and sample lists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that relative schema and sample paths resolve against.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Combine the modular schemas and validate samples against the result.
    Combine(CombineArgs),

    /// Check the structure of workflow documents without a schema engine.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = load_config(&cli).and_then(|config| match &cli.command {
        Commands::Combine(args) => run_combine(args, &config),
        Commands::Check(args) => run_check(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// The configured lists, rebased onto `--root` when one is given.
fn load_config(cli: &Cli) -> anyhow::Result<ToolConfig> {
    let config = match &cli.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    Ok(match &cli.root {
        Some(root) => {
            tracing::debug!(root = %root.display(), "resolving paths against root");
            config.rooted_at(root)
        }
        None => config,
    })
}
