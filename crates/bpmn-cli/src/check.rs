//! # Check Subcommand
//!
//! Structural validation of BPMN-JSON documents.
//! Preserves the output of `python scripts/test-bpmn-json.py`.

use std::path::PathBuf;

use bpmn_structure::check_all;
use clap::Args;

use crate::config::ToolConfig;
use crate::report::{render_structure_report, render_summary};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Documents to check. Defaults to the configured structure samples.
    pub paths: Vec<PathBuf>,

    /// Exit with status 1 if any document is invalid.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, config: &ToolConfig) -> anyhow::Result<u8> {
    let paths = if args.paths.is_empty() {
        &config.structure_samples
    } else {
        &args.paths
    };

    println!("BPMN JSON Structure Validation");
    println!("{}", "=".repeat(50));

    let reports = check_all(paths);
    for report in &reports {
        println!("\nTesting {}...", report.path.display());
        println!("{}", render_structure_report(report));
    }

    let valid = reports.iter().filter(|r| r.is_valid()).count();
    println!("\n{}", render_summary(valid, reports.len()));
    if valid < reports.len() {
        tracing::info!(invalid = reports.len() - valid, "structural check found invalid documents");
    }

    Ok(crate::exit_code(args.strict, valid == reports.len()))
}
