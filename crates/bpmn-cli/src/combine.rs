//! # Combine Subcommand
//!
//! Combines the modular schemas, writes the result, and validates the
//! sample workflows against it.
//! Preserves the output of `python scripts/test-bpmn-combined.py`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bpmn_schema::{
    combine, validate_against, SampleOutcome, SchemaValidationError, SchemaValidator, Verdict,
};
use clap::{Args, ValueEnum};

use crate::config::ToolConfig;
use crate::report::{render_sample_outcome, render_summary};

/// Which validator checks the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// The configured command-line validator (`ajv` by default).
    External,
    /// The in-process `jsonschema` engine.
    Builtin,
}

/// Arguments for the combine subcommand.
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Sample documents to validate. Defaults to the configured samples.
    pub samples: Vec<PathBuf>,

    /// Write the combined schema here instead of the configured path.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Validator used for the samples.
    #[arg(long, value_enum, default_value_t = Backend::External)]
    pub backend: Backend,

    /// Write the combined schema without validating any samples.
    #[arg(long)]
    pub no_validate: bool,

    /// Exit with status 1 if any sample is invalid.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the combine subcommand.
///
/// Combination failures are fatal and leave no output behind. Sample
/// failures are reported and the remaining samples still run.
pub fn run_combine(args: &CombineArgs, config: &ToolConfig) -> anyhow::Result<u8> {
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| config.combined_output.clone());

    let combined =
        combine(&config.schemas, &config.base_schema).context("schema combination failed")?;
    for reference in combined.unresolved_refs() {
        tracing::warn!(%reference, "combined schema has a dangling reference");
    }
    combined.write_to(&out)?;
    println!("Created combined schema: {}", out.display());

    if args.no_validate {
        return Ok(0);
    }

    let samples = if args.samples.is_empty() {
        &config.combine_samples
    } else {
        &args.samples
    };

    println!("\nTesting validation with combined schema...");
    let outcomes = match args.backend {
        Backend::External => validate_against(&config.validator, &out, samples),
        Backend::Builtin => {
            let name = out.display().to_string();
            let validator = SchemaValidator::from_value(name, combined.document())
                .context("combined schema does not compile")?;
            samples
                .iter()
                .map(|sample| builtin_outcome(&validator, sample))
                .collect()
        }
    };

    for outcome in &outcomes {
        println!("\nValidating {}...", outcome.path.display());
        println!("{}", render_sample_outcome(outcome));
    }

    let valid = outcomes.iter().filter(|o| o.is_valid()).count();
    println!("\n{}", render_summary(valid, outcomes.len()));

    Ok(crate::exit_code(args.strict, valid == outcomes.len()))
}

fn builtin_outcome(validator: &SchemaValidator, sample: &Path) -> SampleOutcome {
    let verdict = match validator.validate_file(sample) {
        Ok(()) => Verdict::Valid,
        Err(SchemaValidationError::ValidationFailed { violations, .. }) => Verdict::Invalid {
            diagnostics: violations.to_string(),
        },
        Err(other) => Verdict::NotRun {
            reason: other.to_string(),
        },
    };
    SampleOutcome {
        path: sample.to_path_buf(),
        verdict,
    }
}
