//! # External Validator
//!
//! Runs a command-line JSON Schema validator once per sample document and
//! classifies the result by exit status. The validator is a black box:
//! zero exit status means valid, anything else means invalid, and its
//! error stream is passed through verbatim.
//!
//! The default invocation is `ajv validate -s <schema> -d <document>`.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

/// How to invoke the external validator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalValidator {
    /// Executable to run.
    pub program: String,
    /// Arguments placed before the schema and document.
    pub args: Vec<String>,
    /// Flag preceding the schema path; `None` passes it positionally.
    pub schema_flag: Option<String>,
    /// Flag preceding the document path; `None` passes it positionally.
    pub document_flag: Option<String>,
}

impl Default for ExternalValidator {
    fn default() -> Self {
        Self {
            program: "ajv".to_string(),
            args: vec!["validate".to_string()],
            schema_flag: Some("-s".to_string()),
            document_flag: Some("-d".to_string()),
        }
    }
}

/// Result of validating one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The validator exited successfully.
    Valid,
    /// The validator rejected the document.
    Invalid {
        /// The validator's error stream, verbatim.
        diagnostics: String,
    },
    /// The validator could not be started.
    NotRun {
        /// Why the process could not be spawned.
        reason: String,
    },
}

/// A sample document and the verdict reached for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOutcome {
    /// Path of the sample document.
    pub path: PathBuf,
    /// What the validator decided.
    pub verdict: Verdict,
}

impl SampleOutcome {
    /// Returns true if the sample was accepted.
    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }
}

impl ExternalValidator {
    /// Build the command that validates `document` against `schema`.
    pub fn command(&self, schema: &Path, document: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(flag) = &self.schema_flag {
            command.arg(flag);
        }
        command.arg(schema);
        if let Some(flag) = &self.document_flag {
            command.arg(flag);
        }
        command.arg(document);
        command
    }

    /// Run the validator to completion for one document.
    pub fn run(&self, schema: &Path, document: &Path) -> SampleOutcome {
        tracing::debug!(
            program = %self.program,
            schema = %schema.display(),
            document = %document.display(),
            "running external validator"
        );
        let verdict = match self.command(schema, document).output() {
            Ok(output) if output.status.success() => Verdict::Valid,
            Ok(output) => Verdict::Invalid {
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => Verdict::NotRun {
                reason: format!("cannot run '{}': {e}", self.program),
            },
        };
        SampleOutcome {
            path: document.to_path_buf(),
            verdict,
        }
    }
}

/// Validate each sample against the combined schema at `schema`, in order.
///
/// A failure on one sample, including failure to start the validator,
/// is recorded and the remaining samples are still validated.
pub fn validate_against(
    validator: &ExternalValidator,
    schema: &Path,
    samples: &[PathBuf],
) -> Vec<SampleOutcome> {
    samples
        .iter()
        .map(|sample| validator.run(schema, sample))
        .collect()
}
