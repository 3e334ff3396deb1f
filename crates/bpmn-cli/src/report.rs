//! # Console Reports
//!
//! Human-readable pass/fail lines. Not a machine-readable contract.

use bpmn_schema::{SampleOutcome, Verdict};
use bpmn_structure::DocumentReport;

/// Glyph for a document that passed.
pub const PASS: &str = "✓";
/// Glyph for a document that failed.
pub const FAIL: &str = "✗";

/// One structural-check result: a status line, then one indented line per
/// problem.
pub fn render_structure_report(report: &DocumentReport) -> String {
    let path = report.path.display();
    if report.is_valid() {
        return format!("{PASS} {path} - VALID");
    }
    let mut out = format!("{FAIL} {path} - INVALID");
    for error in &report.errors {
        out.push_str(&format!("\n  - {error}"));
    }
    out
}

/// One schema-validation result, followed by the validator's diagnostics
/// exactly as it emitted them when it failed.
pub fn render_sample_outcome(outcome: &SampleOutcome) -> String {
    let path = outcome.path.display();
    match &outcome.verdict {
        Verdict::Valid => format!("{PASS} {path} is valid"),
        Verdict::Invalid { diagnostics } => {
            format!("{FAIL} {path} validation failed:\n{diagnostics}")
        }
        Verdict::NotRun { reason } => format!("{FAIL} {path} validation failed:\n{reason}"),
    }
}

/// Closing tally.
pub fn render_summary(valid: usize, total: usize) -> String {
    format!("{valid} of {total} documents valid")
}
