//! # bpmn-cli: Command-Line Interface for the BPMN Workflow Schema
//!
//! Provides the `bpmn` command, replacing the `scripts/test-bpmn-combined.py`
//! and `scripts/test-bpmn-json.py` helpers.
//!
//! ## Subcommands
//!
//! - `bpmn combine`: combine the modular schemas into
//!   `schemas/bpmn-combined.json` and validate the sample workflows
//!   against it.
//! - `bpmn check`: structural check of sample workflows, no schema
//!   engine involved.
//!
//! Run without further arguments, each subcommand works through the file
//! lists in [`config::ToolConfig`], as the scripts did:
//!
//! ```bash
//! bpmn combine
//! bpmn combine --backend builtin test-data/subprocess.json
//! bpmn check --strict test-data/invalid-bpmn.json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; combination and checking live in
//!   `bpmn-schema` and `bpmn-structure`.
//! - Reports go to stdout; diagnostics go through `tracing` to stderr.

pub mod check;
pub mod combine;
pub mod config;
pub mod report;

use std::path::{Path, PathBuf};

/// Resolve `path` against `root` unless it is already absolute.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Process exit status for a finished run. Invalid documents only fail
/// the run in strict mode.
pub fn exit_code(strict: bool, all_valid: bool) -> u8 {
    u8::from(strict && !all_valid)
}
