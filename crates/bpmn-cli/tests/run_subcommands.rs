//! Runs both subcommands over the repository's schemas and sample workflows.

use std::path::PathBuf;

use bpmn_cli::check::{run_check, CheckArgs};
use bpmn_cli::combine::{run_combine, Backend, CombineArgs};
use bpmn_cli::config::ToolConfig;

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop();
    dir.pop();
    dir
}

fn config() -> ToolConfig {
    ToolConfig::default().rooted_at(&repo_root())
}

#[test]
fn check_over_defaults_succeeds_without_strict() {
    let args = CheckArgs {
        paths: vec![],
        strict: false,
    };
    assert_eq!(run_check(&args, &config()).unwrap(), 0);
}

#[test]
fn strict_check_over_defaults_fails_on_invalid_sample() {
    let args = CheckArgs {
        paths: vec![],
        strict: true,
    };
    assert_eq!(run_check(&args, &config()).unwrap(), 1);
}

#[test]
fn strict_check_of_valid_samples_succeeds() {
    let config = config();
    let args = CheckArgs {
        paths: config.combine_samples.clone(),
        strict: true,
    };
    assert_eq!(run_check(&args, &config).unwrap(), 0);
}

#[test]
fn strict_check_counts_unreadable_document_as_invalid() {
    let args = CheckArgs {
        paths: vec![repo_root().join("test-data/absent.json")],
        strict: true,
    };
    assert_eq!(run_check(&args, &config()).unwrap(), 1);
}

#[test]
fn combine_without_validation_writes_schema() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("combined.json");
    let args = CombineArgs {
        samples: vec![],
        out: Some(out.clone()),
        backend: Backend::External,
        no_validate: true,
        strict: true,
    };
    assert_eq!(run_combine(&args, &config()).unwrap(), 0);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert!(written.get("$id").is_none());
    assert!(written["definitions"]["agents_agentAssignment"].is_object());
}

#[test]
fn combine_with_unavailable_external_validator_fails_strict_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.validator.program = "bpmn-test-no-such-validator".to_string();
    let args = CombineArgs {
        samples: vec![],
        out: Some(dir.path().join("combined.json")),
        backend: Backend::External,
        no_validate: false,
        strict: true,
    };
    assert_eq!(run_combine(&args, &config).unwrap(), 1);
}
