//! Integration test: combine the repository's modular BPMN schemas and
//! validate the sample workflows in `test-data/` against the result.

use std::path::{Path, PathBuf};

use bpmn_schema::{
    collect_refs, combine, CombineError, RefRewriter, SchemaValidationError, SchemaValidator,
    SourceSchema,
};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

const MODULES: [&str; 6] = [
    "bpmn-common",
    "bpmn-flow-objects",
    "bpmn-connectors",
    "bpmn-artifacts",
    "bpmn-agents",
    "bpmn-process",
];

fn schema_paths() -> Vec<PathBuf> {
    let dir = repo_root().join("schemas");
    MODULES
        .iter()
        .map(|m| dir.join(format!("{m}.json")))
        .collect()
}

fn base_path() -> PathBuf {
    repo_root().join("schemas/bpmn-process.json")
}

#[test]
fn test_combined_schema_is_self_contained() {
    let combined = combine(&schema_paths(), &base_path()).unwrap();
    assert!(
        combined.unresolved_refs().is_empty(),
        "Dangling references: {:?}",
        combined.unresolved_refs()
    );
    for reference in collect_refs(combined.document()) {
        assert!(
            reference.starts_with("#/definitions/"),
            "Non-local reference survived combination: {reference}"
        );
    }
    assert!(combined.document().get("$id").is_none());
    assert_eq!(combined.document()["title"], "BPMN Process");
}

#[test]
fn test_definition_names_follow_module_prefixes() {
    let combined = combine(&schema_paths(), &base_path()).unwrap();
    let definitions = combined.definitions().unwrap();
    for key in [
        "process",
        "elements",
        "artifacts",
        "common_id",
        "flow-objects_event",
        "connectors_sequenceFlow",
        "artifacts_dataObject",
        "agents_agentAssignment",
    ] {
        assert!(definitions.contains_key(key), "missing definition '{key}'");
    }
    assert!(!definitions.contains_key("id"));
    assert!(!definitions.contains_key("bpmn-common_id"));
}

#[test]
fn test_every_source_reference_resolves_after_combination() {
    let paths = schema_paths();
    let combined = combine(&paths, &base_path()).unwrap();
    let definitions = combined.definitions().unwrap();
    let rewriter = RefRewriter::new("bpmn-process");

    let mut checked = 0usize;
    for path in &paths {
        let source = SourceSchema::load(path).unwrap();
        let document = serde_json::to_value(source.definitions()).unwrap();
        for reference in collect_refs(&document) {
            let Some(local) = rewriter.rewrite(reference) else {
                continue;
            };
            let name = local.trim_start_matches("#/definitions/");
            assert!(
                definitions.contains_key(name),
                "{reference} in {} rewrote to {local}, which is not defined",
                path.display()
            );
            checked += 1;
        }
    }
    assert!(checked >= 30, "Expected >= 30 cross-module refs, found {checked}");
}

#[test]
fn test_write_uses_two_space_indentation() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bpmn-combined.json");
    let combined = combine(&schema_paths(), &base_path()).unwrap();
    combined.write_to(&out).unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    let second_line = written.lines().nth(1).unwrap();
    assert!(
        second_line.starts_with("  \"") && !second_line.starts_with("   "),
        "Expected 2-space indentation, got: {second_line:?}"
    );
    let reread: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(&reread, combined.document());
    assert!(!dir.path().join("bpmn-combined.json.tmp").exists());
}

#[test]
fn test_missing_schema_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bpmn-combined.json");
    let mut paths = schema_paths();
    let missing = repo_root().join("schemas/bpmn-missing.json");
    paths.insert(2, missing.clone());

    let err = combine(&paths, &base_path()).unwrap_err();
    match &err {
        CombineError::Read { path, .. } => assert_eq!(path, &missing.display().to_string()),
        other => panic!("Expected Read error, got: {other}"),
    }
    assert!(err.to_string().contains("bpmn-missing.json"));
    assert!(!out.exists());
}

#[test]
fn test_malformed_schema_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("bpmn-process.json");
    let broken = dir.path().join("bpmn-common.json");
    std::fs::write(&base, r#"{"definitions": {}}"#).unwrap();
    std::fs::write(&broken, r#"{"definitions": {"#).unwrap();

    let err = combine(&[broken.clone(), base.clone()], &base).unwrap_err();
    assert!(
        matches!(err, CombineError::Parse { ref path, .. } if path.ends_with("bpmn-common.json")),
        "Expected Parse error, got: {err}"
    );
}

#[test]
fn test_base_must_be_listed() {
    let paths = schema_paths();
    let err = combine(&paths[..2], &base_path()).unwrap_err();
    assert!(matches!(err, CombineError::BaseNotListed { .. }));
}

fn builtin_validator() -> SchemaValidator {
    let combined = combine(&schema_paths(), &base_path()).unwrap();
    SchemaValidator::from_value("bpmn-combined.json", combined.document()).unwrap()
}

fn sample(name: &str) -> PathBuf {
    repo_root().join("test-data").join(name)
}

#[test]
fn test_valid_samples_pass_builtin_validation() {
    let validator = builtin_validator();
    for name in [
        "simple-process.json",
        "parallel-gateway.json",
        "exclusive-gateway.json",
        "subprocess.json",
        "ai-human-collab.json",
        "dynamic-assignment.json",
    ] {
        if let Err(e) = validator.validate_file(&sample(name)) {
            panic!("{name} should be valid: {e}");
        }
    }
}

#[test]
fn test_invalid_sample_fails_builtin_validation() {
    let validator = builtin_validator();
    let err = validator
        .validate_file(&sample("invalid-bpmn.json"))
        .unwrap_err();
    match &err {
        SchemaValidationError::ValidationFailed { violations, .. } => {
            let has_strategy = violations
                .violations()
                .iter()
                .any(|v| v.instance_path.contains("activities") && v.message.contains("strategy"));
            assert!(has_strategy, "Expected a 'strategy' violation, got:\n{violations}");
        }
        other => panic!("Expected ValidationFailed, got: {other}"),
    }
}

#[test]
fn test_missing_sample_is_a_load_error() {
    let validator = builtin_validator();
    let err = validator
        .validate_file(Path::new("/nonexistent/sample.json"))
        .unwrap_err();
    assert!(matches!(err, SchemaValidationError::DocumentLoadError { .. }));
}
