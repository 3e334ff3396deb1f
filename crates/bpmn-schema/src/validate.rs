//! # In-Process Schema Validation
//!
//! Validates BPMN documents against the combined schema with the
//! `jsonschema` crate, as an alternative to shelling out to an external
//! validator.
//!
//! ## Schema Resolution
//!
//! The combined schema is self-contained: every cross-module `$ref` has
//! been rewritten to a local `#/definitions/<name>` pointer, which the
//! jsonschema crate resolves natively. Any remaining remote reference is
//! refused by [`OfflineRetriever`] instead of being fetched over the
//! network. The draft is taken from the schema's `$schema` keyword.

use std::fmt;
use std::path::Path;

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

/// Retriever that never leaves the process.
///
/// Validation runs offline, so a `$ref` to a remote resource is an error
/// in the schema rather than something to download.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("remote reference '{}' is not available offline", uri.as_str()).into())
    }
}

/// Why a document could not be validated in process.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The combined schema rejected the document.
    #[error("document rejected by schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name the schema was compiled under.
        schema_name: String,
        /// Every keyword failure, in the order the engine reported them.
        violations: ValidationViolations,
    },

    /// The document could not be read or is not JSON.
    #[error("cannot load document '{path}': {reason}")]
    DocumentLoadError {
        /// The document that failed to load.
        path: String,
        /// Read or parse failure.
        reason: String,
    },

    /// The combined schema does not compile, e.g. it names a remote `$ref`.
    #[error("cannot compile schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Name given to the schema, normally the path it was written to.
        schema_name: String,
        /// Compilation failure reported by `jsonschema`.
        reason: String,
    },
}

/// One keyword failure.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer into the document, empty for the root.
    pub instance_path: String,
    /// JSON Pointer to the failing keyword in the combined schema.
    pub schema_path: String,
    /// The engine's message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() {
            "/"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "{at}: {} ({})", self.message, self.schema_path)
    }
}

/// Non-empty list of failures for one document. Displays one per line.
#[derive(Debug, Clone)]
pub struct ValidationViolations(Vec<Violation>);

impl ValidationViolations {
    /// The individual failures.
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.0.iter();
        if let Some(first) = lines.next() {
            write!(f, "{first}")?;
        }
        for violation in lines {
            write!(f, "\n{violation}")?;
        }
        Ok(())
    }
}

/// A compiled combined schema backed by the `jsonschema` crate.
pub struct SchemaValidator {
    schema_name: String,
    validator: Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema_name", &self.schema_name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile an in-memory schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuildError` if the schema
    /// is invalid or references a remote resource.
    pub fn from_value(
        schema_name: impl Into<String>,
        schema: &Value,
    ) -> Result<Self, SchemaValidationError> {
        let schema_name = schema_name.into();
        let mut opts = jsonschema::options();
        opts.with_retriever(OfflineRetriever);
        let validator = opts
            .build(schema)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            schema_name,
            validator,
        })
    }

    /// Validate a parsed document, collecting every failure rather than
    /// stopping at the first.
    pub fn validate_document(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: self.schema_name.clone(),
                violations: ValidationViolations(violations),
            })
        }
    }

    /// Load a JSON document from `path` and validate it.
    pub fn validate_file(&self, path: &Path) -> Result<(), SchemaValidationError> {
        let load_err = |reason: String| SchemaValidationError::DocumentLoadError {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| load_err(format!("cannot read file: {e}")))?;
        let instance: Value = serde_json::from_str(&content)
            .map_err(|e| load_err(format!("invalid JSON: {e}")))?;
        self.validate_document(&instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["agent"],
            "properties": {"agent": {"$ref": "#/definitions/agents_agentAssignment"}},
            "definitions": {
                "agents_agentAssignment": {
                    "type": "object",
                    "required": ["type", "strategy"],
                    "properties": {
                        "type": {"type": "string", "enum": ["human", "ai"]},
                        "strategy": {"type": "string"}
                    }
                }
            }
        })
    }

    #[test]
    fn test_valid_document_passes() {
        let validator = SchemaValidator::from_value("agents", &agent_schema()).unwrap();
        validator
            .validate_document(&json!({"agent": {"type": "ai", "strategy": "static"}}))
            .unwrap();
    }

    #[test]
    fn test_missing_field_reported_with_path() {
        let validator = SchemaValidator::from_value("agents", &agent_schema()).unwrap();
        let err = validator
            .validate_document(&json!({"agent": {"type": "ai"}}))
            .unwrap_err();
        match &err {
            SchemaValidationError::ValidationFailed { violations, .. } => {
                assert_eq!(violations.violations().len(), 1);
                let v = &violations.violations()[0];
                assert_eq!(v.instance_path, "/agent");
                assert!(
                    v.message.contains("strategy"),
                    "Expected violation mentioning 'strategy', got: {}",
                    v.message
                );
            }
            other => panic!("Expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn test_remote_reference_is_refused() {
        let schema = json!({"$ref": "https://schemas.example.test/remote.json"});
        let err = SchemaValidator::from_value("remote", &schema).unwrap_err();
        assert!(
            matches!(err, SchemaValidationError::ValidatorBuildError { .. }),
            "Expected ValidatorBuildError, got: {err}"
        );
    }

    #[test]
    fn test_violation_display_format() {
        let v = Violation {
            instance_path: "/process/elements/events/0".to_string(),
            schema_path: "/definitions/flow-objects_event/required".to_string(),
            message: r#""type" is a required property"#.to_string(),
        };
        assert_eq!(
            v.to_string(),
            r#"/process/elements/events/0: "type" is a required property (/definitions/flow-objects_event/required)"#
        );
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""process" is a required property"#.to_string(),
        };
        assert!(v.to_string().starts_with("/: "));
    }

    #[test]
    fn test_violations_display_one_per_line() {
        let validator = SchemaValidator::from_value("agents", &agent_schema()).unwrap();
        let err = validator.validate_document(&json!({"agent": {}})).unwrap_err();
        let SchemaValidationError::ValidationFailed { violations, .. } = err else {
            panic!("Expected ValidationFailed, got: {err}");
        };
        assert_eq!(violations.violations().len(), 2);
        assert_eq!(violations.to_string().lines().count(), 2);
    }
}
