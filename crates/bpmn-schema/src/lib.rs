//! # bpmn-schema: Schema Combination & Validation
//!
//! The BPMN workflow schema is maintained as several modular JSON Schema
//! files (`bpmn-common.json`, `bpmn-flow-objects.json`, ...) that point
//! into each other with `$ref`s of the form
//! `bpmn-<module>.json#/definitions/<name>`. Most validators cannot follow
//! those file-relative pointers offline, so this crate folds the modules
//! into one document.
//!
//! ## Combination (`combine`)
//!
//! - [`combine`] loads every module, merges the `definitions` maps under a
//!   collision-free naming scheme and rewrites cross-module `$ref`s into
//!   local `#/definitions/...` pointers.
//! - [`rewrite_refs`] is the underlying pure tree transform.
//! - [`CombinedSchema::unresolved_refs`] reports local pointers left
//!   dangling after the merge.
//!
//! ## Validation (`external`, `validate`)
//!
//! - [`validate_against`] runs an external validator (by default `ajv`)
//!   once per sample document and classifies the exit status.
//! - [`SchemaValidator`] compiles the combined schema with the `jsonschema`
//!   crate for in-process validation with structured violations.
//!
//! ## Crate Policy
//!
//! - Combination is all-or-nothing: no output is written unless every
//!   module loaded and merged cleanly.
//! - Validation of one sample never prevents validation of the next.

pub mod combine;
pub mod external;
pub mod validate;

pub use combine::{
    collect_refs, combine, combine_sources, renamed_prefix, rewrite_refs, CombineError,
    CombinedSchema, RefRewriter, SourceSchema, DEFINITIONS_POINTER, SCHEMA_NAME_PREFIX,
};
pub use external::{validate_against, ExternalValidator, SampleOutcome, Verdict};
pub use validate::{SchemaValidationError, SchemaValidator, ValidationViolations, Violation};
