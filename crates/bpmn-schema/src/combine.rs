//! # Schema Combination
//!
//! Folds the modular BPMN schemas into a single self-contained document.
//!
//! ## Naming
//!
//! Definitions from the base module (normally `bpmn-process.json`) keep
//! their names. Definitions from every other module are prefixed with the
//! module's short name minus the `bpmn-` prefix, so `event` from
//! `bpmn-flow-objects.json` becomes `flow-objects_event`.
//!
//! ## Reference Rewriting
//!
//! A `$ref` of the form `bpmn-<module>.json#/definitions/<name>` becomes
//! `#/definitions/<renamed>` using the same naming rule. Every other `$ref`
//! (already-local pointers, unrelated URIs) is left untouched.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

/// File-name prefix shared by all modular schemas.
pub const SCHEMA_NAME_PREFIX: &str = "bpmn-";

/// JSON Pointer prefix of a reference into a `definitions` map.
pub const DEFINITIONS_POINTER: &str = "#/definitions/";

/// Error while loading, merging or writing schemas.
#[derive(Error, Debug)]
pub enum CombineError {
    /// A schema file could not be read.
    #[error("cannot read schema '{path}': {source}")]
    Read {
        /// Path of the schema file.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A schema file is not valid JSON.
    #[error("invalid JSON in schema '{path}': {source}")]
    Parse {
        /// Path of the schema file.
        path: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A schema file parsed, but its root is not an object.
    #[error("schema '{path}' is not a JSON object")]
    NotAnObject {
        /// Path of the schema file.
        path: String,
    },

    /// A schema carries a `definitions` value that is not an object.
    #[error("'definitions' in schema '{path}' is not an object")]
    InvalidDefinitions {
        /// Path of the schema file.
        path: String,
    },

    /// The base schema is not one of the schemas being combined.
    #[error("base schema '{path}' is not among the schemas to combine")]
    BaseNotListed {
        /// Path of the requested base schema.
        path: String,
    },

    /// Two source definitions map to the same merged key.
    #[error("definition '{key}' from '{second}' collides with one from '{first}'")]
    DefinitionCollision {
        /// The merged key both definitions map to.
        key: String,
        /// Short name of the schema that claimed the key first.
        first: String,
        /// Short name of the schema that tried to claim it again.
        second: String,
    },

    /// The combined document could not be serialized.
    #[error("cannot serialize combined schema: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The combined document could not be written.
    #[error("cannot write combined schema '{path}': {source}")]
    Write {
        /// Destination path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// One modular schema, loaded and checked for shape.
#[derive(Debug, Clone)]
pub struct SourceSchema {
    /// Where the schema was loaded from.
    pub path: PathBuf,
    /// File stem, e.g. `bpmn-common`. Also the token `$ref`s use to name
    /// this schema once `.json` is dropped.
    pub short_name: String,
    document: Map<String, Value>,
}

impl SourceSchema {
    /// Read and parse a schema file.
    ///
    /// # Errors
    ///
    /// Returns `CombineError::Read` or `CombineError::Parse` naming the
    /// path, or a shape error from [`SourceSchema::from_value`].
    pub fn load(path: &Path) -> Result<Self, CombineError> {
        let content = std::fs::read_to_string(path).map_err(|source| CombineError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| CombineError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        let schema = Self::from_value(path, value)?;
        tracing::debug!(
            path = %path.display(),
            definitions = schema.definitions().map_or(0, Map::len),
            "loaded schema module"
        );
        Ok(schema)
    }

    /// Wrap an already parsed schema. The short name is the stem of `path`.
    pub fn from_value(path: impl Into<PathBuf>, value: Value) -> Result<Self, CombineError> {
        let path = path.into();
        let Value::Object(document) = value else {
            return Err(CombineError::NotAnObject {
                path: path.display().to_string(),
            });
        };
        if document.get("definitions").is_some_and(|d| !d.is_object()) {
            return Err(CombineError::InvalidDefinitions {
                path: path.display().to_string(),
            });
        }
        let short_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            path,
            short_name,
            document,
        })
    }

    /// The schema's `definitions` map, if it has one.
    pub fn definitions(&self) -> Option<&Map<String, Value>> {
        self.document.get("definitions").and_then(Value::as_object)
    }

    /// The prefix this schema's definitions receive when it is not the base.
    pub fn renamed_prefix(&self) -> &str {
        renamed_prefix(&self.short_name)
    }
}

/// Strip the leading `bpmn-` from a schema short name.
pub fn renamed_prefix(short_name: &str) -> &str {
    short_name
        .strip_prefix(SCHEMA_NAME_PREFIX)
        .unwrap_or(short_name)
}

/// Maps cross-module `$ref` values onto the merged `definitions` map.
#[derive(Debug, Clone, Copy)]
pub struct RefRewriter<'a> {
    base_name: &'a str,
}

impl<'a> RefRewriter<'a> {
    /// A rewriter for a combination whose base schema has `base_name` as
    /// its short name.
    pub fn new(base_name: &'a str) -> Self {
        Self { base_name }
    }

    /// Rewrite one `$ref` value, or `None` if it is not a cross-module
    /// reference and must stay as it is.
    pub fn rewrite(&self, reference: &str) -> Option<String> {
        if !reference.starts_with(SCHEMA_NAME_PREFIX) {
            return None;
        }
        let mut parts = reference.split(DEFINITIONS_POINTER);
        let (file, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(file), Some(name), None) => (file, name),
            _ => return None,
        };
        let source = file.strip_suffix(".json").unwrap_or(file);
        let resolved = if source == self.base_name {
            name.to_string()
        } else {
            format!("{}_{name}", renamed_prefix(source))
        };
        Some(format!("{DEFINITIONS_POINTER}{resolved}"))
    }
}

/// Return a copy of `value` with every cross-module `$ref` rewritten.
///
/// Walks objects and arrays to any depth. Keys other than `$ref` are kept
/// as they are; a `$ref` whose value is not a string is walked like any
/// other value.
pub fn rewrite_refs(value: &Value, rewriter: &RefRewriter<'_>) -> Value {
    match value {
        Value::Object(map) => Value::Object(rewrite_object(map, rewriter)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rewrite_refs(item, rewriter))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

fn rewrite_object(map: &Map<String, Value>, rewriter: &RefRewriter<'_>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let rewritten = match (key.as_str(), value) {
                ("$ref", Value::String(reference)) => rewriter
                    .rewrite(reference)
                    .map_or_else(|| value.clone(), Value::String),
                _ => rewrite_refs(value, rewriter),
            };
            (key.clone(), rewritten)
        })
        .collect()
}

/// Every string `$ref` value in `value`, in document order.
pub fn collect_refs(value: &Value) -> Vec<&str> {
    let mut refs = Vec::new();
    collect_refs_into(value, &mut refs);
    refs
}

fn collect_refs_into<'v>(value: &'v Value, refs: &mut Vec<&'v str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(reference)) => refs.push(reference),
                    _ => collect_refs_into(child, refs),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs_into(item, refs);
            }
        }
        _ => {}
    }
}

/// The single schema produced by [`combine`].
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedSchema {
    document: Value,
}

impl CombinedSchema {
    /// The combined schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Consume self and return the document.
    pub fn into_value(self) -> Value {
        self.document
    }

    /// The merged `definitions` map.
    pub fn definitions(&self) -> Option<&Map<String, Value>> {
        self.document.get("definitions").and_then(Value::as_object)
    }

    /// Local `#/definitions/<name>` references whose target is missing from
    /// the merged `definitions`, sorted and deduplicated.
    pub fn unresolved_refs(&self) -> Vec<String> {
        let empty = Map::new();
        let definitions = self.definitions().unwrap_or(&empty);
        collect_refs(&self.document)
            .into_iter()
            .filter(|reference| {
                reference
                    .strip_prefix(DEFINITIONS_POINTER)
                    .map(|pointer| {
                        let name = pointer.split('/').next().unwrap_or(pointer);
                        let name = name.replace("~1", "/").replace("~0", "~");
                        !definitions.contains_key(&name)
                    })
                    .unwrap_or(false)
            })
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Serialize with 2-space indentation and write to `path`.
    ///
    /// The document is written to a sibling `.tmp` file first and renamed
    /// into place, so `path` never holds a partial schema.
    pub fn write_to(&self, path: &Path) -> Result<(), CombineError> {
        let rendered = serde_json::to_string_pretty(&self.document)?;
        let staging = path.with_extension("json.tmp");
        let write_err = |source: std::io::Error| CombineError::Write {
            path: path.display().to_string(),
            source,
        };
        std::fs::write(&staging, rendered).map_err(write_err)?;
        std::fs::rename(&staging, path).map_err(write_err)?;
        tracing::debug!(path = %path.display(), "wrote combined schema");
        Ok(())
    }
}

/// Load `paths` and combine them, with `base` as the base schema.
///
/// # Errors
///
/// Any unreadable or malformed schema, a `base` that is not in `paths`, or
/// a definitions collision aborts the whole combination.
pub fn combine(paths: &[PathBuf], base: &Path) -> Result<CombinedSchema, CombineError> {
    let base_index = paths
        .iter()
        .position(|p| p.as_path() == base)
        .ok_or_else(|| CombineError::BaseNotListed {
            path: base.display().to_string(),
        })?;
    let sources = paths
        .iter()
        .map(|p| SourceSchema::load(p))
        .collect::<Result<Vec<_>, _>>()?;
    combine_sources(&sources, base_index)
}

/// Combine already loaded schemas; `sources[base_index]` is the base.
pub fn combine_sources(
    sources: &[SourceSchema],
    base_index: usize,
) -> Result<CombinedSchema, CombineError> {
    let base = sources
        .get(base_index)
        .ok_or_else(|| CombineError::BaseNotListed {
            path: format!("#{base_index}"),
        })?;

    let mut definitions = Map::new();
    let mut origins: HashMap<String, &str> = HashMap::new();
    for (index, source) in sources.iter().enumerate() {
        let Some(source_definitions) = source.definitions() else {
            continue;
        };
        for (name, definition) in source_definitions {
            let key = if index == base_index {
                name.clone()
            } else {
                format!("{}_{name}", source.renamed_prefix())
            };
            if let Some(first) = origins.insert(key.clone(), &source.short_name) {
                return Err(CombineError::DefinitionCollision {
                    key,
                    first: first.to_string(),
                    second: source.short_name.clone(),
                });
            }
            definitions.insert(key, definition.clone());
        }
    }

    let mut combined = base.document.clone();
    combined.insert("definitions".to_string(), Value::Object(definitions));

    let rewriter = RefRewriter::new(&base.short_name);
    let mut combined = rewrite_object(&combined, &rewriter);
    combined.remove("$id");

    tracing::debug!(
        base = %base.short_name,
        sources = sources.len(),
        definitions = origins.len(),
        "combined schema modules"
    );
    Ok(CombinedSchema {
        document: Value::Object(combined),
    })
}
