//! # Structural Check
//!
//! Rules, in the order they are applied:
//!
//! 1. The document must parse and have a `process` object; otherwise
//!    checking stops with that single error.
//! 2. `process` needs `id`, `name` and `elements`, each reported on its own.
//! 3. Events, activities and gateways need `id` and `type`. Boundary
//!    events also need `attachedToRef`; activities need `name`, and an
//!    activity `agent` needs `type` and `strategy`.
//! 4. Sequence flows need `id`, `sourceRef` and `targetRef`, and both refs
//!    must name an element declared in step 3.
//!
//! Ids form a single namespace across events, activities and gateways.
//! Duplicate ids are not reported. Ids and refs match only when they are
//! equal JSON values, so the number `1` and the string `"1"` differ.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ElementKind, StructuralError};

/// Stand-in for the id of an element that has none.
const UNKNOWN_ID: &str = "?";

type Element = Map<String, Value>;

/// Outcome of checking one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    /// The checked document.
    pub path: PathBuf,
    /// Every problem found, in discovery order.
    pub errors: Vec<StructuralError>,
}

impl DocumentReport {
    /// Returns true if no problems were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check the BPMN document at `path`. An empty result means it is valid.
pub fn check(path: &Path) -> Vec<StructuralError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return vec![StructuralError::Load(e.to_string())],
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(document) => check_value(&document),
        Err(e) => vec![StructuralError::Load(e.to_string())],
    }
}

/// Check an already parsed BPMN document.
pub fn check_value(document: &Value) -> Vec<StructuralError> {
    let Some(process) = document.get("process") else {
        return vec![StructuralError::MissingProcess];
    };
    let Some(process) = process.as_object() else {
        return vec![StructuralError::ProcessNotAnObject];
    };

    let mut errors = Vec::new();
    for field in ["id", "name"] {
        if !process.contains_key(field) {
            errors.push(StructuralError::ProcessMissingField(field));
        }
    }
    match process.get("elements") {
        None => errors.push(StructuralError::ProcessMissingField("elements")),
        Some(Value::Object(elements)) => check_elements(elements, &mut errors),
        Some(_) => errors.push(StructuralError::WrongType {
            field: "elements",
            expected: "an object",
        }),
    }
    errors
}

/// Check every document in `paths`, in order.
pub fn check_all(paths: &[PathBuf]) -> Vec<DocumentReport> {
    paths
        .iter()
        .map(|path| {
            let errors = check(path);
            tracing::debug!(
                path = %path.display(),
                errors = errors.len(),
                "checked document structure"
            );
            DocumentReport {
                path: path.clone(),
                errors,
            }
        })
        .collect()
}

fn check_elements(elements: &Element, errors: &mut Vec<StructuralError>) {
    let mut ids = HashSet::new();

    for event in members(elements, ElementKind::Event, errors) {
        let id = declare(event, ElementKind::Event, &mut ids, errors);
        require(event, ElementKind::Event, &id, "type", errors);
        if event.get("type").and_then(Value::as_str) == Some("boundaryEvent") {
            require(event, ElementKind::BoundaryEvent, &id, "attachedToRef", errors);
        }
    }

    for activity in members(elements, ElementKind::Activity, errors) {
        let id = declare(activity, ElementKind::Activity, &mut ids, errors);
        require(activity, ElementKind::Activity, &id, "name", errors);
        require(activity, ElementKind::Activity, &id, "type", errors);
        if let Some(agent) = activity.get("agent") {
            for field in ["type", "strategy"] {
                if !agent.as_object().is_some_and(|a| a.contains_key(field)) {
                    errors.push(StructuralError::AgentMissingField {
                        activity: id.clone(),
                        field,
                    });
                }
            }
        }
    }

    for gateway in members(elements, ElementKind::Gateway, errors) {
        let id = declare(gateway, ElementKind::Gateway, &mut ids, errors);
        require(gateway, ElementKind::Gateway, &id, "type", errors);
    }

    // Flows go last: every declared id must be known before refs resolve.
    for flow in members(elements, ElementKind::SequenceFlow, errors) {
        let id = match flow.get("id") {
            Some(id) => render(id),
            None => {
                errors.push(StructuralError::MissingId {
                    kind: ElementKind::SequenceFlow,
                    element: Value::Object(flow.clone()),
                });
                UNKNOWN_ID.to_string()
            }
        };
        for field in ["sourceRef", "targetRef"] {
            match flow.get(field) {
                None => errors.push(StructuralError::MissingField {
                    kind: ElementKind::SequenceFlow,
                    id: id.clone(),
                    field,
                }),
                Some(reference) => {
                    if !ids.contains(&id_key(reference)) {
                        errors.push(StructuralError::UnknownReference {
                            flow: id.clone(),
                            field,
                            value: render(reference),
                        });
                    }
                }
            }
        }
    }
}

/// The object members of one `elements` collection. A collection that is
/// not an array, or members that are not objects, are reported and skipped.
fn members<'a>(
    elements: &'a Element,
    kind: ElementKind,
    errors: &mut Vec<StructuralError>,
) -> Vec<&'a Element> {
    let Some(collection) = elements.get(kind.collection()) else {
        return Vec::new();
    };
    let Some(items) = collection.as_array() else {
        errors.push(StructuralError::WrongType {
            field: kind.collection(),
            expected: "an array",
        });
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let member = item.as_object();
            if member.is_none() {
                errors.push(StructuralError::NotAnObject {
                    kind,
                    index,
                    element: item.clone(),
                });
            }
            member
        })
        .collect()
}

/// Record the element's id and return it for messages, or `?` after
/// reporting it missing.
fn declare(
    element: &Element,
    kind: ElementKind,
    ids: &mut HashSet<String>,
    errors: &mut Vec<StructuralError>,
) -> String {
    match element.get("id") {
        Some(id) => {
            ids.insert(id_key(id));
            render(id)
        }
        None => {
            errors.push(StructuralError::MissingId {
                kind,
                element: Value::Object(element.clone()),
            });
            UNKNOWN_ID.to_string()
        }
    }
}

fn require(
    element: &Element,
    kind: ElementKind,
    id: &str,
    field: &'static str,
    errors: &mut Vec<StructuralError>,
) {
    if !element.contains_key(field) {
        errors.push(StructuralError::MissingField {
            kind,
            id: id.to_string(),
            field,
        });
    }
}

/// Set key for an id or ref: its compact JSON text, which keeps the value's
/// type.
fn id_key(value: &Value) -> String {
    value.to_string()
}

/// Strings as-is, anything else as JSON text. For messages only.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
