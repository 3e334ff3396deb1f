//! # Structural Errors
//!
//! Each variant renders as the one-line message printed under a failing
//! document.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Kind of element a problem was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Entry of `elements.events`.
    Event,
    /// Event whose `type` is `boundaryEvent`.
    BoundaryEvent,
    /// Entry of `elements.activities`.
    Activity,
    /// Entry of `elements.gateways`.
    Gateway,
    /// Entry of `elements.sequenceFlows`.
    SequenceFlow,
}

impl ElementKind {
    /// Key of the `elements` array this kind lives in.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Event | Self::BoundaryEvent => "events",
            Self::Activity => "activities",
            Self::Gateway => "gateways",
            Self::SequenceFlow => "sequenceFlows",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Event => "Event",
            Self::BoundaryEvent => "Boundary event",
            Self::Activity => "Activity",
            Self::Gateway => "Gateway",
            Self::SequenceFlow => "Sequence flow",
        })
    }
}

/// A structural problem in a BPMN document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    /// The file could not be read or is not JSON.
    #[error("Failed to load JSON: {0}")]
    Load(String),

    /// The document has no `process` key.
    #[error("Missing 'process' root element")]
    MissingProcess,

    /// `process` is present but is not an object.
    #[error("'process' root element is not an object")]
    ProcessNotAnObject,

    /// A required `process` field is absent.
    #[error("Process missing '{0}' field")]
    ProcessMissingField(&'static str),

    /// `process.elements`, or one of its collections, has the wrong type.
    #[error("Process '{field}' must be {expected}")]
    WrongType {
        /// The offending key.
        field: &'static str,
        /// `"an object"` or `"an array"`.
        expected: &'static str,
    },

    /// A collection member is not an object.
    #[error("{kind} at {}[{index}] is not an object: {element}", .kind.collection())]
    NotAnObject {
        /// Kind of element expected.
        kind: ElementKind,
        /// Position in its collection.
        index: usize,
        /// The raw member.
        element: Value,
    },

    /// An element has no `id`; the raw element is kept for diagnosis.
    #[error("{kind} missing 'id': {element}")]
    MissingId {
        /// Kind of element.
        kind: ElementKind,
        /// The raw element.
        element: Value,
    },

    /// An element lacks a required field other than `id`.
    #[error("{kind} {id} missing '{field}'")]
    MissingField {
        /// Kind of element.
        kind: ElementKind,
        /// The element's id, or `?` if it has none.
        id: String,
        /// The missing field.
        field: &'static str,
    },

    /// An activity's `agent` lacks a required field.
    #[error("Activity {activity} agent missing '{field}'")]
    AgentMissingField {
        /// The activity's id, or `?`.
        activity: String,
        /// `type` or `strategy`.
        field: &'static str,
    },

    /// A sequence flow points at an undeclared element.
    #[error("Sequence flow {flow} has invalid {field}: {value}")]
    UnknownReference {
        /// The flow's id, or `?`.
        flow: String,
        /// `sourceRef` or `targetRef`.
        field: &'static str,
        /// The unresolved reference.
        value: String,
    },
}
