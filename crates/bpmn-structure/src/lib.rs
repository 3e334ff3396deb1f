//! # bpmn-structure: Structural Checks for BPMN Documents
//!
//! Checks the shape of BPMN-JSON workflow documents without a schema
//! engine: required fields on the process and its flow elements, and that
//! every sequence flow connects two declared elements.
//!
//! ```json
//! {
//!   "process": {
//!     "id": "p1",
//!     "name": "Example",
//!     "elements": {
//!       "events": [{"id": "e1", "type": "startEvent"}],
//!       "activities": [{"id": "a1", "name": "Task", "type": "task"}],
//!       "sequenceFlows": [{"id": "f1", "sourceRef": "e1", "targetRef": "a1"}]
//!     }
//!   }
//! }
//! ```
//!
//! ## Entry Points
//!
//! - [`check`]: load a file and return every problem found.
//! - [`check_value`]: the same rules over an already parsed document.
//! - [`check_all`]: batch runner producing one [`DocumentReport`] per file.
//!
//! Problems are collected, not short-circuited, except when the document
//! cannot be parsed or has no `process` root.

pub mod check;
pub mod error;

pub use check::{check, check_all, check_value, DocumentReport};
pub use error::{ElementKind, StructuralError};
