//! ModelError: Unified error type for euclid-model public APIs
//!
//! This error type is used throughout the crate to provide robust,
//! non-panicking error handling for all public APIs. Interactive lookup
//! misses (typo'd IDs during delete/dependents queries) are deliberately
//! *not* routed through this type; those are recovered into a logged
//! diagnostic and a no-op so an exploratory session never crashes.

use crate::algebra::AlgebraError;
use crate::model::NodeId;
use thiserror::Error;

/// Unified error type for euclid-model operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An argument had the wrong geometric kind (e.g. a line where a point
    /// was required). Fatal for the call; never recovered.
    #[error("type contract violation: expected {expected}, found {found}")]
    TypeContract {
        expected: &'static str,
        found: &'static str,
    },
    /// No element with the given ID exists in this model.
    #[error("no element with id `{0}`")]
    UnknownId(String),
    /// A handle referenced a slot that is empty or out of range for this model.
    #[error("node {0} is not a member of this model")]
    NotAMember(NodeId),
    /// The requested construction collapses (coincident points, zero radius).
    #[error("degenerate construction: {0}")]
    Degenerate(&'static str),
    /// The exact value cannot be represented in the quadratic-surd field.
    #[error("value is not constructible in the quadratic-surd field: {0}")]
    NotConstructible(#[from] AlgebraError),
    /// Polynomial intersection beyond the exactly-solvable degree.
    #[error("polynomial intersection of degree {0} is not supported")]
    UnsupportedDegree(usize),
    /// A persisted value expression failed to parse.
    #[error("malformed value expression `{expr}`: {reason}")]
    MalformedValue { expr: String, reason: String },
    /// A persisted record referenced an ID or constituent with no
    /// corresponding record.
    #[error("record `{id}` references unresolved `{reference}`")]
    UnresolvedReference { id: String, reference: String },
    /// The model holds no points or circles to derive bounds from.
    #[error("model contains no geometric elements to determine limits")]
    EmptyModel,
    /// Underlying I/O failure while saving or loading a document.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// The persisted document itself is not valid JSON of the expected shape.
    #[error("failed to parse model document: {0}")]
    Document(#[from] serde_json::Error),
}
