//! Error types shared by every crate in the workspace.
//!
//! Errors fall into two families: [`SpecViolation`] when a JSON envelope
//! breaks the rules of the document model itself, and [`UsageError`] when the
//! caller asks for something that cannot work regardless of document content.

use thiserror::Error;

use crate::document::DocumentKind;
use crate::node::NodeId;

/// The JSON envelope is structurally invalid.
#[derive(Debug, Error)]
pub enum SpecViolation {
    /// The `type` field names a document kind we do not know.
    #[error("unknown type field: {0}")]
    UnknownType(String),

    /// The `type` field is absent. A non-string tag is [`UnknownType`](Self::UnknownType).
    #[error("missing type field on dictionary")]
    MissingType,

    /// The value being decoded is not a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A typed load decoded a different variant than the one requested.
    #[error("expected {expected}, read {actual} from {href}")]
    TypeMismatch {
        expected: DocumentKind,
        actual: DocumentKind,
        href: String,
    },
}

/// The caller misused the API.
#[derive(Debug, Error)]
pub enum UsageError {
    /// A link has neither an href nor a cached target.
    #[error("cannot resolve a link with no href")]
    UnresolvableLink,

    /// A link index is out of range for its owner.
    #[error("{id} has no link at index {index}")]
    NoSuchLink { id: String, index: usize },
    /// A relative href cannot be made absolute because there is no base.
    #[error("cannot resolve relative href {href} without a base href")]
    NoBaseHref { href: String },

    /// Joining a relative href onto a remote base is not supported.
    #[error("cannot join relative href {href} onto remote base {base}")]
    RemoteJoin { href: String, base: String },

    /// A document has no known location to be written to.
    #[error("cannot write {id} without an href; render the tree before saving")]
    NoLocation { id: String },

    /// A container operation was applied to a leaf document.
    #[error("{id} is not a catalog or collection")]
    NotAContainer { id: String },

    /// An item operation was given something that is not an item.
    #[error("{id} is not an item")]
    NotAnItem { id: String },

    /// A node handle does not belong to this graph.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// A recursive traversal re-entered one of its own ancestors.
    #[error("cycle detected at {id}")]
    CycleDetected { id: String },
}

/// Errors from document model operations.
#[derive(Debug, Error)]
pub enum StacError {
    #[error(transparent)]
    Spec(#[from] SpecViolation),

    #[error(transparent)]
    Usage(#[from] UsageError),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StacError {
    /// Returns `true` for [`SpecViolation`] errors.
    pub fn is_spec_violation(&self) -> bool {
        matches!(self, Self::Spec(_))
    }

    /// Returns `true` for [`UsageError`] errors.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Result alias for document model operations.
pub type StacResult<T> = Result<T, StacError>;
