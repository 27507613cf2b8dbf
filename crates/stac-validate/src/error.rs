//! Error types for document validation.

use std::fmt;

use stac_store::StoreError;
use stac_types::{DocumentKind, StacError};

/// One failed schema check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value; empty for the document root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "/: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors that can occur while validating a document.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// The document is well-formed but does not conform to its schema.
    #[error("{id} failed schema validation with {} violation(s)", .violations.len())]
    SchemaViolation {
        id: String,
        violations: Vec<Violation>,
    },

    /// No schema could be found locally or remotely.
    #[error("no schema available for {kind} at STAC version {version}")]
    SchemaUnavailable { version: String, kind: DocumentKind },

    /// A schema file exists but is not valid JSON.
    #[error("invalid schema at {href}: {source}")]
    InvalidSchema {
        href: String,
        #[source]
        source: serde_json::Error,
    },

    /// Fetching a schema failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The document could not be serialized.
    #[error(transparent)]
    Stac(#[from] StacError),
}

impl ValidateError {
    /// The individual violations, if this is a schema violation.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaViolation { violations, .. } => violations,
            _ => &[],
        }
    }
}

/// Convenience alias for validation results.
pub type ValidateResult<T> = Result<T, ValidateError>;
