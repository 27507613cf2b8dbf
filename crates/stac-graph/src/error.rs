//! Error types for graph operations.

use stac_store::StoreError;
use stac_types::{SpecViolation, StacError, UsageError};

/// Errors that can occur while building, resolving or rendering a graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The document model rejected the operation.
    #[error(transparent)]
    Stac(#[from] StacError),

    /// Reading or writing through a store context failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GraphError {
    /// Returns `true` if the underlying cause is a [`UsageError`].
    pub fn is_usage(&self) -> bool {
        match self {
            Self::Stac(e) => e.is_usage(),
            Self::Store(e) => e.is_usage(),
        }
    }

    /// Returns `true` if the underlying cause is a [`SpecViolation`].
    pub fn is_spec_violation(&self) -> bool {
        match self {
            Self::Stac(e) => e.is_spec_violation(),
            Self::Store(e) => e.is_spec_violation(),
        }
    }

    /// The underlying [`UsageError`], if that is what this is.
    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            Self::Stac(StacError::Usage(e)) | Self::Store(StoreError::Stac(StacError::Usage(e))) => {
                Some(e)
            }
            _ => None,
        }
    }

    /// The underlying [`SpecViolation`], if that is what this is.
    pub fn as_spec_violation(&self) -> Option<&SpecViolation> {
        match self {
            Self::Stac(StacError::Spec(e)) | Self::Store(StoreError::Stac(StacError::Spec(e))) => {
                Some(e)
            }
            _ => None,
        }
    }
}

impl From<UsageError> for GraphError {
    fn from(e: UsageError) -> Self {
        Self::Stac(e.into())
    }
}

impl From<SpecViolation> for GraphError {
    fn from(e: SpecViolation) -> Self {
        Self::Stac(e.into())
    }
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
