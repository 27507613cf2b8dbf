use stac_types::{SpecViolation, StacError, UsageError};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing exists at the requested href.
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error at {href}: {source}")]
    Io {
        href: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend cannot handle hrefs with this URL scheme.
    #[error("unsupported href scheme: {0}")]
    UnsupportedScheme(String),

    /// The bytes were read but do not form a valid document.
    #[error(transparent)]
    Stac(#[from] StacError),
}

impl StoreError {
    pub(crate) fn io(href: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(href.to_string())
        } else {
            Self::Io {
                href: href.to_string(),
                source,
            }
        }
    }

    /// Returns `true` if the underlying cause is a [`SpecViolation`].
    pub fn is_spec_violation(&self) -> bool {
        matches!(self, Self::Stac(e) if e.is_spec_violation())
    }

    /// Returns `true` if the underlying cause is a [`UsageError`].
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Stac(e) if e.is_usage())
    }
}

impl From<SpecViolation> for StoreError {
    fn from(e: SpecViolation) -> Self {
        Self::Stac(e.into())
    }
}

impl From<UsageError> for StoreError {
    fn from(e: UsageError) -> Self {
        Self::Stac(e.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Stac(e.into())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
