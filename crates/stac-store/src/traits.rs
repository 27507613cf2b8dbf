use crate::error::StoreResult;

/// Fetches the raw bytes behind an href.
///
/// Implementations must be `Send + Sync` so one context can be shared by
/// reference across every document of a tree. They never interpret the
/// bytes; decoding happens in [`StoreContext`](crate::StoreContext).
pub trait Reader: Send + Sync {
    /// Read the bytes at `href`.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if
    /// nothing exists there.
    fn read(&self, href: &str) -> StoreResult<Vec<u8>>;
}

/// Persists raw bytes at an href.
pub trait Writer: Send + Sync {
    /// Write `data` to `href`, replacing anything already there.
    ///
    /// Backends with a directory structure create the containing directory
    /// first.
    fn write(&self, href: &str, data: &[u8]) -> StoreResult<()>;
}
