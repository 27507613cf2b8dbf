//! Store context for STAC documents.
//!
//! A [`StoreContext`] pairs a [`Reader`] and a [`Writer`] and is shared by
//! reference across every document of a resolved tree. Reading fetches
//! bytes, decodes the JSON envelope and dispatches on its `type` tag;
//! writing serializes a document and persists the bytes.
//!
//! # Backends
//!
//! - [`FileStore`] -- local paths and `file://` URLs
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Backends move bytes only; decoding lives in [`StoreContext`].
//! 2. Writes create the destination's directory before writing.
//! 3. All I/O errors are propagated, never silently ignored.
//! 4. Relative hrefs are joined onto local bases only (see [`href`]).

pub mod context;
pub mod error;
pub mod file;
pub mod href;
pub mod memory;
pub mod traits;

pub use context::StoreContext;
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use href::{href_directory, is_absolute_href, make_absolute_href};
pub use memory::InMemoryStore;
pub use traits::{Reader, Writer};
