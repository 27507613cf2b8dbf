use std::fmt;
use std::sync::Arc;

use stac_types::{Document, SpecViolation, StacError, StacObject};
use tracing::debug;

use crate::error::StoreResult;
use crate::file::FileStore;
use crate::memory::InMemoryStore;
use crate::traits::{Reader, Writer};

/// A paired reader and writer, shared by every document of a tree.
///
/// Cloning a context is cheap and yields a handle to the *same* reader and
/// writer; [`same_as`](Self::same_as) compares by identity. Documents loaded
/// through a context (directly or by resolving a link) carry a clone of it,
/// so a whole tree uses one I/O context without any global state.
///
/// The reader and writer are not synchronized beyond what the backend
/// provides; one logical actor is expected to walk a tree at a time.
#[derive(Clone)]
pub struct StoreContext {
    reader: Arc<dyn Reader>,
    writer: Arc<dyn Writer>,
    pretty: bool,
}

impl StoreContext {
    pub fn new(reader: Arc<dyn Reader>, writer: Arc<dyn Writer>) -> Self {
        Self {
            reader,
            writer,
            pretty: false,
        }
    }

    /// Use one backend for both reading and writing.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: Reader + Writer + 'static,
    {
        Self::new(store.clone(), store)
    }

    /// A context over the local filesystem.
    pub fn filesystem() -> Self {
        Self::from_store(Arc::new(FileStore::new()))
    }

    /// A context over a fresh in-memory store, returned alongside it.
    pub fn in_memory() -> (Self, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (Self::from_store(store.clone()), store)
    }

    /// Write pretty-printed JSON instead of compact JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn reader(&self) -> &Arc<dyn Reader> {
        &self.reader
    }

    pub fn writer(&self) -> &Arc<dyn Writer> {
        &self.writer
    }

    /// Returns `true` if both contexts share the same reader and writer.
    pub fn same_as(&self, other: &StoreContext) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.reader), Arc::as_ptr(&other.reader))
            && std::ptr::addr_eq(Arc::as_ptr(&self.writer), Arc::as_ptr(&other.writer))
    }

    /// Fetch `href` and decode it into whichever variant its `type` names.
    pub fn read_document(&self, href: &str) -> StoreResult<Document> {
        let bytes = self.reader.read(href)?;
        let document = Document::from_slice(&bytes)?;
        debug!(href, id = document.id(), kind = %document.kind(), "decoded document");
        Ok(document)
    }

    /// Fetch `href` and require a specific variant.
    ///
    /// Fails with [`SpecViolation::TypeMismatch`] if the file holds a
    /// different variant.
    pub fn read_as<T>(&self, href: &str) -> StoreResult<T>
    where
        T: TryFrom<Document, Error = StacError>,
    {
        let document = self.read_document(href)?;
        T::try_from(document).map_err(|e| match e {
            StacError::Spec(SpecViolation::TypeMismatch {
                expected, actual, ..
            }) => SpecViolation::TypeMismatch {
                expected,
                actual,
                href: href.to_string(),
            }
            .into(),
            other => other.into(),
        })
    }

    /// Serialize `document` and write it to `href`.
    pub fn write_document(&self, document: &Document, href: &str) -> StoreResult<()> {
        let value = document.to_value()?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&value)?
        } else {
            serde_json::to_vec(&value)?
        };
        self.writer.write(href, &bytes)
    }
}

impl Default for StoreContext {
    fn default() -> Self {
        Self::filesystem()
    }
}

impl fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreContext")
            .field("reader", &Arc::as_ptr(&self.reader).cast::<()>())
            .field("writer", &Arc::as_ptr(&self.writer).cast::<()>())
            .field("pretty", &self.pretty)
            .finish()
    }
}
