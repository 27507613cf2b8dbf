use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::{Reader, Writer};

/// In-memory, HashMap-based store keyed by href.
///
/// Intended for tests and embedding. Hrefs are used verbatim as keys, so
/// callers should pass the absolute hrefs produced by graph resolution.
pub struct InMemoryStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
    reads: AtomicUsize,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            reads: AtomicUsize::new(0),
        }
    }

    /// Store `data` at `href` directly.
    pub fn insert(&self, href: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files
            .write()
            .expect("lock poisoned")
            .insert(href.into(), data.into());
    }

    /// The bytes stored at `href`, without counting a read.
    pub fn get(&self, href: &str) -> Option<Vec<u8>> {
        self.files.read().expect("lock poisoned").get(href).cloned()
    }

    /// Number of files currently stored.
    pub fn len(&self) -> usize {
        self.files.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.files.read().expect("lock poisoned").is_empty()
    }

    /// Number of successful [`Reader::read`] calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Remove all files from the store.
    pub fn clear(&self) {
        self.files.write().expect("lock poisoned").clear();
    }

    /// Sorted list of every stored href.
    pub fn hrefs(&self) -> Vec<String> {
        let map = self.files.read().expect("lock poisoned");
        let mut hrefs: Vec<String> = map.keys().cloned().collect();
        hrefs.sort();
        hrefs
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for InMemoryStore {
    fn read(&self, href: &str) -> StoreResult<Vec<u8>> {
        let data = self
            .get(href)
            .ok_or_else(|| StoreError::NotFound(href.to_string()))?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(data)
    }
}

impl Writer for InMemoryStore {
    fn write(&self, href: &str, data: &[u8]) -> StoreResult<()> {
        self.insert(href, data);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("file_count", &self.len())
            .field("reads", &self.read_count())
            .finish()
    }
}
