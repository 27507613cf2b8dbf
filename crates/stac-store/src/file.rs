use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::href::href_to_path;
use crate::traits::{Reader, Writer};

/// Local filesystem backend.
///
/// Accepts plain paths and `file://` URLs. Any other scheme fails with
/// [`StoreError::UnsupportedScheme`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }

    fn path_for(href: &str) -> StoreResult<PathBuf> {
        href_to_path(href).ok_or_else(|| StoreError::UnsupportedScheme(href.to_string()))
    }
}

impl Reader for FileStore {
    fn read(&self, href: &str) -> StoreResult<Vec<u8>> {
        let path = Self::path_for(href)?;
        let data = fs::read(&path).map_err(|e| StoreError::io(href, e))?;
        debug!(href, bytes = data.len(), "read file");
        Ok(data)
    }
}

impl Writer for FileStore {
    fn write(&self, href: &str, data: &[u8]) -> StoreResult<()> {
        let path = Self::path_for(href)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(href, e))?;
        }
        fs::write(&path, data).map_err(|e| StoreError::io(href, e))?;
        debug!(href, bytes = data.len(), "wrote file");
        Ok(())
    }
}
