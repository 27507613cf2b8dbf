//! Schema lookup keyed by STAC version and document kind.
//!
//! Schemas are read from a local directory laid out as
//! `<dir>/v<version>/<item|catalog|collection>.json`. When the local
//! directory has no schema for a key, the cache can fall back to a remote
//! location read through any [`Reader`]; doing so emits a `warn!` advisory
//! and is never an error by itself. Every schema is loaded at most once.
//!
//! The cache is also the [`SchemaSource`] for external `$ref`s. A referenced
//! document under [`STAC_SCHEMA_BASE`] is looked up below the local
//! directory first; anything else goes through the remote reader.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use stac_store::{Reader, StoreError};
use stac_types::DocumentKind;

use crate::error::{ValidateError, ValidateResult};
use crate::schema::SchemaSource;

/// Where the official STAC schemas are published.
pub const STAC_SCHEMA_BASE: &str = "https://schemas.stacspec.org";

/// Path of a schema below a schema root, e.g. `v1.1.0/item.json`.
pub fn schema_path(version: &str, kind: DocumentKind) -> String {
    let file = match kind {
        DocumentKind::Item => "item.json",
        DocumentKind::Catalog => "catalog.json",
        DocumentKind::Collection => "collection.json",
    };
    format!("v{version}/{file}")
}

/// Path of a schema on the official schema site.
pub fn published_schema_path(version: &str, kind: DocumentKind) -> String {
    let spec = match kind {
        DocumentKind::Item => "item-spec/json-schema/item.json",
        DocumentKind::Catalog => "catalog-spec/json-schema/catalog.json",
        DocumentKind::Collection => "collection-spec/json-schema/collection.json",
    };
    format!("v{version}/{spec}")
}

struct Remote {
    reader: Arc<dyn Reader>,
    base: String,
    layout: fn(&str, DocumentKind) -> String,
}

/// Schemas keyed by `(version, kind)`.
pub struct SchemaCache {
    local: Option<PathBuf>,
    remote: Option<Remote>,
    schemas: RwLock<HashMap<(String, DocumentKind), Arc<Value>>>,
    /// Documents loaded for `$ref`s, by absolute href.
    referenced: RwLock<HashMap<String, Arc<Value>>>,
}

impl SchemaCache {
    /// A cache reading from `local`, with no remote fallback.
    pub fn new(local: Option<PathBuf>) -> Self {
        Self {
            local,
            remote: None,
            schemas: RwLock::new(HashMap::new()),
            referenced: RwLock::new(HashMap::new()),
        }
    }

    /// Fall back to `<base>/v<version>/<kind>.json` read through `reader`.
    pub fn with_remote(mut self, reader: Arc<dyn Reader>, base: impl Into<String>) -> Self {
        self.remote = Some(Remote {
            reader,
            base: base.into(),
            layout: schema_path,
        });
        self
    }

    /// Fall back to the official schema site, read through `reader`.
    pub fn with_published_schemas(mut self, reader: Arc<dyn Reader>) -> Self {
        self.remote = Some(Remote {
            reader,
            base: STAC_SCHEMA_BASE.to_string(),
            layout: published_schema_path,
        });
        self
    }

    /// Add a schema directly, replacing any cached one for the same key.
    pub fn insert(&self, version: impl Into<String>, kind: DocumentKind, schema: Value) {
        self.schemas
            .write()
            .expect("lock poisoned")
            .insert((version.into(), kind), Arc::new(schema));
    }

    /// Number of schemas loaded so far.
    pub fn len(&self) -> usize {
        self.schemas.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The schema for `kind` at `version`, loading it on first use.
    pub fn get(&self, version: &str, kind: DocumentKind) -> ValidateResult<Arc<Value>> {
        let key = (version.to_string(), kind);
        if let Some(schema) = self.schemas.read().expect("lock poisoned").get(&key) {
            return Ok(schema.clone());
        }

        let schema = match self.read_local(version, kind)? {
            Some(schema) => schema,
            None => self.read_remote(version, kind)?,
        };
        let schema = Arc::new(schema);
        self.schemas
            .write()
            .expect("lock poisoned")
            .insert(key, schema.clone());
        Ok(schema)
    }

    fn read_local(&self, version: &str, kind: DocumentKind) -> ValidateResult<Option<Value>> {
        let Some(dir) = &self.local else {
            return Ok(None);
        };
        let path = dir.join(schema_path(version, kind));
        let href = path.to_string_lossy().into_owned();
        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(href, "loaded local schema");
                parse(&href, &bytes).map(Some)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io { href, source: e }.into()),
        }
    }

    fn read_remote(&self, version: &str, kind: DocumentKind) -> ValidateResult<Value> {
        let Some(remote) = &self.remote else {
            return Err(ValidateError::SchemaUnavailable {
                version: version.to_string(),
                kind,
            });
        };
        let href = format!(
            "{}/{}",
            remote.base.trim_end_matches('/'),
            (remote.layout)(version, kind)
        );
        warn!(href, %kind, version, "schema not in local cache, fetching remote copy");
        let bytes = remote.reader.read(&href)?;
        parse(&href, &bytes)
    }
}

impl SchemaSource for SchemaCache {
    fn fetch(&self, href: &str) -> Option<Arc<Value>> {
        if let Some(schema) = self.referenced.read().expect("lock poisoned").get(href) {
            return Some(schema.clone());
        }
        let schema = match self.read_referenced(href) {
            Ok(Some(schema)) => Arc::new(schema),
            Ok(None) => return None,
            Err(e) => {
                warn!(href, error = %e, "could not load referenced schema");
                return None;
            }
        };
        self.referenced
            .write()
            .expect("lock poisoned")
            .insert(href.to_string(), schema.clone());
        Some(schema)
    }
}

impl SchemaCache {
    fn read_referenced(&self, href: &str) -> ValidateResult<Option<Value>> {
        let relative = href
            .strip_prefix(STAC_SCHEMA_BASE)
            .map(|rest| rest.trim_start_matches('/'));
        if let (Some(dir), Some(relative)) = (&self.local, relative) {
            let path = dir.join(relative);
            if path.is_file() {
                let bytes = std::fs::read(&path).map_err(|source| StoreError::Io {
                    href: path.to_string_lossy().into_owned(),
                    source,
                })?;
                debug!(href, "loaded referenced schema from local directory");
                return parse(href, &bytes).map(Some);
            }
        }
        let Some(remote) = &self.remote else {
            return Ok(None);
        };
        let bytes = remote.reader.read(href)?;
        debug!(href, "loaded referenced schema");
        parse(href, &bytes).map(Some)
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("local", &self.local)
            .field("remote", &self.remote.as_ref().map(|r| r.base.as_str()))
            .field("loaded", &self.len())
            .finish()
    }
}

fn parse(href: &str, bytes: &[u8]) -> ValidateResult<Value> {
    serde_json::from_slice(bytes).map_err(|source| ValidateError::InvalidSchema {
        href: href.to_string(),
        source,
    })
}
