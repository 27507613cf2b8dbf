use std::sync::Arc;

use tracing::{debug, warn};

use stac_types::{Document, StacObject};

use crate::cache::SchemaCache;
use crate::error::{ValidateError, ValidateResult};
use crate::schema;

/// Checks a document for conformance beyond what parsing enforces.
pub trait Validator {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Succeeds, or fails with [`ValidateError::SchemaViolation`] listing
    /// every failed check.
    fn validate(&self, document: &Document) -> ValidateResult<()>;
}

/// Validates documents against the schema for their declared
/// `stac_version` and kind.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    cache: Arc<SchemaCache>,
}

impl SchemaValidator {
    pub fn new(cache: Arc<SchemaCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }
}

impl Validator for SchemaValidator {
    fn name(&self) -> &str {
        "json-schema"
    }

    fn validate(&self, document: &Document) -> ValidateResult<()> {
        let schema = self.cache.get(document.stac_version(), document.kind())?;
        let value = document.to_value()?;
        let mut violations = Vec::new();
        let unresolved = schema::check_with(&schema, &value, self.cache.as_ref(), &mut violations);
        if unresolved > 0 {
            warn!(
                id = document.id(),
                unresolved, "schema references could not be resolved, validation is partial"
            );
        }
        debug!(
            id = document.id(),
            version = document.stac_version(),
            violations = violations.len(),
            "validated document"
        );
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidateError::SchemaViolation {
                id: document.id().to_string(),
                violations,
            })
        }
    }
}
