//! Schema validation for STAC documents.
//!
//! Validation is a collaborator of the document model, not part of it: a
//! document that parses is well-formed, and a [`Validator`] decides whether
//! it also conforms to the published schema for its declared
//! `stac_version` and kind.
//!
//! # Key Types
//!
//! - [`Validator`] -- `validate(document)` succeeds or fails with
//!   [`ValidateError::SchemaViolation`]
//! - [`SchemaValidator`] -- validator backed by a [`SchemaCache`]
//! - [`SchemaCache`] -- schemas keyed by `(version, kind)`, local directory
//!   first, remote fallback with an advisory; also the [`SchemaSource`] for
//!   external `$ref`s

pub mod cache;
pub mod error;
pub mod schema;
pub mod validator;

pub use cache::{published_schema_path, schema_path, SchemaCache, STAC_SCHEMA_BASE};
pub use error::{ValidateError, ValidateResult, Violation};
pub use schema::{LocalOnly, SchemaSource};
pub use validator::{SchemaValidator, Validator};
