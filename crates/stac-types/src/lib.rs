//! Document model for STAC catalogs.
//!
//! A catalog is a tree of JSON documents that reference each other through
//! typed links. This crate defines the documents and links themselves and
//! their lossless JSON mapping; the graph, storage and rendering layers live
//! in `stac-graph` and `stac-store`.
//!
//! # Key Types
//!
//! - [`Document`] -- closed union of [`Item`], [`Catalog`] and [`Collection`],
//!   dispatched on the JSON `type` tag
//! - [`StacObject`] -- behaviour shared by all variants (id, version, links)
//! - [`Link`] -- typed reference with a cached, lazily-filled target
//! - [`NodeId`] -- non-owning handle to a document in a graph
//! - [`StacError`] -- [`SpecViolation`] and [`UsageError`] taxonomy
//!
//! # Round-trip contract
//!
//! For every supported document, `Document::from_dict(d)?.to_dict()? == d`,
//! including unknown top-level keys and link order. Known keys are written in
//! a fixed order and always win over extra fields of the same name.

pub mod asset;
pub mod catalog;
pub mod collection;
pub mod constants;
pub mod document;
pub mod error;
pub mod extent;
pub mod item;
pub mod link;
pub mod node;
pub mod object;

pub use asset::{Asset, ItemAsset, Provider};
pub use catalog::Catalog;
pub use collection::Collection;
pub use constants::{
    default_stac_version, is_multi_valued, CATALOG_TYPE, CHILD_REL, COLLECTION_TYPE,
    DEFAULT_LICENSE, DEFAULT_STAC_VERSION, ITEM_REL, ITEM_TYPE, PARENT_REL, ROOT_REL, SELF_REL,
};
pub use document::{into_object, Document, DocumentKind};
pub use error::{SpecViolation, StacError, StacResult, UsageError};
pub use extent::{Extent, SpatialExtent, TemporalExtent};
pub use item::Item;
pub use link::Link;
pub use node::NodeId;
pub use object::{collapse_structural_links, set_link_in, StacObject};
