//! Document graph for STAC catalogs.
//!
//! Documents live in a [`StacGraph`] arena and refer to each other through
//! [`Link`](stac_types::Link)s that carry non-owning [`NodeId`] handles.
//! Links are resolved on demand through the owning node's
//! [`StoreContext`](stac_store::StoreContext), so every document loaded from
//! a tree shares the tree's reader and writer.
//!
//! # Key Types
//!
//! - [`StacGraph`] -- arena, link management, container operations
//! - [`Renderer`] -- assigns hrefs and wires `self`/`root`/`parent` links
//! - [`DefaultRenderer`] -- `catalog.json` / `collection.json` / `<id>.json`
//!   layout under a fixed root
//! - [`GraphError`] -- wraps document and store errors

pub mod error;
pub mod graph;
pub mod render;

pub use error::{GraphError, GraphResult};
pub use graph::{Node, StacGraph};
pub use render::{DefaultRenderer, Renderer};
pub use stac_types::NodeId;
