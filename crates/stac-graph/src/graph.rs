//! The document arena and the operations that connect its nodes.
//!
//! [`StacGraph`] owns every document it knows about in a `Vec<Node>`; a
//! [`NodeId`] is an index into that vector. Links refer to their owner and
//! to their resolved target by `NodeId`, so documents never own each other
//! and back-references (`root`, `parent`) cannot form ownership cycles.
//!
//! # Invariants
//!
//! - A node's document, href and store context are created together.
//! - Every link held by a node has that node as its owner.
//! - A link's target cell is filled at most once.
//! - Resolving an href that is already loaded through the same store context
//!   returns the existing node instead of reading it again.
//!
//! Catalog trees are expected to be acyclic. Recursive traversals carry the
//! ancestor path and fail with [`UsageError::CycleDetected`] rather than
//! recursing forever.

use std::collections::HashMap;

use tracing::{debug, info};

use stac_store::{make_absolute_href, StoreContext};
use stac_types::{
    collapse_structural_links, Document, DocumentKind, Link, NodeId, SpecViolation, StacObject,
    UsageError, CHILD_REL, ITEM_REL, PARENT_REL, ROOT_REL, SELF_REL,
};

use crate::error::GraphResult;

/// A document together with its location and the store it was read from.
#[derive(Debug)]
pub struct Node {
    document: Document,
    href: Option<String>,
    store: StoreContext,
}

impl Node {
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The href assigned on load or by a render. Does not consult the
    /// `self` link; see [`StacGraph::href`] for that.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn store(&self) -> &StoreContext {
        &self.store
    }
}

/// An arena of STAC documents connected by typed links.
#[derive(Debug, Default)]
pub struct StacGraph {
    nodes: Vec<Node>,
    /// Absolute href -> nodes loaded from it.
    by_href: HashMap<String, Vec<NodeId>>,
    /// Context for inserted documents and detached links.
    store: StoreContext,
}

impl StacGraph {
    /// Create an empty graph whose new documents use `store`.
    pub fn new(store: StoreContext) -> Self {
        Self {
            nodes: Vec::new(),
            by_href: HashMap::new(),
            store,
        }
    }

    /// Number of documents in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph holds no documents.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The graph-level store context.
    pub fn default_store(&self) -> &StoreContext {
        &self.store
    }

    /// All node handles, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    // ---------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------

    /// Add an in-memory document. It has no href and uses the graph's
    /// store context.
    pub fn insert(&mut self, document: impl Into<Document>) -> NodeId {
        let store = self.store.clone();
        self.insert_node(document.into(), None, store)
    }

    /// Read a document through the graph's store context.
    ///
    /// Always reads; use link resolution to reuse loaded nodes.
    pub fn read_file(&mut self, href: &str) -> GraphResult<NodeId> {
        let store = self.store.clone();
        self.read_file_with(href, store)
    }

    /// Read a document through `store`. The new node keeps `store` for
    /// everything later resolved from it.
    pub fn read_file_with(&mut self, href: &str, store: StoreContext) -> GraphResult<NodeId> {
        let document = store.read_document(href)?;
        Ok(self.insert_node(document, Some(href.to_string()), store))
    }

    /// Read a document and require it to be of `kind`.
    pub fn load_as(&mut self, kind: DocumentKind, href: &str) -> GraphResult<NodeId> {
        let document = self.store.read_document(href)?;
        if document.kind() != kind {
            return Err(SpecViolation::TypeMismatch {
                expected: kind,
                actual: document.kind(),
                href: href.to_string(),
            }
            .into());
        }
        let store = self.store.clone();
        Ok(self.insert_node(document, Some(href.to_string()), store))
    }

    fn insert_node(
        &mut self,
        mut document: Document,
        href: Option<String>,
        store: StoreContext,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let dropped = collapse_structural_links(document.links_mut());
        if dropped > 0 {
            debug!(node = %id, dropped, "dropped duplicate self/root/parent links");
        }
        for link in document.links_mut() {
            link.set_owner(id);
        }
        debug!(node = %id, id = document.id(), kind = %document.kind(), href = ?href, "inserted node");
        if let Some(href) = &href {
            self.by_href.entry(href.clone()).or_default().push(id);
        }
        self.nodes.push(Node {
            document,
            href,
            store,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| UsageError::UnknownNode(id).into())
    }

    fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| UsageError::UnknownNode(id).into())
    }

    pub fn document(&self, id: NodeId) -> GraphResult<&Document> {
        Ok(&self.node(id)?.document)
    }

    /// Mutable access to a document. Links pushed directly through this
    /// reference are not given an owner; prefer [`set_link`](Self::set_link)
    /// and [`add_link`](Self::add_link).
    pub fn document_mut(&mut self, id: NodeId) -> GraphResult<&mut Document> {
        Ok(&mut self.node_mut(id)?.document)
    }

    /// The node's href, falling back to the href of its `self` link.
    pub fn href(&self, id: NodeId) -> GraphResult<Option<&str>> {
        let node = self.node(id)?;
        Ok(node.href.as_deref().or_else(|| {
            node.document
                .get_self_link()
                .and_then(|link| link.href.as_deref())
        }))
    }

    /// Set the node's href. With `set_self_link`, the `self` link is set to
    /// the new href, or removed when `href` is `None`.
    pub fn set_href(
        &mut self,
        id: NodeId,
        href: Option<String>,
        set_self_link: bool,
    ) -> GraphResult<()> {
        let previous = self.node_mut(id)?.href.take();
        if let Some(previous) = previous {
            if let Some(ids) = self.by_href.get_mut(&previous) {
                ids.retain(|n| *n != id);
                if ids.is_empty() {
                    self.by_href.remove(&previous);
                }
            }
        }
        if set_self_link {
            match &href {
                Some(href) => self.set_link(id, Link::self_link(id, Some(href.clone())))?,
                None => self.remove_links(id, SELF_REL)?,
            }
        }
        if let Some(href) = &href {
            self.by_href.entry(href.clone()).or_default().push(id);
        }
        self.node_mut(id)?.href = href;
        Ok(())
    }

    pub fn store(&self, id: NodeId) -> GraphResult<&StoreContext> {
        Ok(&self.node(id)?.store)
    }

    /// Replace the store context used for links resolved from `id`.
    pub fn set_store(&mut self, id: NodeId, store: StoreContext) -> GraphResult<()> {
        self.node_mut(id)?.store = store;
        Ok(())
    }

    fn find_loaded(&self, href: &str, store: &StoreContext) -> Option<NodeId> {
        self.by_href
            .get(href)?
            .iter()
            .copied()
            .find(|id| self.nodes[id.index()].store.same_as(store))
    }

    /// Return the node loaded from `href` through `store`, reading it if
    /// it is not in the graph yet.
    fn load_shared(&mut self, href: String, store: StoreContext) -> GraphResult<NodeId> {
        if let Some(id) = self.find_loaded(&href, &store) {
            debug!(node = %id, href, "reused loaded node");
            return Ok(id);
        }
        let document = store.read_document(&href)?;
        Ok(self.insert_node(document, Some(href), store))
    }

    // ---------------------------------------------------------------
    // Links
    // ---------------------------------------------------------------

    pub fn links(&self, id: NodeId) -> GraphResult<&[Link]> {
        Ok(self.document(id)?.links())
    }

    /// The first link of `id` with relation `rel`.
    pub fn get_link(&self, id: NodeId, rel: &str) -> GraphResult<Option<&Link>> {
        Ok(self.document(id)?.get_link(rel))
    }

    /// Attach `link` to `id`, replacing any existing link of a
    /// single-valued relation.
    pub fn set_link(&mut self, id: NodeId, mut link: Link) -> GraphResult<()> {
        link.set_owner(id);
        self.document_mut(id)?.set_link(link);
        Ok(())
    }

    /// Append `link` to `id`.
    pub fn add_link(&mut self, id: NodeId, mut link: Link) -> GraphResult<()> {
        link.set_owner(id);
        self.document_mut(id)?.add_link(link);
        Ok(())
    }

    pub fn remove_links(&mut self, id: NodeId, rel: &str) -> GraphResult<()> {
        self.document_mut(id)?.remove_links(rel);
        Ok(())
    }

    /// A link of relation `rel` whose target is already `target`.
    ///
    /// The href is copied from `target` now. It is not updated if the target
    /// moves later.
    pub fn link_to(&self, rel: &str, target: NodeId) -> GraphResult<Link> {
        let href = self.href(target)?.map(str::to_string);
        Ok(Link::to_node(rel, target, href))
    }

    /// Resolve the link at `index` in `owner`'s link list.
    ///
    /// A cached target is returned as is. Otherwise the href is made
    /// absolute against the owner's href and loaded through the owner's
    /// store context, and the result is cached on the link.
    pub fn resolve_link(&mut self, owner: NodeId, index: usize) -> GraphResult<NodeId> {
        let (cached, href, rel) = {
            let document = self.document(owner)?;
            let link = document
                .links()
                .get(index)
                .ok_or_else(|| UsageError::NoSuchLink {
                    id: document.id().to_string(),
                    index,
                })?;
            (link.target(), link.href.clone(), link.rel.clone())
        };
        if let Some(target) = cached {
            self.node(target)?;
            debug!(owner = %owner, target = %target, rel, "link cache hit");
            return Ok(target);
        }

        let href = href.ok_or(UsageError::UnresolvableLink)?;
        let base = self.href(owner)?.map(str::to_string);
        let absolute = make_absolute_href(&href, base.as_deref())?;
        let store = self.node(owner)?.store.clone();
        let target = self.load_shared(absolute, store)?;

        if let Some(link) = self.document_mut(owner)?.links_mut().get_mut(index) {
            link.cache_target(target);
        }
        debug!(owner = %owner, target = %target, rel, "resolved link");
        Ok(target)
    }

    /// Resolve the first link of `owner` with relation `rel`.
    pub fn resolve_rel(&mut self, owner: NodeId, rel: &str) -> GraphResult<Option<NodeId>> {
        match self.links(owner)?.iter().position(|link| link.rel == rel) {
            Some(index) => self.resolve_link(owner, index).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_root(&mut self, id: NodeId) -> GraphResult<Option<NodeId>> {
        self.resolve_rel(id, ROOT_REL)
    }

    pub fn get_parent(&mut self, id: NodeId) -> GraphResult<Option<NodeId>> {
        self.resolve_rel(id, PARENT_REL)
    }

    /// Resolve a link that is not attached to any node, through the graph's
    /// store context. Its href must be absolute.
    pub fn resolve_detached(&mut self, link: &mut Link) -> GraphResult<NodeId> {
        if let Some(target) = link.target() {
            self.node(target)?;
            return Ok(target);
        }
        let href = link.href.as_deref().ok_or(UsageError::UnresolvableLink)?;
        let absolute = make_absolute_href(href, None)?;
        let store = self.store.clone();
        let target = self.load_shared(absolute, store)?;
        link.cache_target(target);
        Ok(target)
    }

    // ---------------------------------------------------------------
    // Containers
    // ---------------------------------------------------------------

    fn require_container(&self, id: NodeId) -> GraphResult<()> {
        let document = self.document(id)?;
        if document.is_container() {
            Ok(())
        } else {
            Err(UsageError::NotAContainer {
                id: document.id().to_string(),
            }
            .into())
        }
    }

    /// Append a `child` link from `parent` to the catalog or collection
    /// `child`. Existing child links are kept.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> GraphResult<()> {
        self.require_container(parent)?;
        self.require_container(child)?;
        let link = self.link_to(CHILD_REL, child)?;
        self.add_link(parent, link)
    }

    /// Append an `item` link from `parent` to `item`.
    pub fn add_item(&mut self, parent: NodeId, item: NodeId) -> GraphResult<()> {
        self.require_container(parent)?;
        let document = self.document(item)?;
        if document.kind() != DocumentKind::Item {
            return Err(UsageError::NotAnItem {
                id: document.id().to_string(),
            }
            .into());
        }
        let link = self.link_to(ITEM_REL, item)?;
        self.add_link(parent, link)
    }

    fn link_indices(&self, id: NodeId, rels: &[&str]) -> GraphResult<Vec<usize>> {
        Ok(self
            .links(id)?
            .iter()
            .enumerate()
            .filter(|(_, link)| rels.contains(&link.rel.as_str()))
            .map(|(index, _)| index)
            .collect())
    }

    fn resolve_all(&mut self, id: NodeId, rels: &[&str]) -> GraphResult<Vec<NodeId>> {
        self.require_container(id)?;
        self.link_indices(id, rels)?
            .into_iter()
            .map(|index| self.resolve_link(id, index))
            .collect()
    }

    /// Resolve every `child` link of a container.
    pub fn get_children(&mut self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        self.resolve_all(id, &[CHILD_REL])
    }

    /// Resolve every `item` link of a container.
    pub fn get_items(&mut self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        self.resolve_all(id, &[ITEM_REL])
    }

    /// Resolve every `child` and `item` link of a container, in link order.
    pub fn get_children_and_items(&mut self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        self.resolve_all(id, &[CHILD_REL, ITEM_REL])
    }

    fn find_by_id(&mut self, id: NodeId, rel: &str, wanted: &str) -> GraphResult<Option<NodeId>> {
        self.require_container(id)?;
        for index in self.link_indices(id, &[rel])? {
            let target = self.resolve_link(id, index)?;
            if self.document(target)?.id() == wanted {
                return Ok(Some(target));
            }
        }
        Ok(None)
    }

    /// The first child with document id `child_id`. Links after the match
    /// are left unresolved.
    pub fn get_child(&mut self, id: NodeId, child_id: &str) -> GraphResult<Option<NodeId>> {
        self.find_by_id(id, CHILD_REL, child_id)
    }

    /// The first item with document id `item_id`.
    pub fn get_item(&mut self, id: NodeId, item_id: &str) -> GraphResult<Option<NodeId>> {
        self.find_by_id(id, ITEM_REL, item_id)
    }

    // ---------------------------------------------------------------
    // Traversal and persistence
    // ---------------------------------------------------------------

    /// Push `id` onto the ancestor path, failing if it is already there.
    pub(crate) fn enter(&self, id: NodeId, path: &mut Vec<NodeId>) -> GraphResult<()> {
        if path.contains(&id) {
            return Err(UsageError::CycleDetected {
                id: self.document(id)?.id().to_string(),
            }
            .into());
        }
        path.push(id);
        Ok(())
    }

    /// Every node reachable from `id` through `child` and `item` links,
    /// in pre-order, with its depth below `id`.
    pub fn walk(&mut self, id: NodeId) -> GraphResult<Vec<(NodeId, usize)>> {
        let mut order = Vec::new();
        let mut path = Vec::new();
        self.walk_from(id, &mut path, &mut order)?;
        Ok(order)
    }

    fn walk_from(
        &mut self,
        id: NodeId,
        path: &mut Vec<NodeId>,
        order: &mut Vec<(NodeId, usize)>,
    ) -> GraphResult<()> {
        self.enter(id, path)?;
        order.push((id, path.len() - 1));
        if self.document(id)?.is_container() {
            for child in self.get_children_and_items(id)? {
                self.walk_from(child, path, order)?;
            }
        }
        path.pop();
        Ok(())
    }

    /// Write one document to `href`, or to its own href when `href` is
    /// `None`.
    pub fn write_file(&self, id: NodeId, href: Option<&str>) -> GraphResult<()> {
        let node = self.node(id)?;
        let location = match href {
            Some(href) => href.to_string(),
            None => self
                .href(id)?
                .map(str::to_string)
                .ok_or_else(|| UsageError::NoLocation {
                    id: node.document.id().to_string(),
                })?,
        };
        node.store.write_document(&node.document, &location)?;
        info!(node = %id, href = %location, "wrote document");
        Ok(())
    }

    /// Write every document reachable from `id` to its own href. Returns
    /// the number of documents written.
    pub fn save_tree(&mut self, id: NodeId) -> GraphResult<usize> {
        let order = self.walk(id)?;
        for (node, _) in &order {
            self.write_file(*node, None)?;
        }
        info!(root = %id, count = order.len(), "saved tree");
        Ok(order.len())
    }

    /// Set `stac_version` on every document reachable from `id`.
    pub fn set_stac_version(&mut self, id: NodeId, version: &str) -> GraphResult<()> {
        for (node, _) in self.walk(id)? {
            self.document_mut(node)?.set_stac_version(version.to_string());
        }
        Ok(())
    }
}
