//! Href assignment for whole trees.
//!
//! A [`Renderer`] walks a tree depth-first in pre-order. Each document gets
//! an href derived from its parent's href and its own id, a matching `self`
//! link, the tree's `root` link and a `parent` link to its container.
//! Rendering an unchanged tree a second time changes nothing.
//!
//! The default layout is:
//!
//! ```text
//! <root>/catalog.json
//! <root>/<child-id>/catalog.json
//! <root>/<child-id>/<item-id>.json
//! ```

use tracing::{debug, info};

use stac_store::{href_directory, make_absolute_href};
use stac_types::{
    Catalog, Collection, Document, Item, Link, NodeId, StacObject, CHILD_REL, ITEM_REL,
    PARENT_REL, ROOT_REL,
};

use crate::error::GraphResult;
use crate::graph::StacGraph;

/// Computes hrefs for documents and applies them to a tree.
///
/// Implementors supply [`root`](Self::root) and may override the per-variant
/// href rules; [`render`](Self::render) is provided.
pub trait Renderer {
    /// Base location used for a document without a parent link href.
    fn root(&self) -> &str;

    fn item_href(&self, item: &Item, base: &str) -> String {
        format!("{base}/{}.json", item.id)
    }

    fn catalog_href(&self, _catalog: &Catalog, base: &str) -> String {
        format!("{base}/catalog.json")
    }

    fn collection_href(&self, _collection: &Collection, base: &str) -> String {
        format!("{base}/collection.json")
    }

    /// Assign hrefs to `id` and everything below it.
    ///
    /// Fails with [`UsageError::CycleDetected`](stac_types::UsageError) if a
    /// container is reachable from itself.
    fn render(&self, graph: &mut StacGraph, id: NodeId) -> GraphResult<()> {
        let mut path = Vec::new();
        render_node(self, graph, id, &mut path)?;
        let href = graph.href(id)?.map(str::to_string);
        info!(root = %id, href = ?href, "rendered tree");
        Ok(())
    }
}

/// The conventional on-disk layout, rooted at a fixed location.
#[derive(Clone, Debug)]
pub struct DefaultRenderer {
    root: String,
}

impl DefaultRenderer {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

impl Renderer for DefaultRenderer {
    fn root(&self) -> &str {
        &self.root
    }
}

fn render_node<R: Renderer + ?Sized>(
    renderer: &R,
    graph: &mut StacGraph,
    id: NodeId,
    path: &mut Vec<NodeId>,
) -> GraphResult<()> {
    graph.enter(id, path)?;

    // Resolve children against the current href before it changes.
    let leaves = leaf_links(graph, id)?;
    let mut targets = Vec::with_capacity(leaves.len());
    for index in &leaves {
        targets.push(graph.resolve_link(id, *index)?);
    }

    let base = base_href(renderer, graph, id)?;
    let href = match graph.document(id)? {
        Document::Item(item) => renderer.item_href(item, &base),
        Document::Catalog(catalog) => renderer.catalog_href(catalog, &base),
        Document::Collection(collection) => renderer.collection_href(collection, &base),
    };
    let previous = graph.href(id)?.map(str::to_string);
    debug!(node = %id, href, "rendering");
    graph.set_href(id, Some(href), true)?;

    if graph.document(id)?.is_container() {
        let root_link = match graph.get_link(id, ROOT_REL)?.cloned() {
            Some(link) if !targets_self(&link, id, previous.as_deref()) => link,
            _ => {
                let link = graph.link_to(ROOT_REL, id)?;
                graph.set_link(id, link.clone())?;
                link
            }
        };
        for target in targets {
            graph.set_link(target, root_link.clone())?;
            let parent = graph.link_to(PARENT_REL, id)?;
            graph.set_link(target, parent)?;
            render_node(renderer, graph, target, path)?;

            // Link positions may have shifted while this node's self and
            // root links were set, so match on the cached target.
            let target_href = graph.href(target)?.map(str::to_string);
            for link in graph.document_mut(id)?.links_mut() {
                if is_leaf(link) && link.target() == Some(target) {
                    link.href = target_href.clone();
                }
            }
        }
    }

    path.pop();
    Ok(())
}

fn leaf_links(graph: &StacGraph, id: NodeId) -> GraphResult<Vec<usize>> {
    Ok(graph
        .links(id)?
        .iter()
        .enumerate()
        .filter(|(_, link)| is_leaf(link))
        .map(|(index, _)| index)
        .collect())
}

fn is_leaf(link: &Link) -> bool {
    link.rel == CHILD_REL || link.rel == ITEM_REL
}

/// The parent link's directory plus the document id, or the renderer root.
fn base_href<R: Renderer + ?Sized>(
    renderer: &R,
    graph: &StacGraph,
    id: NodeId,
) -> GraphResult<String> {
    let document = graph.document(id)?;
    let parent_href = document
        .get_link(PARENT_REL)
        .and_then(|link| link.href.as_deref());
    Ok(match parent_href {
        Some(parent_href) => {
            let directory = href_directory(parent_href);
            if directory.ends_with('/') {
                format!("{directory}{}", document.id())
            } else {
                format!("{directory}/{}", document.id())
            }
        }
        None => renderer.root().trim_end_matches('/').to_string(),
    })
}

/// Whether a root link points at the document being rendered, either by
/// cached target or by href.
fn targets_self(link: &Link, id: NodeId, previous: Option<&str>) -> bool {
    match (link.target(), previous) {
        (Some(target), _) => target == id,
        (None, Some(previous)) => link
            .href
            .as_deref()
            .and_then(|href| make_absolute_href(href, Some(previous)).ok())
            .is_some_and(|href| href == previous),
        (None, None) => false,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;
    use stac_store::StoreContext;
    use stac_types::{UsageError, SELF_REL};

    use super::*;
    use crate::error::GraphError;

    fn renderer() -> DefaultRenderer {
        DefaultRenderer::new("/cat")
    }

    fn link_href<'a>(graph: &'a StacGraph, id: NodeId, rel: &str) -> Option<&'a str> {
        graph
            .get_link(id, rel)
            .unwrap()
            .and_then(|link| link.href.as_deref())
    }

    fn snapshot(graph: &StacGraph) -> Vec<(Option<String>, Vec<(String, Option<String>)>)> {
        graph
            .node_ids()
            .map(|id| {
                let links = graph
                    .links(id)
                    .unwrap()
                    .iter()
                    .map(|l| (l.rel.clone(), l.href.clone()))
                    .collect();
                (graph.href(id).unwrap().map(str::to_string), links)
            })
            .collect()
    }

    // ---------------------------------------------------------------
    // Solo documents
    // ---------------------------------------------------------------

    #[test]
    fn solo_item() {
        let mut graph = StacGraph::default();
        let item = graph.insert(Item::new("an-id"));
        renderer().render(&mut graph, item).unwrap();
        assert_eq!(link_href(&graph, item, SELF_REL), Some("/cat/an-id.json"));
        assert_eq!(graph.href(item).unwrap(), Some("/cat/an-id.json"));
        assert!(graph.get_link(item, ROOT_REL).unwrap().is_none());
    }

    #[test]
    fn solo_catalog() {
        let mut graph = StacGraph::default();
        let catalog = graph.insert(Catalog::new("an-id", "a description"));
        renderer().render(&mut graph, catalog).unwrap();
        assert_eq!(link_href(&graph, catalog, SELF_REL), Some("/cat/catalog.json"));
        assert_eq!(link_href(&graph, catalog, ROOT_REL), Some("/cat/catalog.json"));
    }

    #[test]
    fn solo_collection() {
        let mut graph = StacGraph::default();
        let collection = graph.insert(Collection::new("an-id", "a description"));
        renderer().render(&mut graph, collection).unwrap();
        assert_eq!(
            link_href(&graph, collection, SELF_REL),
            Some("/cat/collection.json")
        );
    }

    #[test]
    fn trailing_slash_root() {
        let mut graph = StacGraph::default();
        let item = graph.insert(Item::new("an-id"));
        DefaultRenderer::new("/cat/").render(&mut graph, item).unwrap();
        assert_eq!(graph.href(item).unwrap(), Some("/cat/an-id.json"));
    }

    // ---------------------------------------------------------------
    // Trees
    // ---------------------------------------------------------------

    #[test]
    fn nested_catalog() {
        let mut graph = StacGraph::default();
        let parent = graph.insert(Catalog::new("parent", "a parent"));
        let child = graph.insert(Catalog::new("child", "a child"));
        graph.add_child(parent, child).unwrap();
        renderer().render(&mut graph, parent).unwrap();

        assert_eq!(graph.href(parent).unwrap(), Some("/cat/catalog.json"));
        assert_eq!(graph.href(child).unwrap(), Some("/cat/child/catalog.json"));
        assert_eq!(link_href(&graph, child, PARENT_REL), Some("/cat/catalog.json"));
        assert_eq!(link_href(&graph, child, ROOT_REL), Some("/cat/catalog.json"));
        assert_eq!(link_href(&graph, parent, CHILD_REL), Some("/cat/child/catalog.json"));
        assert_eq!(
            graph.get_link(child, PARENT_REL).unwrap().unwrap().target(),
            Some(parent)
        );
    }

    #[test]
    fn deep_tree_layout() {
        let mut graph = StacGraph::default();
        let root = graph.insert(Catalog::new("root", "d"));
        let collection = graph.insert(Collection::new("landsat", "d"));
        let item = graph.insert(Item::new("scene-1"));
        graph.add_child(root, collection).unwrap();
        graph.add_item(collection, item).unwrap();
        renderer().render(&mut graph, root).unwrap();

        assert_eq!(
            graph.href(collection).unwrap(),
            Some("/cat/landsat/collection.json")
        );
        assert_eq!(
            graph.href(item).unwrap(),
            Some("/cat/landsat/scene-1/scene-1.json")
        );
        assert_eq!(link_href(&graph, item, ROOT_REL), Some("/cat/catalog.json"));
        assert_eq!(
            link_href(&graph, item, PARENT_REL),
            Some("/cat/landsat/collection.json")
        );
        assert_eq!(graph.get_parent(item).unwrap(), Some(collection));
        assert_eq!(graph.get_root(item).unwrap(), Some(root));
    }

    #[test]
    fn render_is_idempotent() {
        let mut graph = StacGraph::default();
        let root = graph.insert(Catalog::new("root", "d"));
        let child = graph.insert(Catalog::new("child", "d"));
        let item = graph.insert(Item::new("i"));
        graph.add_child(root, child).unwrap();
        graph.add_item(child, item).unwrap();

        renderer().render(&mut graph, root).unwrap();
        let first = snapshot(&graph);
        renderer().render(&mut graph, root).unwrap();
        assert_eq!(snapshot(&graph), first);
    }

    #[test]
    fn rerender_at_new_root_moves_tree() {
        let mut graph = StacGraph::default();
        let root = graph.insert(Catalog::new("root", "d"));
        let child = graph.insert(Catalog::new("child", "d"));
        graph.add_child(root, child).unwrap();
        renderer().render(&mut graph, root).unwrap();
        DefaultRenderer::new("/moved").render(&mut graph, root).unwrap();

        assert_eq!(graph.href(root).unwrap(), Some("/moved/catalog.json"));
        assert_eq!(link_href(&graph, root, ROOT_REL), Some("/moved/catalog.json"));
        assert_eq!(graph.href(child).unwrap(), Some("/moved/child/catalog.json"));
        assert_eq!(link_href(&graph, child, ROOT_REL), Some("/moved/catalog.json"));
        assert_eq!(graph.links(root).unwrap().len(), 3);
    }

    #[test]
    fn loaded_tree_renders_to_new_location() {
        let (context, store) = StoreContext::in_memory();
        store.insert(
            "/src/catalog.json",
            json!({
                "type": "Catalog",
                "id": "root",
                "description": "d",
                "links": [
                    {"href": "./catalog.json", "rel": "root"},
                    {"href": "./sub/catalog.json", "rel": "child"}
                ]
            })
            .to_string(),
        );
        store.insert(
            "/src/sub/catalog.json",
            json!({
                "type": "Catalog",
                "id": "child",
                "description": "d",
                "links": [
                    {"href": "../catalog.json", "rel": "root"},
                    {"href": "../catalog.json", "rel": "parent"}
                ]
            })
            .to_string(),
        );
        let mut graph = StacGraph::new(context);
        let root = graph.read_file("/src/catalog.json").unwrap();
        renderer().render(&mut graph, root).unwrap();

        let child = graph.get_child(root, "child").unwrap().unwrap();
        assert_eq!(graph.href(root).unwrap(), Some("/cat/catalog.json"));
        assert_eq!(link_href(&graph, root, ROOT_REL), Some("/cat/catalog.json"));
        assert_eq!(graph.href(child).unwrap(), Some("/cat/child/catalog.json"));
        assert_eq!(link_href(&graph, child, PARENT_REL), Some("/cat/catalog.json"));
        assert_eq!(graph.len(), 2);
    }

    fn child_hrefs(graph: &StacGraph, id: NodeId) -> Vec<(Option<NodeId>, Option<String>)> {
        graph
            .links(id)
            .unwrap()
            .iter()
            .filter(|l| l.rel == CHILD_REL)
            .map(|l| (l.target(), l.href.clone()))
            .collect()
    }

    #[test]
    fn duplicate_self_links_on_load_are_collapsed() {
        let (context, store) = StoreContext::in_memory();
        store.insert(
            "/src/catalog.json",
            json!({
                "type": "Catalog",
                "id": "root",
                "description": "d",
                "links": [
                    {"href": "./catalog.json", "rel": "self"},
                    {"href": "./elsewhere.json", "rel": "self"},
                    {"href": "./a/catalog.json", "rel": "child"},
                    {"href": "./b/catalog.json", "rel": "child"}
                ]
            })
            .to_string(),
        );
        for id in ["a", "b"] {
            store.insert(
                format!("/src/{id}/catalog.json"),
                json!({"type": "Catalog", "id": id, "description": "d", "links": []}).to_string(),
            );
        }
        let mut graph = StacGraph::new(context);
        let root = graph.read_file("/src/catalog.json").unwrap();
        assert_eq!(graph.links(root).unwrap().len(), 3);

        DefaultRenderer::new("/out").render(&mut graph, root).unwrap();
        let a = graph.get_child(root, "a").unwrap().unwrap();
        let b = graph.get_child(root, "b").unwrap().unwrap();
        assert_eq!(
            child_hrefs(&graph, root),
            [
                (Some(a), Some("/out/a/catalog.json".to_string())),
                (Some(b), Some("/out/b/catalog.json".to_string())),
            ]
        );
        assert_eq!(link_href(&graph, root, ROOT_REL), Some("/out/catalog.json"));
        assert_eq!(link_href(&graph, root, SELF_REL), Some("/out/catalog.json"));
    }

    #[test]
    fn child_links_follow_targets_when_links_shift() {
        let mut graph = StacGraph::default();
        let root = graph.insert(Catalog::new("root", "d"));
        let a = graph.insert(Catalog::new("a", "d"));
        let b = graph.insert(Item::new("b"));
        graph.add_child(root, a).unwrap();
        graph.add_item(root, b).unwrap();
        let links = graph.document_mut(root).unwrap().links_mut();
        links.insert(0, Link::new("/old/catalog.json", SELF_REL));
        links.insert(0, Link::new("/older/catalog.json", SELF_REL));

        renderer().render(&mut graph, root).unwrap();
        let rels: Vec<&str> = graph
            .links(root)
            .unwrap()
            .iter()
            .map(|l| l.rel.as_str())
            .collect();
        assert_eq!(rels, [SELF_REL, CHILD_REL, ITEM_REL, ROOT_REL]);
        assert_eq!(link_href(&graph, root, CHILD_REL), Some("/cat/a/catalog.json"));
        assert_eq!(link_href(&graph, root, ITEM_REL), Some("/cat/b/b.json"));
        assert_eq!(link_href(&graph, root, ROOT_REL), Some("/cat/catalog.json"));
    }

    #[test]
    fn subtree_keeps_foreign_root() {
        let mut graph = StacGraph::default();
        let root = graph.insert(Catalog::new("root", "d"));
        let child = graph.insert(Catalog::new("child", "d"));
        graph.add_child(root, child).unwrap();
        renderer().render(&mut graph, root).unwrap();

        renderer().render(&mut graph, child).unwrap();
        assert_eq!(graph.href(child).unwrap(), Some("/cat/child/catalog.json"));
        assert_eq!(
            graph.get_link(child, ROOT_REL).unwrap().unwrap().target(),
            Some(root)
        );
    }

    #[test]
    fn cyclic_tree_fails() {
        let mut graph = StacGraph::default();
        let a = graph.insert(Catalog::new("a", "d"));
        let b = graph.insert(Catalog::new("b", "d"));
        graph.add_child(a, b).unwrap();
        graph.add_child(b, a).unwrap();
        let err = renderer().render(&mut graph, a).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Stac(stac_types::StacError::Usage(UsageError::CycleDetected { .. }))
        ));
    }

    #[test]
    fn save_and_reload_rendered_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root_dir = dir.path().to_str().unwrap().to_string();

        let mut graph = StacGraph::new(StoreContext::filesystem().with_pretty(true));
        let root = graph.insert(Catalog::new("root", "d"));
        let child = graph.insert(Collection::new("child", "d"));
        let item = graph.insert(Item::new("an-item"));
        graph.add_child(root, child).unwrap();
        graph.add_item(child, item).unwrap();
        DefaultRenderer::new(root_dir.clone())
            .render(&mut graph, root)
            .unwrap();
        assert_eq!(graph.save_tree(root).unwrap(), 3);
        assert!(dir.path().join("child/an-item/an-item.json").exists());

        let mut reloaded = StacGraph::default();
        let href = format!("{root_dir}/catalog.json");
        let loaded = reloaded.read_file(&href).unwrap();
        let ids: Vec<String> = reloaded
            .walk(loaded)
            .unwrap()
            .into_iter()
            .map(|(id, _)| reloaded.document(id).unwrap().id().to_string())
            .collect();
        assert_eq!(ids, ["root", "child", "an-item"]);
        let loaded_item = reloaded.walk(loaded).unwrap()[2].0;
        assert_eq!(reloaded.get_root(loaded_item).unwrap(), Some(loaded));
    }

    // ---------------------------------------------------------------
    // Properties
    // ---------------------------------------------------------------

    /// Build a tree from parent choices: entry `i` attaches node `i + 1` to
    /// an earlier container, as an item when the flag is set.
    fn build(shape: &[(usize, bool)]) -> (StacGraph, NodeId) {
        let mut graph = StacGraph::default();
        let root = graph.insert(Catalog::new("root", "d"));
        let mut containers = vec![root];
        for (i, (parent, is_item)) in shape.iter().enumerate() {
            let parent = containers[parent % containers.len()];
            if *is_item {
                let item = graph.insert(Item::new(format!("item-{i}")));
                graph.add_item(parent, item).unwrap();
            } else {
                let child = graph.insert(Catalog::new(format!("child-{i}"), "d"));
                graph.add_child(parent, child).unwrap();
                containers.push(child);
            }
        }
        (graph, root)
    }

    proptest! {
        #[test]
        fn rendering_twice_changes_nothing(
            shape in proptest::collection::vec((0usize..8, any::<bool>()), 0..16)
        ) {
            let (mut graph, root) = build(&shape);
            renderer().render(&mut graph, root).unwrap();
            let first = snapshot(&graph);
            renderer().render(&mut graph, root).unwrap();
            prop_assert_eq!(snapshot(&graph), first);
        }

        #[test]
        fn self_links_match_hrefs(
            shape in proptest::collection::vec((0usize..8, any::<bool>()), 0..16)
        ) {
            let (mut graph, root) = build(&shape);
            renderer().render(&mut graph, root).unwrap();
            for id in graph.node_ids() {
                let href = graph.href(id).unwrap().map(str::to_string);
                prop_assert!(href.is_some());
                prop_assert_eq!(link_href(&graph, id, SELF_REL).map(str::to_string), href);
                for rel in [SELF_REL, ROOT_REL, PARENT_REL] {
                    let count = graph.links(id).unwrap().iter().filter(|l| l.rel == rel).count();
                    prop_assert!(count <= 1);
                }
            }
        }
    }
}
