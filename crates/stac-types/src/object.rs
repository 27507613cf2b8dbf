//! Behaviour shared by every document variant.

use serde_json::{Map, Value};

use crate::constants::{is_multi_valued, PARENT_REL, ROOT_REL, SELF_REL};
use crate::document::DocumentKind;
use crate::error::StacResult;
use crate::link::Link;

/// Common interface of [`Item`](crate::Item), [`Catalog`](crate::Catalog),
/// [`Collection`](crate::Collection) and [`Document`](crate::Document).
///
/// The provided methods manage the link list. They do not know which graph
/// node holds the document, so they leave link owners untouched; the graph
/// assigns owners when it attaches links.
pub trait StacObject {
    fn kind(&self) -> DocumentKind;

    fn id(&self) -> &str;

    fn stac_version(&self) -> &str;

    fn set_stac_version(&mut self, version: String);

    /// Extension schema URIs, if the document declares any.
    fn stac_extensions(&self) -> Option<&[String]>;

    fn links(&self) -> &[Link];

    fn links_mut(&mut self) -> &mut Vec<Link>;

    /// Top-level keys this crate does not interpret.
    fn extra_fields(&self) -> &Map<String, Value>;

    fn extra_fields_mut(&mut self) -> &mut Map<String, Value>;

    /// Serialize to a JSON object with a fixed key order.
    fn to_dict(&self) -> StacResult<Map<String, Value>>;

    /// The first link with relation `rel`.
    fn get_link(&self, rel: &str) -> Option<&Link> {
        self.links().iter().find(|link| link.rel == rel)
    }

    fn iter_links(&self) -> std::slice::Iter<'_, Link> {
        self.links().iter()
    }

    /// Set a link, honouring relation cardinality. See [`set_link_in`].
    fn set_link(&mut self, link: Link) {
        set_link_in(self.links_mut(), link);
    }

    /// Append a link without touching existing ones.
    fn add_link(&mut self, link: Link) {
        self.links_mut().push(link);
    }

    /// Remove every link with relation `rel`.
    fn remove_links(&mut self, rel: &str) {
        self.links_mut().retain(|link| link.rel != rel);
    }

    fn get_root_link(&self) -> Option<&Link> {
        self.get_link(ROOT_REL)
    }

    fn get_parent_link(&self) -> Option<&Link> {
        self.get_link(PARENT_REL)
    }

    fn get_self_link(&self) -> Option<&Link> {
        self.get_link(SELF_REL)
    }
}

/// Insert `link` into `links`.
///
/// `child` and `item` links are appended. Any other relation is
/// single-valued: the first existing link of that relation is replaced in
/// place and the remaining ones are dropped, so a document never carries
/// more than one `self`, `root` or `parent` link and link order is stable
/// when the same link is set again.
pub fn set_link_in(links: &mut Vec<Link>, link: Link) {
    if is_multi_valued(&link.rel) {
        links.push(link);
        return;
    }
    match links.iter().position(|l| l.rel == link.rel) {
        Some(first) => {
            let rel = link.rel.clone();
            links[first] = link;
            let mut index = 0;
            links.retain(|l| {
                let keep = index <= first || l.rel != rel;
                index += 1;
                keep
            });
        }
        None => links.push(link),
    }
}

/// Drop every `self`, `root` and `parent` link after the first of its
/// relation. Returns how many links were removed.
pub fn collapse_structural_links(links: &mut Vec<Link>) -> usize {
    let before = links.len();
    let mut seen = [false; 3];
    links.retain(|link| {
        let slot = match link.rel.as_str() {
            SELF_REL => 0,
            ROOT_REL => 1,
            PARENT_REL => 2,
            _ => return true,
        };
        !std::mem::replace(&mut seen[slot], true)
    });
    before - links.len()
}

/// Write `extra` into `map`, skipping keys that are already present.
pub(crate) fn merge_extra_fields(map: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, value) in extra {
        if !map.contains_key(key) {
            map.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::constants::{CHILD_REL, ITEM_REL};
    use crate::Item;

    fn rels(links: &[Link]) -> Vec<&str> {
        links.iter().map(|l| l.rel.as_str()).collect()
    }

    #[test]
    fn set_link_replaces_in_place() {
        let mut links = vec![
            Link::new("a", "self"),
            Link::new("b", "child"),
            Link::new("c", "root"),
        ];
        set_link_in(&mut links, Link::new("d", "self"));
        assert_eq!(rels(&links), ["self", "child", "root"]);
        assert_eq!(links[0].href.as_deref(), Some("d"));
    }

    #[test]
    fn set_link_drops_duplicates() {
        let mut links = vec![
            Link::new("a", "parent"),
            Link::new("b", "child"),
            Link::new("c", "parent"),
        ];
        set_link_in(&mut links, Link::new("d", "parent"));
        assert_eq!(rels(&links), ["parent", "child"]);
        assert_eq!(links[0].href.as_deref(), Some("d"));
    }

    #[test]
    fn collapse_keeps_first_structural_link() {
        let mut links = vec![
            Link::new("a", "self"),
            Link::new("b", "self"),
            Link::new("c", "child"),
            Link::new("d", "root"),
            Link::new("e", "license"),
            Link::new("f", "license"),
            Link::new("g", "root"),
        ];
        assert_eq!(collapse_structural_links(&mut links), 2);
        assert_eq!(rels(&links), ["self", "child", "root", "license", "license"]);
        assert_eq!(links[0].href.as_deref(), Some("a"));
        assert_eq!(links[2].href.as_deref(), Some("d"));
    }

    #[test]
    fn set_link_appends_multi_valued() {
        let mut links = vec![Link::new("a", "child")];
        set_link_in(&mut links, Link::new("b", "child"));
        set_link_in(&mut links, Link::new("c", "item"));
        assert_eq!(rels(&links), ["child", "child", "item"]);
    }

    #[test]
    fn trait_helpers_on_item() {
        let mut item = Item::new("an-id");
        item.add_link(Link::new("./collection.json", "collection"));
        item.set_link(Link::new("../catalog.json", "root"));
        item.set_link(Link::new("../catalog.json", "parent"));
        assert!(item.get_root_link().is_some());
        assert!(item.get_parent_link().is_some());
        assert!(item.get_self_link().is_none());
        item.remove_links("collection");
        assert_eq!(item.iter_links().count(), 2);
    }

    #[test]
    fn merge_extra_fields_keeps_known_keys() {
        let mut map = Map::new();
        map.insert("id".into(), json!("known"));
        let mut extra = Map::new();
        extra.insert("id".into(), json!("shadow"));
        extra.insert("custom".into(), json!(1));
        merge_extra_fields(&mut map, &extra);
        assert_eq!(map["id"], json!("known"));
        assert_eq!(map["custom"], json!(1));
    }

    fn arb_rel() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just(SELF_REL),
            Just(ROOT_REL),
            Just(PARENT_REL),
            Just(CHILD_REL),
            Just(ITEM_REL),
        ]
    }

    proptest! {
        #[test]
        fn at_most_one_single_valued_link(rels in proptest::collection::vec(arb_rel(), 0..40)) {
            let mut links = Vec::new();
            for (i, rel) in rels.iter().enumerate() {
                set_link_in(&mut links, Link::new(format!("href-{i}"), *rel));
            }
            for rel in [SELF_REL, ROOT_REL, PARENT_REL] {
                prop_assert!(links.iter().filter(|l| l.rel == rel).count() <= 1);
            }
            for rel in [CHILD_REL, ITEM_REL] {
                let set = rels.iter().filter(|r| **r == rel).count();
                prop_assert_eq!(links.iter().filter(|l| l.rel == rel).count(), set);
            }
        }
    }
}
