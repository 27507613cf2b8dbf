//! Typed links between documents.
//!
//! A [`Link`] is plain JSON data (`href`, `rel`, ...) plus two pieces of
//! graph state that are never serialized: the node that owns the link and a
//! cached handle to the resolved target. The target cell is filled at most
//! once; after that every resolution returns the same node.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{CHILD_REL, ITEM_REL, PARENT_REL, ROOT_REL, SELF_REL};
use crate::document::into_object;
use crate::error::StacResult;
use crate::node::NodeId;

/// A typed, directional reference from one document to another document or
/// to an external resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Location of the target. Always written, `null` when unknown.
    pub href: Option<String>,

    /// Relation kind: `self`, `root`, `parent`, `child`, `item`, or any
    /// extension relation.
    pub rel: String,

    /// Media type of the target.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// HTTP method, for links that describe an API request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// HTTP headers; values are strings or arrays of strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,

    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// Unrecognized keys, preserved verbatim.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,

    #[serde(skip)]
    owner: Option<NodeId>,

    #[serde(skip)]
    target: Option<NodeId>,
}

impl Link {
    /// Create a link with an href and a relation.
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self::with_optional_href(Some(href.into()), rel)
    }

    fn with_optional_href(href: Option<String>, rel: impl Into<String>) -> Self {
        Self {
            href,
            rel: rel.into(),
            media_type: None,
            title: None,
            method: None,
            headers: None,
            body: None,
            additional_fields: Map::new(),
            owner: None,
            target: None,
        }
    }

    /// Create a link whose target is already known.
    ///
    /// `href` is the target's href at construction time. It is not re-derived
    /// later, so callers that move the target must set the link again.
    pub fn to_node(rel: impl Into<String>, target: NodeId, href: Option<String>) -> Self {
        let mut link = Self::with_optional_href(href, rel);
        link.target = Some(target);
        link
    }

    pub fn root(target: NodeId, href: Option<String>) -> Self {
        Self::to_node(ROOT_REL, target, href)
    }

    pub fn parent(target: NodeId, href: Option<String>) -> Self {
        Self::to_node(PARENT_REL, target, href)
    }

    pub fn child(target: NodeId, href: Option<String>) -> Self {
        Self::to_node(CHILD_REL, target, href)
    }

    pub fn item(target: NodeId, href: Option<String>) -> Self {
        Self::to_node(ITEM_REL, target, href)
    }

    pub fn self_link(target: NodeId, href: Option<String>) -> Self {
        Self::to_node(SELF_REL, target, href)
    }

    /// Set the media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.rel == ROOT_REL
    }

    pub fn is_parent(&self) -> bool {
        self.rel == PARENT_REL
    }

    pub fn is_child(&self) -> bool {
        self.rel == CHILD_REL
    }

    pub fn is_item(&self) -> bool {
        self.rel == ITEM_REL
    }

    pub fn is_self(&self) -> bool {
        self.rel == SELF_REL
    }

    /// The node holding this link, if it has been attached to one.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: NodeId) {
        self.owner = Some(owner);
    }

    /// The cached resolution target, if any.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Fill the target cell. Returns `false` and leaves the cell untouched if
    /// it was already populated.
    pub fn cache_target(&mut self, target: NodeId) -> bool {
        if self.target.is_some() {
            return false;
        }
        self.target = Some(target);
        true
    }

    /// Parse a link from a JSON object.
    pub fn from_dict(map: Map<String, Value>) -> StacResult<Self> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Serialize to a JSON object.
    pub fn to_dict(&self) -> StacResult<Map<String, Value>> {
        into_object(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn minimal_link_roundtrip() {
        let value = json!({"href": "./child/catalog.json", "rel": "child"});
        let link: Link = serde_json::from_value(value.clone()).unwrap();
        assert!(link.is_child());
        assert_eq!(serde_json::to_value(&link).unwrap(), value);
    }

    #[test]
    fn request_shaped_link_roundtrip() {
        let value = json!({
            "href": "https://example.com/search",
            "rel": "next",
            "type": "application/geo+json",
            "title": "Next page",
            "method": "POST",
            "headers": {"Accept": ["application/json"]},
            "body": {"page": 2},
            "merge": true
        });
        let link: Link = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(link.method.as_deref(), Some("POST"));
        assert_eq!(link.additional_fields["merge"], json!(true));
        assert_eq!(serde_json::to_value(&link).unwrap(), value);
    }

    #[test]
    fn missing_href_serializes_as_null() {
        let link = Link::child(NodeId::new(0), None);
        let dict = link.to_dict().unwrap();
        assert_eq!(dict["href"], Value::Null);
        assert_eq!(dict["rel"], json!("child"));
        assert!(!dict.contains_key("type"));
    }

    #[test]
    fn graph_state_is_not_serialized() {
        let mut link = Link::parent(NodeId::new(4), Some("/cat/catalog.json".into()));
        link.set_owner(NodeId::new(5));
        let dict = link.to_dict().unwrap();
        assert_eq!(dict.len(), 2);
        let parsed = Link::from_dict(dict).unwrap();
        assert_eq!(parsed.owner(), None);
        assert_eq!(parsed.target(), None);
    }

    #[test]
    fn target_cell_is_filled_once() {
        let mut link = Link::new("item.json", "item");
        assert!(link.cache_target(NodeId::new(1)));
        assert!(!link.cache_target(NodeId::new(2)));
        assert_eq!(link.target(), Some(NodeId::new(1)));
    }

    #[test]
    fn convenience_constructors_set_relation() {
        let n = NodeId::new(0);
        assert!(Link::root(n, None).is_root());
        assert!(Link::parent(n, None).is_parent());
        assert!(Link::child(n, None).is_child());
        assert!(Link::item(n, None).is_item());
        assert!(Link::self_link(n, None).is_self());
    }

    #[test]
    fn builders() {
        let link = Link::new("a.tif", "preview")
            .with_media_type("image/tiff")
            .with_title("Preview");
        assert_eq!(link.media_type.as_deref(), Some("image/tiff"));
        assert_eq!(link.title.as_deref(), Some("Preview"));
    }
}
