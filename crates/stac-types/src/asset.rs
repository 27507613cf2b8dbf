//! Assets, item-asset templates, and providers.
//!
//! These are plain structured data with no graph semantics. Unknown keys are
//! kept in `additional_fields` so documents round-trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A file or resource described by an item or collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Media type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Asset {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: None,
            description: None,
            media_type: None,
            roles: None,
            additional_fields: Map::new(),
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

/// Template describing the assets every item in a collection carries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

/// An organization that produced or hosts a collection's data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            roles: None,
            url: None,
            additional_fields: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn asset_preserves_unknown_keys() {
        let value = json!({
            "href": "./data.tif",
            "type": "image/tiff; application=geotiff",
            "roles": ["data"],
            "eo:bands": [{"name": "red"}]
        });
        let asset: Asset = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(asset.roles.as_deref(), Some(&["data".to_string()][..]));
        assert!(asset.additional_fields.contains_key("eo:bands"));
        assert_eq!(serde_json::to_value(&asset).unwrap(), value);
    }

    #[test]
    fn asset_builders() {
        let asset = Asset::new("thumb.png")
            .with_media_type("image/png")
            .with_roles(["thumbnail"]);
        let value = serde_json::to_value(&asset).unwrap();
        assert_eq!(
            value,
            json!({"href": "thumb.png", "type": "image/png", "roles": ["thumbnail"]})
        );
    }

    #[test]
    fn item_asset_has_no_href() {
        let value = json!({"title": "Red band", "roles": ["data"]});
        let item_asset: ItemAsset = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(item_asset.title.as_deref(), Some("Red band"));
        assert_eq!(serde_json::to_value(&item_asset).unwrap(), value);
    }

    #[test]
    fn provider_roundtrip() {
        let value = json!({
            "name": "Example Org",
            "roles": ["producer", "host"],
            "url": "https://example.org"
        });
        let provider: Provider = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(provider.name, "Example Org");
        assert_eq!(serde_json::to_value(&provider).unwrap(), value);
    }
}
