use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::asset::Asset;
use crate::constants::ITEM_TYPE;
use crate::document::{default_version, DocumentKind};
use crate::error::StacResult;
use crate::link::Link;
use crate::object::{merge_extra_fields, StacObject};

/// A GeoJSON Feature describing one spatiotemporal asset.
///
/// Items are the leaves of a catalog tree.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Item {
    pub id: String,

    #[serde(default = "default_version")]
    pub stac_version: String,

    #[serde(default)]
    pub stac_extensions: Option<Vec<String>>,

    /// GeoJSON geometry, or `None` for items without a footprint.
    #[serde(default)]
    pub geometry: Option<Value>,

    #[serde(default)]
    pub bbox: Option<Vec<Number>>,

    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub assets: IndexMap<String, Asset>,

    /// Id of the collection this item belongs to. `Some(None)` is an
    /// explicit `"collection": null`, which is written back as such.
    #[serde(default, deserialize_with = "present")]
    pub collection: Option<Option<String>>,

    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stac_version: default_version(),
            stac_extensions: None,
            geometry: None,
            bbox: None,
            properties: Map::new(),
            links: Vec::new(),
            assets: IndexMap::new(),
            collection: None,
            extra_fields: Map::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: Value) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_bbox(mut self, bbox: Vec<Number>) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_asset(mut self, key: impl Into<String>, asset: Asset) -> Self {
        self.assets.insert(key.into(), asset);
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(Some(collection.into()));
        self
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.collection.as_ref()?.as_deref()
    }
}

/// Distinguish a `null` value from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl StacObject for Item {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Item
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stac_version(&self) -> &str {
        &self.stac_version
    }

    fn set_stac_version(&mut self, version: String) {
        self.stac_version = version;
    }

    fn stac_extensions(&self) -> Option<&[String]> {
        self.stac_extensions.as_deref()
    }

    fn links(&self) -> &[Link] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }

    fn extra_fields(&self) -> &Map<String, Value> {
        &self.extra_fields
    }

    fn extra_fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra_fields
    }

    fn to_dict(&self) -> StacResult<Map<String, Value>> {
        let mut d = Map::new();
        d.insert("type".into(), Value::from(ITEM_TYPE));
        d.insert("stac_version".into(), Value::from(self.stac_version.as_str()));
        if let Some(extensions) = &self.stac_extensions {
            d.insert("stac_extensions".into(), serde_json::to_value(extensions)?);
        }
        d.insert("id".into(), Value::from(self.id.as_str()));
        d.insert("geometry".into(), self.geometry.clone().unwrap_or(Value::Null));
        if let Some(bbox) = &self.bbox {
            d.insert("bbox".into(), serde_json::to_value(bbox)?);
        }
        d.insert("properties".into(), Value::Object(self.properties.clone()));
        d.insert("links".into(), serde_json::to_value(&self.links)?);
        d.insert("assets".into(), serde_json::to_value(&self.assets)?);
        match &self.collection {
            Some(Some(collection)) => {
                d.insert("collection".into(), Value::from(collection.as_str()));
            }
            Some(None) => {
                d.insert("collection".into(), Value::Null);
            }
            None => {}
        }
        merge_extra_fields(&mut d, &self.extra_fields);
        Ok(d)
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let d = self.to_dict().map_err(serde::ser::Error::custom)?;
        d.serialize(serializer)
    }
}
