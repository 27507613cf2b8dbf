use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::asset::{Asset, ItemAsset, Provider};
use crate::constants::{COLLECTION_TYPE, DEFAULT_LICENSE};
use crate::document::{default_version, DocumentKind};
use crate::error::StacResult;
use crate::extent::Extent;
use crate::link::Link;
use crate::object::{merge_extra_fields, StacObject};

fn default_license() -> String {
    DEFAULT_LICENSE.to_string()
}

/// A catalog with descriptive, licensing and extent metadata.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Collection {
    pub id: String,

    #[serde(default = "default_version")]
    pub stac_version: String,

    #[serde(default)]
    pub stac_extensions: Option<Vec<String>>,

    #[serde(default)]
    pub title: Option<String>,

    pub description: String,

    #[serde(default)]
    pub keywords: Option<Vec<String>>,

    /// SPDX license identifier, or `other`.
    #[serde(default = "default_license")]
    pub license: String,

    #[serde(default)]
    pub providers: Option<Vec<Provider>>,

    #[serde(default)]
    pub extent: Extent,

    #[serde(default)]
    pub summaries: Option<Map<String, Value>>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub assets: Option<IndexMap<String, Asset>>,

    #[serde(default)]
    pub item_assets: Option<IndexMap<String, ItemAsset>>,

    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Collection {
    /// Create a collection with the default license and a whole-world,
    /// open-ended extent.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stac_version: default_version(),
            stac_extensions: None,
            title: None,
            description: description.into(),
            keywords: None,
            license: default_license(),
            providers: None,
            extent: Extent::default(),
            summaries: None,
            links: Vec::new(),
            assets: None,
            item_assets: None,
            extra_fields: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.providers.get_or_insert_with(Vec::new).push(provider);
        self
    }
}

impl StacObject for Collection {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Collection
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
        d.insert("type".into(), Value::from(COLLECTION_TYPE));
        d.insert("stac_version".into(), Value::from(self.stac_version.as_str()));
        if let Some(extensions) = &self.stac_extensions {
            d.insert("stac_extensions".into(), serde_json::to_value(extensions)?);
        }
        d.insert("id".into(), Value::from(self.id.as_str()));
        if let Some(title) = &self.title {
            d.insert("title".into(), Value::from(title.as_str()));
        }
        d.insert("description".into(), Value::from(self.description.as_str()));
        if let Some(keywords) = &self.keywords {
            d.insert("keywords".into(), serde_json::to_value(keywords)?);
        }
        d.insert("license".into(), Value::from(self.license.as_str()));
        if let Some(providers) = &self.providers {
            d.insert("providers".into(), serde_json::to_value(providers)?);
        }
        d.insert("extent".into(), serde_json::to_value(&self.extent)?);
        if let Some(summaries) = &self.summaries {
            d.insert("summaries".into(), Value::Object(summaries.clone()));
        }
        d.insert("links".into(), serde_json::to_value(&self.links)?);
        if let Some(assets) = &self.assets {
            d.insert("assets".into(), serde_json::to_value(assets)?);
        }
        if let Some(item_assets) = &self.item_assets {
            d.insert("item_assets".into(), serde_json::to_value(item_assets)?);
        }
        merge_extra_fields(&mut d, &self.extra_fields);
        Ok(d)
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let d = self.to_dict().map_err(serde::ser::Error::custom)?;
        d.serialize(serializer)
    }
}
