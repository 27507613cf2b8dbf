use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::constants::CATALOG_TYPE;
use crate::document::{default_version, DocumentKind};
use crate::error::StacResult;
use crate::link::Link;
use crate::object::{merge_extra_fields, StacObject};

/// A container grouping child catalogs, collections and items.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Catalog {
    pub id: String,

    #[serde(default = "default_version")]
    pub stac_version: String,

    #[serde(default)]
    pub stac_extensions: Option<Vec<String>>,

    #[serde(default)]
    pub title: Option<String>,

    pub description: String,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Catalog {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stac_version: default_version(),
            stac_extensions: None,
            title: None,
            description: description.into(),
            links: Vec::new(),
            extra_fields: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl StacObject for Catalog {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Catalog
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
        d.insert("type".into(), Value::from(CATALOG_TYPE));
        d.insert("stac_version".into(), Value::from(self.stac_version.as_str()));
        if let Some(extensions) = &self.stac_extensions {
            d.insert("stac_extensions".into(), serde_json::to_value(extensions)?);
        }
        d.insert("id".into(), Value::from(self.id.as_str()));
        if let Some(title) = &self.title {
            d.insert("title".into(), Value::from(title.as_str()));
        }
        d.insert("description".into(), Value::from(self.description.as_str()));
        d.insert("links".into(), serde_json::to_value(&self.links)?);
        merge_extra_fields(&mut d, &self.extra_fields);
        Ok(d)
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let d = self.to_dict().map_err(serde::ser::Error::custom)?;
        d.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn new_catalog_dict() {
        let catalog = Catalog::new("an-id", "a description").with_title("A title");
        assert_eq!(
            Value::Object(catalog.to_dict().unwrap()),
            json!({
                "type": "Catalog",
                "stac_version": "1.1.0",
                "id": "an-id",
                "title": "A title",
                "description": "a description",
                "links": []
            })
        );
    }

    #[test]
    fn description_is_required() {
        let err = serde_json::from_value::<Catalog>(json!({"id": "x"}));
        assert!(err.is_err());
    }

    #[test]
    fn empty_extensions_are_kept() {
        let mut catalog = Catalog::new("an-id", "d");
        catalog.stac_extensions = Some(Vec::new());
        assert_eq!(catalog.to_dict().unwrap()["stac_extensions"], json!([]));
    }
}
