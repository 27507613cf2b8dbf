//! The closed set of document variants and the type-tag dispatch.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::collection::Collection;
use crate::constants::{CATALOG_TYPE, COLLECTION_TYPE, DEFAULT_STAC_VERSION, ITEM_TYPE};
use crate::error::{SpecViolation, StacError, StacResult};
use crate::item::Item;
use crate::link::Link;
use crate::object::StacObject;

pub(crate) fn default_version() -> String {
    DEFAULT_STAC_VERSION.to_string()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Unwrap a JSON object or fail with [`SpecViolation::NotAnObject`].
pub fn into_object(value: Value) -> StacResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SpecViolation::NotAnObject(value_kind(&other)).into()),
    }
}

/// Which variant a document is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Item,
    Catalog,
    Collection,
}

impl DocumentKind {
    /// The value of the `type` field for this kind.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Item => ITEM_TYPE,
            Self::Catalog => CATALOG_TYPE,
            Self::Collection => COLLECTION_TYPE,
        }
    }

    /// Parse a `type` field value.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            ITEM_TYPE => Some(Self::Item),
            CATALOG_TYPE => Some(Self::Catalog),
            COLLECTION_TYPE => Some(Self::Collection),
            _ => None,
        }
    }

    /// Catalogs and collections can hold children and items.
    pub fn is_container(&self) -> bool {
        !matches!(self, Self::Item)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item => write!(f, "Item"),
            Self::Catalog => write!(f, "Catalog"),
            Self::Collection => write!(f, "Collection"),
        }
    }
}

/// A catalog, collection, or item.
#[derive(Clone, Debug, PartialEq)]
pub enum Document {
    Item(Item),
    Catalog(Catalog),
    Collection(Collection),
}

impl Document {
    /// Build a document from a JSON object, dispatching on its `type` field.
    ///
    /// `"Feature"` becomes an [`Item`], `"Catalog"` a [`Catalog`], and
    /// `"Collection"` a [`Collection`]. A missing or unknown tag is a
    /// [`SpecViolation`].
    pub fn from_dict(mut map: Map<String, Value>) -> StacResult<Self> {
        let kind = match map.get("type") {
            Some(Value::String(tag)) => DocumentKind::from_type_tag(tag)
                .ok_or_else(|| SpecViolation::UnknownType(tag.clone()))?,
            Some(other) => return Err(SpecViolation::UnknownType(other.to_string()).into()),
            None => return Err(SpecViolation::MissingType.into()),
        };
        map.remove("type");
        let value = Value::Object(map);
        Ok(match kind {
            DocumentKind::Item => Self::Item(serde_json::from_value(value)?),
            DocumentKind::Catalog => Self::Catalog(serde_json::from_value(value)?),
            DocumentKind::Collection => Self::Collection(serde_json::from_value(value)?),
        })
    }

    /// Like [`from_dict`](Self::from_dict), for any JSON value.
    pub fn from_value(value: Value) -> StacResult<Self> {
        Self::from_dict(into_object(value)?)
    }

    /// Parse a document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> StacResult<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    pub fn to_value(&self) -> StacResult<Value> {
        Ok(Value::Object(self.to_dict()?))
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    fn as_object(&self) -> &dyn StacObject {
        match self {
            Self::Item(item) => item,
            Self::Catalog(catalog) => catalog,
            Self::Collection(collection) => collection,
        }
    }

    fn as_object_mut(&mut self) -> &mut dyn StacObject {
        match self {
            Self::Item(item) => item,
            Self::Catalog(catalog) => catalog,
            Self::Collection(collection) => collection,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_catalog(&self) -> Option<&Catalog> {
        match self {
            Self::Catalog(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Title of a catalog or collection.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Item(_) => None,
            Self::Catalog(catalog) => catalog.title.as_deref(),
            Self::Collection(collection) => collection.title.as_deref(),
        }
    }
}

impl StacObject for Document {
    fn kind(&self) -> DocumentKind {
        self.as_object().kind()
    }

    fn id(&self) -> &str {
        self.as_object().id()
    }

    fn stac_version(&self) -> &str {
        self.as_object().stac_version()
    }

    fn set_stac_version(&mut self, version: String) {
        self.as_object_mut().set_stac_version(version);
    }

    fn stac_extensions(&self) -> Option<&[String]> {
        self.as_object().stac_extensions()
    }

    fn links(&self) -> &[Link] {
        self.as_object().links()
    }

    fn links_mut(&mut self) -> &mut Vec<Link> {
        self.as_object_mut().links_mut()
    }

    fn extra_fields(&self) -> &Map<String, Value> {
        self.as_object().extra_fields()
    }

    fn extra_fields_mut(&mut self) -> &mut Map<String, Value> {
        self.as_object_mut().extra_fields_mut()
    }

    fn to_dict(&self) -> StacResult<Map<String, Value>> {
        self.as_object().to_dict()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let d = self.to_dict().map_err(serde::ser::Error::custom)?;
        d.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Document::from_value(value).map_err(serde::de::Error::custom)
    }
}

macro_rules! variant_conversions {
    ($variant:ident) => {
        impl From<$variant> for Document {
            fn from(value: $variant) -> Self {
                Document::$variant(value)
            }
        }

        impl TryFrom<Document> for $variant {
            type Error = StacError;

            fn try_from(document: Document) -> Result<Self, Self::Error> {
                match document {
                    Document::$variant(value) => Ok(value),
                    other => Err(SpecViolation::TypeMismatch {
                        expected: DocumentKind::$variant,
                        actual: other.kind(),
                        href: other.id().to_string(),
                    }
                    .into()),
                }
            }
        }
    };
}

variant_conversions!(Item);
variant_conversions!(Catalog);
variant_conversions!(Collection);
