//! Relation names, type tags, and defaults.

/// The STAC version written on documents that do not declare one.
pub const DEFAULT_STAC_VERSION: &str = "1.1.0";

/// License used for collections constructed without one.
pub const DEFAULT_LICENSE: &str = "other";

pub const CATALOG_TYPE: &str = "Catalog";
pub const COLLECTION_TYPE: &str = "Collection";
pub const ITEM_TYPE: &str = "Feature";

pub const SELF_REL: &str = "self";
pub const ROOT_REL: &str = "root";
pub const PARENT_REL: &str = "parent";
pub const CHILD_REL: &str = "child";
pub const ITEM_REL: &str = "item";

/// Returns the default STAC version.
pub fn default_stac_version() -> &'static str {
    DEFAULT_STAC_VERSION
}

/// Relations that may appear any number of times on one document.
///
/// Every other relation is single-valued: setting it replaces the old link.
pub fn is_multi_valued(rel: &str) -> bool {
    rel == CHILD_REL || rel == ITEM_REL
}
