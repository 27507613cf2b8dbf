//! Spatial and temporal extents of a collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Spatial and temporal coverage of a collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    #[serde(default)]
    pub spatial: SpatialExtent,

    #[serde(default)]
    pub temporal: TemporalExtent,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

/// One or more bounding boxes. The first box covers all the others.
///
/// Coordinates are kept as [`Number`] so integer and float spellings
/// survive a round trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<Vec<Number>>,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Default for SpatialExtent {
    fn default() -> Self {
        let world = [-180, -90, 180, 90].into_iter().map(Number::from).collect();
        Self {
            bbox: vec![world],
            additional_fields: Map::new(),
        }
    }
}

/// One or more `[start, end]` intervals; `None` is an open end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<String>; 2]>,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Default for TemporalExtent {
    fn default() -> Self {
        Self {
            interval: vec![[None, None]],
            additional_fields: Map::new(),
        }
    }
}
