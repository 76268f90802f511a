//! Control points and georeferenced maps.

use serde::{Deserialize, Serialize};

use crate::Pt2;

/// Ground control point: a pixel location paired with its real-world location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gcp {
    /// Pixel coordinates in the map image.
    pub resource: Pt2,
    /// Geographic (or projected) coordinates.
    pub geo: Pt2,
}

impl Gcp {
    pub fn new(resource: Pt2, geo: Pt2) -> Self {
        Self { resource, geo }
    }
}

/// Repeated control point: a pixel location whose real-world position is
/// unknown but shared by every point with the same `id` on other maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rcp {
    pub id: String,
    pub map_id: String,
    pub resource: Pt2,
}

impl Rcp {
    pub fn new(id: impl Into<String>, map_id: impl Into<String>, resource: Pt2) -> Self {
        Self {
            id: id.into(),
            map_id: map_id.into(),
            resource,
        }
    }
}

/// A map image identified by `id` together with its ordered GCPs.
///
/// Image metadata is out of scope; only what the transformation needs is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoreferencedMap {
    pub id: String,
    pub gcps: Vec<Gcp>,
}

impl GeoreferencedMap {
    pub fn new(id: impl Into<String>, gcps: Vec<Gcp>) -> Self {
        Self {
            id: id.into(),
            gcps,
        }
    }

    /// Resource coordinates of all GCPs, in order.
    pub fn resource_points(&self) -> Vec<Pt2> {
        self.gcps.iter().map(|g| g.resource).collect()
    }

    /// Geo coordinates of all GCPs, in order.
    pub fn geo_points(&self) -> Vec<Pt2> {
        self.gcps.iter().map(|g| g.geo).collect()
    }

    /// Return a new map value with the same id and the given GCPs.
    pub fn with_gcps(&self, gcps: Vec<Gcp>) -> Self {
        Self {
            id: self.id.clone(),
            gcps,
        }
    }
}
