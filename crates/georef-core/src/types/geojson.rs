//! GeoJSON-shaped geometries.
//!
//! Only the `type`/`coordinates` part of a GeoJSON geometry is modelled.
//! Polygon rings follow GeoJSON and repeat their first vertex at the end;
//! [`open_ring`] and [`close_ring`] convert to and from the open form the
//! transformer works with.

use serde::{Deserialize, Serialize};

use crate::Pt2;

/// A geometry in GeoJSON shape: `{"type": "LineString", "coordinates": [[x, y], ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Pt2),
    LineString(Vec<Pt2>),
    Polygon(Vec<Vec<Pt2>>),
    MultiPoint(Vec<Pt2>),
    MultiLineString(Vec<Vec<Pt2>>),
    MultiPolygon(Vec<Vec<Vec<Pt2>>>),
}

impl Geometry {
    /// GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPoint(_) => "MultiPoint",
            Self::MultiLineString(_) => "MultiLineString",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// Drop the repeated closing vertex of a ring, if present.
pub fn open_ring(ring: &[Pt2]) -> &[Pt2] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Repeat the first vertex at the end of an open ring.
pub fn close_ring(mut ring: Vec<Pt2>) -> Vec<Pt2> {
    if let Some(first) = ring.first().copied() {
        if ring.last() != Some(&first) || ring.len() == 1 {
            ring.push(first);
        }
    }
    ring
}
